use crate::parser::Parser;
use itertools::Itertools;
use serde_json::Value;

/// Strict equality: same type and same value. `1` and `1.0` differ.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => match (na.as_i64(), nb.as_i64()) {
            (Some(ia), Some(ib)) => ia == ib,
            (None, None) => na.as_f64() == nb.as_f64(),
            _ => false,
        },
        _ => a == b,
    }
}

/// Loose equality: numeric strings compare as numbers, booleans compare by truthiness.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(ba), other) | (other, Value::Bool(ba)) => *ba == is_truthy(other),
        (Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => s.is_empty(),
        (Value::Null, other) | (other, Value::Null) => !is_truthy(other),
        (Value::Number(na), Value::Number(nb)) => na.as_f64() == nb.as_f64(),
        (Value::Number(na), Value::String(sb)) | (Value::String(sb), Value::Number(na)) => {
            match parse_numeric(sb).and_then(|v| v.as_f64()) {
                Some(db) => na.as_f64() == Some(db),
                None => na.to_string() == *sb,
            }
        }
        (Value::String(sa), Value::String(sb)) => {
            match (
                parse_numeric(sa).and_then(|v| v.as_f64()),
                parse_numeric(sb).and_then(|v| v.as_f64()),
            ) {
                (Some(da), Some(db)) => da == db,
                _ => sa == sb,
            }
        }
        (Value::Array(xa), Value::Array(xb)) => {
            xa.len() == xb.len() && xa.iter().zip(xb).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(ma), Value::Object(mb)) => {
            ma.len() == mb.len()
                && ma
                    .iter()
                    .all(|(k, x)| mb.get(k).map(|y| loose_eq(x, y)).unwrap_or(false))
        }
        _ => false,
    }
}

/// Parse a numeric string (surrounding whitespace allowed) into a JSON number.
pub fn parse_numeric(s: &str) -> Option<Value> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    Parser::new(t).parse_number_literal().ok()
}

/// Numbers, and strings that read as numbers.
pub fn is_numeric(v: &Value) -> bool {
    match v {
        Value::Number(_) => true,
        Value::String(s) => parse_numeric(s).is_some(),
        _ => false,
    }
}

/// Falsy values: null, false, zero, `""`, `"0"`, empty list/map.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

/// `""`/null: the two values `required` and `optional` treat as empty.
pub fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Scalar string conversion; lists and maps have none.
pub fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::Null => Some(String::new()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Human rendering used for message placeholders.
pub fn stringify(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{}]", items.iter().map(stringify).join(", ")),
        Value::Object(map) => format!(
            "[{}]",
            map.iter()
                .map(|(k, v)| format!("{k} => {}", stringify(v)))
                .join(", ")
        ),
    }
}

pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn stringify_values() {
        assert_eq!(stringify(&json!("data")), "data");
        assert_eq!(stringify(&json!(null)), "NULL");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(
            stringify(&json!(["foo", "bar", 1, null, true])),
            "[foo, bar, 1, NULL, true]"
        );
        assert_eq!(stringify(&json!({"foo": "bar"})), "[foo => bar]");
    }

    #[test]
    fn loose_and_strict() {
        assert!(loose_eq(&json!("1"), &json!(1)));
        assert!(loose_eq(&json!("1.0"), &json!("1")));
        assert!(loose_eq(&json!(null), &json!("")));
        assert!(loose_eq(&json!(true), &json!("yes")));
        assert!(!loose_eq(&json!("abc"), &json!(0)));
        assert!(!strict_eq(&json!("1"), &json!(1)));
        assert!(!strict_eq(&json!(1), &json!(1.0)));
        assert!(strict_eq(&json!(1), &json!(1)));
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric(&json!("123.45")));
        assert!(is_numeric(&json!(" 12 ")));
        assert!(is_numeric(&json!(7)));
        assert!(!is_numeric(&json!("")));
        assert!(!is_numeric(&json!("12a")));
        assert!(!is_numeric(&json!(true)));
    }
}
