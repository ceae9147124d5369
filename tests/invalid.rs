use json_rule_validation as jrv;
use jrv::{FieldRules, RuleError, ValidateOptions};
use serde_json::json;

fn run(rules: FieldRules, data: serde_json::Value) -> jrv::Result<jrv::Validation> {
    jrv::validate(&rules, &data, &ValidateOptions::default())
}

// An undeclared rule name aborts the whole call, even when other fields are fine.
#[test]
fn test_unknown_rule() {
    let err = run(
        FieldRules::new().field("ok", "required").field("foo", "bar"),
        json!({"ok": 1}),
    )
    .unwrap_err();
    assert!(matches!(err, RuleError::UnknownRule(ref name) if name == "bar"));
    assert_eq!(err.to_string(), "rule not exists: bar");
}

// Date comparisons against something that is not a date are configuration errors,
// not violations.
#[test]
fn test_unreadable_date_comparison() {
    let err = run(
        FieldRules::new().field("when", "after:not-a-field"),
        json!({"when": "tomorrow"}),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "both dates should be valid dates: when");

    let err = run(
        FieldRules::new().field("when", "before:today"),
        json!({"when": "gibberish"}),
    )
    .unwrap_err();
    assert!(matches!(err, RuleError::InvalidDate(_)));
}

#[test]
fn test_bad_pattern() {
    let err = run(
        FieldRules::new().field("code", "match:/[a-/"),
        json!({"code": "abc"}),
    )
    .unwrap_err();
    assert!(matches!(err, RuleError::InvalidPattern { .. }), "got {err}");
}

#[test]
fn test_wrong_arity() {
    let err = run(FieldRules::new().field("n", "between:1"), json!({"n": 2})).unwrap_err();
    assert_eq!(err.to_string(), "rule `between` expects 2 argument(s), got 1");

    let err = run(FieldRules::new().field("n", "required:yes"), json!({"n": 2})).unwrap_err();
    assert!(matches!(err, RuleError::Arity { given: 1, .. }));
}

#[test]
fn test_non_numeric_bound() {
    let err = run(FieldRules::new().field("n", "min:three"), json!({"n": "abcd"})).unwrap_err();
    assert!(matches!(err, RuleError::InvalidArgument { ref rule, .. } if rule == "min"));
}

// Errors raised inside a wildcard element propagate out of the fan-out.
#[test]
fn test_error_inside_fan_out() {
    let err = run(
        FieldRules::new().field("items.*.at", "date_equals:nope"),
        json!({"items": [{"at": "2026-10-18"}]}),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "both dates should be valid dates: items.0.at");
}

#[test]
fn test_malformed_declarations() {
    let err = FieldRules::from_value(&json!(["required"])).unwrap_err();
    assert!(matches!(err, RuleError::Declaration(_)));

    let err = FieldRules::from_value(&json!({"a": 5})).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid rule declaration: field `a` has a number rule chain, expected string or object"
    );
}
