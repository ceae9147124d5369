use crate::comparison::{parse_numeric, scalar_string};
use crate::dates::{self, Zone};
use crate::errors::{Result, RuleError};
use crate::expression::Arg;
use crate::path;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::cmp::Ordering;

static NULL: Value = Value::Null;

/// Where a context sits inside a wildcard fan-out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    /// Dotted path of the enclosing scope.
    pub prefix: Option<String>,
    /// Remaining declared path below the wildcard.
    pub suffix: Option<String>,
    /// Index within the enclosing list.
    pub position: Option<usize>,
    /// The declared path ends in a wildcard: the elements themselves are the values.
    pub positional: bool,
}

/// Per-field evaluation state threaded through one rule chain.
///
/// `data` is the raw input of the current scope and `validated` is the output
/// assembled so far for that scope; both are read-only and used to resolve
/// cross-field arguments.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    field: String,
    value: Value,
    scope: Scope,
    message: Option<String>,
    data: Option<&'a Value>,
    validated: Option<&'a Value>,
    value_set: bool,
    valid: bool,
    skipped: bool,
    excluded: bool,
    numeric: bool,
}

impl<'a> Context<'a> {
    pub fn new(
        field: impl Into<String>,
        value: Value,
        data: Option<&'a Value>,
        validated: Option<&'a Value>,
        scope: Scope,
    ) -> Self {
        Self {
            field: field.into(),
            value,
            scope,
            message: None,
            data,
            validated,
            value_set: true,
            valid: true,
            skipped: false,
            excluded: false,
            numeric: false,
        }
    }

    /// Independent copy for one element of a fan-out. Flags carry over;
    /// field, value, sources and scope are replaced.
    pub fn duplicate<'b>(
        &self,
        field: impl Into<String>,
        value: Value,
        data: Option<&'b Value>,
        validated: Option<&'b Value>,
        scope: Scope,
    ) -> Context<'b>
    where
        'a: 'b,
    {
        Context {
            field: field.into(),
            value,
            scope,
            message: self.message.clone(),
            data,
            validated,
            value_set: true,
            valid: true,
            skipped: self.skipped,
            excluded: self.excluded,
            numeric: self.numeric,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn prefix(&self) -> Option<&str> {
        self.scope.prefix.as_deref()
    }

    pub fn suffix(&self) -> Option<&str> {
        self.scope.suffix.as_deref()
    }

    pub fn position(&self) -> Option<usize> {
        self.scope.position
    }

    pub fn is_positional(&self) -> bool {
        self.scope.positional
    }

    pub fn data(&self) -> Option<&'a Value> {
        self.data
    }

    pub fn validated(&self) -> Option<&'a Value> {
        self.validated
    }

    pub fn set_value(&mut self, value: Value) -> &mut Self {
        self.value = value;
        self.value_set = true;
        self.valid = true;
        self
    }

    pub fn is_value_set(&self) -> bool {
        self.value_set
    }

    /// Reset the per-rule flags so the next rule starts neutral.
    pub fn free_value_set(&mut self) -> &mut Self {
        self.value_set = false;
        self.valid = false;
        self.skipped = false;
        self.message = None;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn mark_valid(&mut self) -> &mut Self {
        self.valid = true;
        self
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Message used verbatim if the current rule fails.
    pub fn set_message(&mut self, message: Option<String>) -> &mut Self {
        self.message = message;
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Stop the rest of this field's chain.
    pub fn skip(&mut self) -> &mut Self {
        self.skipped = true;
        self
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    /// Keep this field out of the output document.
    pub fn exclude(&mut self) -> &mut Self {
        self.excluded = true;
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    pub fn set_numeric(&mut self, numeric: bool) -> &mut Self {
        self.numeric = numeric;
        self
    }

    /// Dotted address of this field: `prefix.position.field`.
    pub fn path(&self) -> String {
        let mut elements: Vec<String> = Vec::with_capacity(3);
        if let Some(prefix) = self.prefix().filter(|p| !p.is_empty()) {
            elements.push(prefix.to_string());
        }
        if let Some(position) = self.position() {
            elements.push(position.to_string());
        }
        elements.push(self.field.clone());
        elements.join(".")
    }

    fn scoped(&self, field: &str) -> String {
        match self.position() {
            Some(position) => format!("{position}.{field}"),
            None => field.to_string(),
        }
    }

    /// Does a sibling field exist (even as null) in the output so far or the raw input?
    pub fn check_other(&self, field: &str) -> bool {
        let key = self.scoped(field);
        self.validated.and_then(|v| path::get(v, &key)).is_some()
            || self.data.and_then(|d| path::get(d, &key)).is_some()
    }

    /// Sibling value, preferring the validated output over the raw input.
    /// Null counts as absent on either side.
    pub fn get_other(&self, field: &str) -> Option<&'a Value> {
        let key = self.scoped(field);
        self.validated
            .and_then(|v| path::get(v, &key))
            .filter(|v| !v.is_null())
            .or_else(|| {
                self.data
                    .and_then(|d| path::get(d, &key))
                    .filter(|v| !v.is_null())
            })
    }

    pub fn get_other_or(&self, field: &str, default: Value) -> Value {
        self.get_other(field).cloned().unwrap_or(default)
    }

    /// Element count for lists/maps; numeric magnitude when flagged numeric;
    /// character length otherwise.
    pub fn get_size(&self, field: Option<&str>) -> f64 {
        let value = match field {
            Some(f) => self.get_other(f).unwrap_or(&NULL),
            None => &self.value,
        };
        match value {
            Value::Array(items) => items.len() as f64,
            Value::Object(map) => map.len() as f64,
            scalar if self.numeric => match scalar {
                Value::Number(n) => n.as_f64().unwrap_or_default(),
                Value::String(s) => parse_numeric(s)
                    .and_then(|v| v.as_f64())
                    .unwrap_or_default(),
                Value::Bool(b) => f64::from(u8::from(*b)),
                _ => 0.0,
            },
            scalar => scalar_string(scalar)
                .map(|s| s.chars().count() as f64)
                .unwrap_or_default(),
        }
    }

    /// Resolve a comparable date from this value, a sibling field named by
    /// `field`, or the literal `field` itself. Never fails; `None` on any parse error.
    pub fn get_date(
        &self,
        field: Option<&Arg>,
        format: Option<&str>,
        timezone: Option<&str>,
    ) -> Option<DateTime<FixedOffset>> {
        match field {
            None => dates::resolve(&self.value, format, timezone),
            Some(Arg::Str(name)) if self.check_other(name) => {
                dates::resolve(self.get_other(name).unwrap_or(&NULL), format, timezone)
            }
            Some(arg) => dates::resolve(&arg.to_value(), format, timezone),
        }
    }

    /// Compare this value's date against `against` (or now when absent).
    /// Either side failing to parse is a configuration error.
    pub fn compare_date(
        &self,
        against: Option<&Arg>,
        format: Option<&str>,
        timezone: Option<&str>,
    ) -> Result<Ordering> {
        let this = self.get_date(None, format, timezone);
        let other = match against {
            Some(arg) if !matches!(arg, Arg::Null) => self.get_date(Some(arg), format, timezone),
            _ => Zone::parse(timezone).map(Zone::now),
        };
        match (this, other) {
            (Some(a), Some(b)) => Ok(a.cmp(&b)),
            _ => Err(RuleError::InvalidDate(self.path())),
        }
    }
}
