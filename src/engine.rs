use crate::context::{Context, Scope};
use crate::errors::Result;
use crate::expression::{FieldRules, RuleChain};
use crate::path;
use crate::rules::messages::{render, MESSAGE_DEFAULT};
use crate::rules::{Outcome, Registry};
use crate::violations::Violations;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateOptions {
    /// Message templates keyed by declared field path; they override rule defaults.
    pub messages: HashMap<String, String>,
    /// Stop at the first field that records a violation.
    pub skip_on_error: bool,
}

impl ValidateOptions {
    pub fn with_message(mut self, field: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(field.into(), template.into());
        self
    }

    pub fn skip_on_error(mut self, skip: bool) -> Self {
        self.skip_on_error = skip;
        self
    }
}

/// Result of one `validate` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    /// True iff `violations` is empty.
    pub success: bool,
    /// Coerced output: declared, non-excluded, non-failing fields only.
    pub data: Value,
    pub violations: Violations,
}

/// What one field (or one fanned-out element) hands back to its caller.
#[derive(Debug)]
struct FieldResult {
    value: Value,
    excluded: bool,
    skipped: bool,
    violations: Violations,
    /// Absolute paths of list elements kept only as placeholders so later
    /// declarations over the same list stay aligned.
    holes: Vec<String>,
}

/// Split a declared path at its first `*`: `("items", Some("name"), false)` for
/// `items.*.name`, `("tags", None, true)` for `tags.*`. Paths without a
/// wildcard come back unchanged.
pub fn split_field(field: &str) -> (&str, Option<&str>, bool) {
    match field.find('*') {
        None => (field, None, false),
        Some(pos) => {
            let base = field[..pos].strip_suffix('.').unwrap_or(&field[..pos]);
            let suffix = field
                .get(pos + 1..)
                .and_then(|rest| rest.strip_prefix('.'))
                .filter(|rest| !rest.is_empty());
            (base, suffix, field.ends_with('*'))
        }
    }
}

/// Values a wildcard iterates over. Empty input still yields one (null) element
/// so that `required` on `list.*` can fail.
fn fan_out_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) if !items.is_empty() => items.clone(),
        Value::Array(_) | Value::Null => vec![Value::Null],
        other => vec![other.clone()],
    }
}

/// Runs declarations against one document with a fixed registry.
pub(crate) struct Engine<'r> {
    registry: &'r Registry,
}

impl<'r> Engine<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub(crate) fn run(
        &self,
        rules: &FieldRules,
        data: &Value,
        options: &ValidateOptions,
    ) -> Result<Validation> {
        debug!(fields = rules.len(), skip_on_error = options.skip_on_error, "validation started");
        let mut output = Value::Object(Map::new());
        let mut violations = Violations::new();
        let mut holes = Vec::new();

        for (declared, chain) in rules.iter() {
            let (base, suffix, positional) = split_field(declared);
            let scope = Scope {
                suffix: suffix.map(str::to_string),
                positional,
                ..Scope::default()
            };
            let value = path::get(data, base).cloned().unwrap_or(Value::Null);
            let custom = options.messages.get(declared).map(String::as_str);
            let ctx = Context::new(base, value, Some(data), Some(&output), scope);
            let result = self.evaluate(chain, ctx, custom)?;

            if !result.violations.is_empty() {
                violations.merge(result.violations);
                if options.skip_on_error {
                    debug!(field = declared, "stopping at first failing field");
                    break;
                }
                continue;
            }
            if !result.excluded && !result.skipped {
                merge_value(path::get_or_create(&mut output, base), result.value);
                holes.extend(result.holes);
            }
        }
        drop_holes(&mut output, holes);

        let success = violations.is_empty();
        debug!(success, "validation finished");
        Ok(Validation {
            success,
            data: output,
            violations,
        })
    }

    fn evaluate(
        &self,
        chain: &RuleChain,
        ctx: Context<'_>,
        custom: Option<&str>,
    ) -> Result<FieldResult> {
        if ctx.suffix().is_some() || ctx.is_positional() {
            self.fan_out(chain, ctx, custom)
        } else {
            self.evaluate_leaf(chain, ctx, custom)
        }
    }

    /// Evaluate the chain once per element and reassemble the list.
    fn fan_out(
        &self,
        chain: &RuleChain,
        mut ctx: Context<'_>,
        custom: Option<&str>,
    ) -> Result<FieldResult> {
        let items = fan_out_items(ctx.value());
        let prefix = ctx.path();
        let (field, inner_suffix, inner_positional) = match ctx.suffix() {
            Some(suffix) => {
                let (field, inner, positional) = split_field(suffix);
                (Some(field.to_string()), inner.map(str::to_string), positional)
            }
            None => (None, None, false),
        };
        debug!(path = %prefix, elements = items.len(), "fanning out");

        let source = Value::Array(items);
        let mut assembled = Value::Object(Map::new());
        let mut violations = Violations::new();
        let mut holes = Vec::new();
        let count = source.as_array().map_or(0, Vec::len);

        for position in 0..count {
            let item = &source[position];
            let child = match &field {
                Some(name) => ctx.duplicate(
                    name.as_str(),
                    path::get(item, name).cloned().unwrap_or(Value::Null),
                    Some(&source),
                    Some(&assembled),
                    Scope {
                        prefix: Some(prefix.clone()),
                        suffix: inner_suffix.clone(),
                        position: Some(position),
                        positional: inner_positional,
                    },
                ),
                None => ctx.duplicate(
                    position.to_string(),
                    item.clone(),
                    Some(&source),
                    Some(&assembled),
                    Scope {
                        prefix: Some(prefix.clone()),
                        ..Scope::default()
                    },
                ),
            };
            let result = self.evaluate(chain, child, custom)?;

            if !result.violations.is_empty() {
                violations.merge(result.violations);
            } else if !result.excluded && !result.skipped {
                holes.extend(result.holes);
                let element = match &field {
                    Some(name) => {
                        let mut element = Map::new();
                        element.insert(name.clone(), result.value);
                        Value::Object(element)
                    }
                    None => result.value,
                };
                if let Value::Object(slots) = &mut assembled {
                    slots.insert(position.to_string(), element);
                }
            }
        }

        if violations.is_empty() {
            let mut slots = match assembled {
                Value::Object(slots) => slots,
                _ => Map::new(),
            };
            let values = (0..count)
                .map(|position| {
                    slots.remove(&position.to_string()).unwrap_or_else(|| {
                        holes.push(format!("{prefix}.{position}"));
                        placeholder(field.is_some())
                    })
                })
                .collect();
            ctx.set_value(Value::Array(values));
        } else {
            holes.clear();
        }
        Ok(FieldResult {
            excluded: ctx.is_excluded(),
            skipped: ctx.is_skipped(),
            value: ctx.into_value(),
            violations,
            holes,
        })
    }

    /// Run the chain in declaration order: skip stops it, the first failure
    /// records a message and stops it, any other outcome may replace the value.
    fn evaluate_leaf(
        &self,
        chain: &RuleChain,
        mut ctx: Context<'_>,
        custom: Option<&str>,
    ) -> Result<FieldResult> {
        let mut violations = Violations::new();
        for (rule, args) in chain.iter() {
            ctx.free_value_set();
            trace!(rule, path = %ctx.path(), "running rule");
            let outcome = self.registry.execute(rule, &mut ctx, args)?;

            if ctx.is_skipped() {
                break;
            }
            match outcome {
                Outcome::Fail => {
                    let message = match ctx.message() {
                        Some(message) => message.to_string(),
                        None => {
                            let template = custom
                                .or_else(|| self.registry.message(rule))
                                .unwrap_or(MESSAGE_DEFAULT);
                            render(template, args, &ctx)
                        }
                    };
                    violations.push(&ctx.path(), message);
                    break;
                }
                Outcome::Value(value) if !ctx.is_value_set() => {
                    ctx.set_value(value);
                }
                _ => {}
            }
        }
        Ok(FieldResult {
            excluded: ctx.is_excluded(),
            skipped: ctx.is_skipped(),
            value: ctx.into_value(),
            violations,
            holes: Vec::new(),
        })
    }
}

/// Stand-in for an element that produced no value: an empty row for
/// `list.*.field`, null for `list.*`.
fn placeholder(row: bool) -> Value {
    if row {
        Value::Object(Map::new())
    } else {
        Value::Null
    }
}

/// Remove the placeholders no other declaration filled in. Deeper and later
/// positions go first so earlier removals never shift a pending path.
fn drop_holes(output: &mut Value, mut holes: Vec<String>) {
    holes.sort_by_cached_key(|hole| {
        path::Path::parse(hole)
            .segments
            .into_iter()
            .map(|seg| (seg.index, seg.key))
            .collect::<Vec<_>>()
    });
    holes.dedup();
    for hole in holes.iter().rev() {
        let Some((parent, last)) = hole.rsplit_once('.') else {
            continue;
        };
        let Ok(index) = last.parse::<usize>() else {
            continue;
        };
        if let Some(Value::Array(items)) = path::get_mut(output, parent) {
            let unfilled = match items.get(index) {
                Some(Value::Null) => true,
                Some(Value::Object(row)) => row.is_empty(),
                _ => false,
            };
            if unfilled {
                trace!(path = %hole, "dropping unfilled element");
                items.remove(index);
            }
        }
    }
}

/// Write `incoming` over `slot`, merging maps by key and lists by index.
fn merge_value(slot: &mut Value, incoming: Value) {
    match (slot, incoming) {
        (Value::Object(existing), Value::Object(more)) => {
            for (key, value) in more {
                match existing.get_mut(&key) {
                    Some(inner) => merge_value(inner, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(more)) => {
            for (i, value) in more.into_iter().enumerate() {
                match existing.get_mut(i) {
                    Some(inner) => merge_value(inner, value),
                    None => existing.push(value),
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}
