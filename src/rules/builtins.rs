//! The built-in rule catalog.

use super::{Outcome, Rule};
use crate::comparison::{
    is_blank, is_numeric, loose_eq, parse_numeric, scalar_string, strict_eq,
};
use crate::context::Context;
use crate::errors::{Result, RuleError};
use crate::expression::Arg;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::RangeInclusive;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+[^\s]*$").unwrap());

const PATTERN_DELIMITERS: &str = "/#~!%@|;";

type CheckFn = fn(&mut Context<'_>, &[Arg]) -> Result<Outcome>;

/// A catalog entry: a plain function with its name and arity.
pub struct Builtin {
    name: &'static str,
    arity: RangeInclusive<usize>,
    check: CheckFn,
}

impl Builtin {
    const fn new(name: &'static str, arity: RangeInclusive<usize>, check: CheckFn) -> Self {
        Self { name, arity, check }
    }
}

impl Rule for Builtin {
    fn name(&self) -> &str {
        self.name
    }
    fn arity(&self) -> RangeInclusive<usize> {
        self.arity.clone()
    }
    fn check(&self, ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
        (self.check)(ctx, args)
    }
}

const ANY: usize = usize::MAX;

pub fn catalog() -> Vec<Builtin> {
    vec![
        Builtin::new("accepted", 0..=0, accepted),
        Builtin::new("after", 1..=3, after),
        Builtin::new("after_or_equal", 1..=3, after_or_equal),
        Builtin::new("alpha", 0..=0, alpha),
        Builtin::new("alnum", 0..=0, alnum),
        Builtin::new("array", 0..=0, array),
        Builtin::new("before", 1..=3, before),
        Builtin::new("before_or_equal", 1..=3, before_or_equal),
        Builtin::new("between", 2..=2, between),
        Builtin::new("boolean", 0..=0, boolean),
        Builtin::new("confirmed", 0..=1, confirmed),
        Builtin::new("date", 0..=3, date),
        Builtin::new("date_equals", 1..=3, date_equals),
        Builtin::new("date_format", 1..=2, date_format),
        Builtin::new("different", 1..=1, different),
        Builtin::new("digits", 0..=0, digits),
        Builtin::new("digits_between", 2..=2, digits_between),
        Builtin::new("distinct", 0..=1, distinct),
        Builtin::new("email", 0..=0, email),
        Builtin::new("ends_with", 1..=ANY, ends_with),
        Builtin::new("exclude", 0..=0, exclude),
        Builtin::new("exclude_if", 1..=2, exclude_if),
        Builtin::new("exclude_unless", 1..=2, exclude_unless),
        Builtin::new("gt", 1..=1, gt),
        Builtin::new("gte", 1..=1, gte),
        Builtin::new("in", 0..=ANY, in_list),
        Builtin::new("in_array", 1..=1, in_array),
        Builtin::new("integer", 0..=0, integer),
        Builtin::new("ip", 0..=0, ip),
        Builtin::new("ip4", 0..=0, ip4),
        Builtin::new("ip6", 0..=0, ip6),
        Builtin::new("json", 0..=2, json),
        Builtin::new("lt", 1..=1, lt),
        Builtin::new("lte", 1..=1, lte),
        Builtin::new("match", 1..=1, matches_pattern),
        Builtin::new("max", 1..=1, max),
        Builtin::new("max_length", 1..=1, max_length),
        Builtin::new("min", 1..=1, min),
        Builtin::new("min_length", 1..=1, min_length),
        Builtin::new("not_in", 0..=ANY, not_in),
        Builtin::new("not_match", 1..=1, not_match),
        Builtin::new("numeric", 0..=0, numeric),
        Builtin::new("optional", 0..=0, optional),
        Builtin::new("required", 0..=0, required),
        Builtin::new("required_if", 1..=2, required_if),
        Builtin::new("required_unless", 1..=2, required_unless),
        Builtin::new("same", 1..=2, same),
        Builtin::new("size", 1..=1, size),
        Builtin::new("starts_with", 1..=ANY, starts_with),
        Builtin::new("string", 0..=0, string),
        Builtin::new("trim", 0..=0, trim),
        Builtin::new("url", 0..=0, url),
    ]
}

// ─── argument helpers ───────────────────────────────────────────────────────

fn number_arg(rule: &str, args: &[Arg], i: usize) -> Result<f64> {
    args.get(i)
        .and_then(Arg::as_f64)
        .ok_or_else(|| RuleError::argument(rule, format!("argument {i} should be numeric")))
}

/// Field names may arrive cast to integers (`gt:0` names field "0").
fn field_arg(rule: &str, args: &[Arg], i: usize) -> Result<String> {
    match args.get(i) {
        Some(Arg::Str(s)) => Ok(s.clone()),
        Some(Arg::Int(n)) => Ok(n.to_string()),
        _ => Err(RuleError::argument(rule, format!("argument {i} should be a field name"))),
    }
}

fn text_arg(rule: &str, args: &[Arg], i: usize) -> Result<String> {
    match args.get(i) {
        Some(Arg::Predicate(_)) | Some(Arg::Json(_)) | None => Err(RuleError::argument(
            rule,
            format!("argument {i} should be a scalar"),
        )),
        Some(arg) => Ok(arg.to_string()),
    }
}

fn optional_text(args: &[Arg], i: usize) -> Option<&str> {
    args.get(i).and_then(Arg::as_str).filter(|s| !s.is_empty())
}

fn flag(args: &[Arg], i: usize, default: bool) -> bool {
    args.get(i).map_or(default, Arg::is_truthy)
}

/// `field, value` or `predicate` condition shared by the `*_if`/`*_unless` rules.
fn condition(rule: &str, ctx: &Context<'_>, args: &[Arg]) -> Result<bool> {
    match args.first() {
        Some(Arg::Predicate(predicate)) => Ok(predicate(ctx)),
        Some(Arg::Str(_)) | Some(Arg::Int(_)) => {
            let field = field_arg(rule, args, 0)?;
            let expected = args.get(1).map(Arg::to_value).unwrap_or(Value::Null);
            let actual = ctx.get_other_or(&field, Value::Null);
            Ok(strict_eq(&actual, &expected))
        }
        _ => Err(RuleError::argument(
            rule,
            "argument 0 should be a field name or a predicate",
        )),
    }
}

fn text_value(ctx: &Context<'_>) -> Option<String> {
    scalar_string(ctx.value())
}

fn compare_dates(ctx: &Context<'_>, args: &[Arg]) -> Result<Ordering> {
    ctx.compare_date(args.first(), optional_text(args, 1), optional_text(args, 2))
}

fn ascii_class(ctx: &Context<'_>, class: fn(&char) -> bool) -> Outcome {
    match ctx.value() {
        Value::String(s) => (!s.is_empty() && s.chars().all(|c| class(&c))).into(),
        _ => Outcome::Fail,
    }
}

/// Values a list-shaped argument stands for: list items, map values, or a lone scalar.
fn as_members(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => map.values().cloned().collect(),
        Some(other) => vec![other.clone()],
    }
}

// ─── presence ───────────────────────────────────────────────────────────────

fn required(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok((!is_blank(ctx.value())).into())
}

fn required_if(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let needed = condition("required_if", ctx, args)?;
    Ok((!(needed && is_blank(ctx.value()))).into())
}

fn required_unless(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let waived = condition("required_unless", ctx, args)?;
    Ok((waived || !is_blank(ctx.value())).into())
}

fn optional(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    if is_blank(ctx.value()) {
        ctx.skip();
    }
    Ok(Outcome::Pass)
}

fn exclude(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    ctx.exclude();
    Ok(Outcome::Pass)
}

fn exclude_if(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    if condition("exclude_if", ctx, args)? {
        ctx.exclude();
    }
    Ok(Outcome::Pass)
}

fn exclude_unless(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    if !condition("exclude_unless", ctx, args)? {
        ctx.exclude();
    }
    Ok(Outcome::Pass)
}

fn accepted(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    let ok = match ctx.value() {
        Value::String(s) => matches!(s.as_str(), "yes" | "on" | "1"),
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    };
    Ok(ok.into())
}

// ─── types and coercion ─────────────────────────────────────────────────────

fn array(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(matches!(ctx.value(), Value::Array(_) | Value::Object(_)).into())
}

fn string(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(ctx.value().is_string().into())
}

fn boolean(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    let coerced = match ctx.value() {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "TRUE" | "1" => Some(true),
            "false" | "FALSE" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    };
    match coerced {
        Some(b) => {
            ctx.set_value(Value::Bool(b));
            Ok(Outcome::Pass)
        }
        None => Ok(Outcome::Fail),
    }
}

fn integer(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    let coerced = match ctx.value() {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_numeric(s).and_then(|v| v.as_i64()),
        _ => None,
    };
    ctx.set_numeric(coerced.is_some());
    match coerced {
        Some(i) => {
            ctx.set_value(Value::from(i));
            Ok(Outcome::Pass)
        }
        None => Ok(Outcome::Fail),
    }
}

fn numeric(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    let coerced = match ctx.value() {
        Value::Number(_) => Some(ctx.value().clone()),
        Value::String(s) => parse_numeric(s),
        _ => None,
    };
    ctx.set_numeric(coerced.is_some());
    match coerced {
        Some(n) => {
            ctx.set_value(n);
            Ok(Outcome::Pass)
        }
        None => Ok(Outcome::Fail),
    }
}

fn json(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let convert = flag(args, 0, false);
    let text = match ctx.value() {
        Value::String(s) => s,
        // Already decoded by an earlier run.
        _ if convert => return Ok(Outcome::Pass),
        _ => return Ok(Outcome::Fail),
    };
    match serde_json::from_str::<Value>(text) {
        // A string literal stays encoded so a second run decodes it the same way.
        Ok(Value::String(_)) if convert => Ok(Outcome::Pass),
        Ok(decoded) if convert => Ok(Outcome::Value(decoded)),
        Ok(decoded) => Ok((!decoded.is_null()).into()),
        Err(_) => Ok(Outcome::Fail),
    }
}

fn trim(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(match ctx.value() {
        Value::String(s) => Outcome::Value(Value::String(s.trim().to_string())),
        _ => Outcome::Pass,
    })
}

// ─── string formats ─────────────────────────────────────────────────────────

fn alpha(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(ascii_class(ctx, char::is_ascii_alphabetic))
}

fn alnum(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(ascii_class(ctx, char::is_ascii_alphanumeric))
}

fn digits(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    if let Value::Number(n) = ctx.value() {
        return Ok(n.is_u64().into());
    }
    Ok(ascii_class(ctx, char::is_ascii_digit))
}

fn digits_between(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let min = number_arg("digits_between", args, 0)?;
    let max = number_arg("digits_between", args, 1)?;
    if !is_numeric(ctx.value()) {
        return Ok(Outcome::Fail);
    }
    let length = text_value(ctx).map_or(0, |s| s.chars().count()) as f64;
    Ok((length >= min && length <= max).into())
}

fn email(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(ctx.value().as_str().is_some_and(|s| EMAIL_REGEX.is_match(s)).into())
}

fn url(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(ctx.value().as_str().is_some_and(|s| URL_REGEX.is_match(s)).into())
}

fn ip(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(ctx.value().as_str().is_some_and(|s| s.parse::<IpAddr>().is_ok()).into())
}

fn ip4(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(ctx.value().as_str().is_some_and(|s| s.parse::<Ipv4Addr>().is_ok()).into())
}

fn ip6(ctx: &mut Context<'_>, _: &[Arg]) -> Result<Outcome> {
    Ok(ctx.value().as_str().is_some_and(|s| s.parse::<Ipv6Addr>().is_ok()).into())
}

fn starts_with(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    affix(ctx, args, |value, candidate| value.starts_with(candidate))
}

fn ends_with(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    affix(ctx, args, |value, candidate| value.ends_with(candidate))
}

fn affix(ctx: &Context<'_>, args: &[Arg], test: fn(&str, &str) -> bool) -> Result<Outcome> {
    let value = match text_value(ctx) {
        Some(v) => v.to_lowercase(),
        None => return Ok(Outcome::Fail),
    };
    Ok(args
        .iter()
        .map(|arg| arg.to_string().to_lowercase())
        .any(|candidate| test(&value, &candidate))
        .into())
}

/// Accepts bare regexes and delimited ones with trailing flags (`/^foo$/i`).
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let invalid = |message: String| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        message,
    };
    let delimited = pattern
        .chars()
        .next()
        .filter(|open| PATTERN_DELIMITERS.contains(*open))
        .and_then(|open| {
            let rest = &pattern[open.len_utf8()..];
            let end = rest.rfind(open)?;
            let flags = &rest[end + open.len_utf8()..];
            flags
                .chars()
                .all(|f| matches!(f, 'i' | 'm' | 's' | 'x' | 'U'))
                .then(|| (&rest[..end], flags))
        });
    let source = match delimited {
        Some((body, "")) => body.to_string(),
        Some((body, flags)) => format!("(?{flags}){body}"),
        None => pattern.to_string(),
    };
    Regex::new(&source).map_err(|e| invalid(e.to_string()))
}

fn pattern_matches(rule: &str, ctx: &Context<'_>, args: &[Arg]) -> Result<Option<bool>> {
    let pattern = text_arg(rule, args, 0)?;
    let regex = compile_pattern(&pattern)?;
    Ok(text_value(ctx).map(|s| regex.is_match(&s)))
}

fn matches_pattern(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok(pattern_matches("match", ctx, args)?.unwrap_or(false).into())
}

fn not_match(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok(pattern_matches("not_match", ctx, args)?
        .map(|matched| !matched)
        .unwrap_or(false)
        .into())
}

// ─── sizes ──────────────────────────────────────────────────────────────────

fn between(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let min = number_arg("between", args, 0)?;
    let max = number_arg("between", args, 1)?;
    let size = ctx.get_size(None);
    Ok((size >= min && size <= max).into())
}

fn min(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let bound = number_arg("min", args, 0)?;
    Ok((ctx.get_size(None) >= bound).into())
}

fn max(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let bound = number_arg("max", args, 0)?;
    Ok((ctx.get_size(None) <= bound).into())
}

fn size(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let bound = number_arg("size", args, 0)?;
    Ok(((ctx.get_size(None) - bound).abs() < f64::EPSILON).into())
}

fn text_length(ctx: &Context<'_>) -> f64 {
    match ctx.value() {
        Value::Array(items) => items.len() as f64,
        Value::Object(map) => map.len() as f64,
        other => scalar_string(other).map_or(0, |s| s.chars().count()) as f64,
    }
}

fn min_length(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let bound = number_arg("min_length", args, 0)?;
    Ok((text_length(ctx) >= bound).into())
}

fn max_length(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let bound = number_arg("max_length", args, 0)?;
    Ok((text_length(ctx) <= bound).into())
}

fn compare_sizes(rule: &str, ctx: &Context<'_>, args: &[Arg]) -> Result<Ordering> {
    let field = field_arg(rule, args, 0)?;
    let this = ctx.get_size(None);
    let other = ctx.get_size(Some(&field));
    Ok(this.partial_cmp(&other).unwrap_or(Ordering::Equal))
}

fn gt(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_sizes("gt", ctx, args)? == Ordering::Greater).into())
}

fn gte(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_sizes("gte", ctx, args)? != Ordering::Less).into())
}

fn lt(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_sizes("lt", ctx, args)? == Ordering::Less).into())
}

fn lte(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_sizes("lte", ctx, args)? != Ordering::Greater).into())
}

// ─── cross-field ────────────────────────────────────────────────────────────

fn confirmed(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let against = match args.first() {
        Some(_) => field_arg("confirmed", args, 0)?,
        None => format!("{}_confirmation", ctx.field()),
    };
    let ok = ctx.check_other(&against)
        && strict_eq(ctx.value(), &ctx.get_other_or(&against, Value::Null));
    Ok(ok.into())
}

fn different(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let field = field_arg("different", args, 0)?;
    let ok = !ctx.check_other(&field)
        || !strict_eq(ctx.value(), &ctx.get_other_or(&field, Value::Null));
    Ok(ok.into())
}

fn same(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let expected = match args.first() {
        Some(Arg::Str(field)) if ctx.check_other(field) => ctx.get_other_or(field, Value::Null),
        Some(arg) => arg.to_value(),
        None => Value::Null,
    };
    let ok = if flag(args, 1, true) {
        strict_eq(ctx.value(), &expected)
    } else {
        loose_eq(ctx.value(), &expected)
    };
    Ok(ok.into())
}

fn in_list(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok(args
        .iter()
        .any(|arg| loose_eq(ctx.value(), &arg.to_value()))
        .into())
}

fn not_in(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((!args.iter().any(|arg| loose_eq(ctx.value(), &arg.to_value()))).into())
}

fn in_array(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let field = field_arg("in_array", args, 0)?;
    let members = as_members(ctx.get_other(&field));
    Ok(members.iter().any(|m| loose_eq(ctx.value(), m)).into())
}

/// Values sharing this field's name across the sibling rows of the current
/// scope; falls back to the field's own list value.
fn sibling_values(ctx: &Context<'_>) -> Vec<Value> {
    let field = ctx.field();
    let data = ctx.data();
    let column: Vec<Value> = match data.filter(|_| ctx.position().is_some()) {
        Some(Value::Array(rows)) => rows
            .iter()
            .filter_map(|row| row.as_object()?.get(field).cloned())
            .collect(),
        Some(Value::Object(rows)) => rows
            .values()
            .filter_map(|row| row.as_object()?.get(field).cloned())
            .collect(),
        _ => Vec::new(),
    };
    if !column.is_empty() {
        return column;
    }
    // Element of a `list.*` fan-out: the list itself is the sibling set.
    if let Some(Value::Array(items)) = data {
        if ctx.position().is_none() && field.parse::<usize>().is_ok() {
            return items.clone();
        }
    }
    let own = data
        .and_then(|d| d.as_object())
        .and_then(|d| d.get(field))
        .unwrap_or(ctx.value());
    as_members(Some(own))
}

fn distinct(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let ignore_case = flag(args, 0, false);
    let values = sibling_values(ctx);
    let unique = values
        .iter()
        .unique_by(|v| match v {
            Value::String(s) if ignore_case => Value::String(s.to_lowercase()).to_string(),
            other => other.to_string(),
        })
        .count();
    Ok((unique == values.len()).into())
}

// ─── dates ──────────────────────────────────────────────────────────────────

fn after(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_dates(ctx, args)? == Ordering::Greater).into())
}

fn after_or_equal(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_dates(ctx, args)? != Ordering::Less).into())
}

fn before(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_dates(ctx, args)? == Ordering::Less).into())
}

fn before_or_equal(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_dates(ctx, args)? != Ordering::Greater).into())
}

fn date_equals(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    Ok((compare_dates(ctx, args)? == Ordering::Equal).into())
}

fn date(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let convert = flag(args, 0, false);
    let parsed = ctx.get_date(None, optional_text(args, 1), optional_text(args, 2));
    Ok(match parsed {
        Some(dt) if convert => Outcome::Value(Value::String(dt.to_rfc3339())),
        Some(_) => Outcome::Pass,
        None => Outcome::Fail,
    })
}

fn date_format(ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
    let format = text_arg("date_format", args, 0)?;
    Ok(ctx
        .get_date(None, Some(format.as_str()), optional_text(args, 1))
        .is_some()
        .into())
}
