// src/expression.rs
//! Rule chain declarations and the `rule:arg,arg|rule` expression grammar.

use crate::comparison::stringify;
use crate::context::Context;
use crate::errors::{Result, RuleError};
use crate::parser::Parser;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Caller-supplied condition used by `exclude_if` and friends in place of a field name.
pub type Predicate = Arc<dyn Fn(&Context<'_>) -> bool + Send + Sync>;

/// A single rule argument.
#[derive(Clone)]
pub enum Arg {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// List or map literal, only reachable through the pre-parsed form.
    Json(Value),
    Predicate(Predicate),
}

impl Arg {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Context<'_>) -> bool + Send + Sync + 'static,
    {
        Arg::Predicate(Arc::new(f))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view: numbers as-is, numeric strings parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Arg::Int(i) => Some(*i as f64),
            Arg::Float(f) => Some(*f),
            Arg::Str(s) => crate::comparison::parse_numeric(s).and_then(|v| v.as_f64()),
            _ => None,
        }
    }

    /// Loose truthiness, used for flag arguments such as `date:true`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Arg::Null => false,
            Arg::Bool(b) => *b,
            Arg::Int(i) => *i != 0,
            Arg::Float(f) => *f != 0.0,
            Arg::Str(s) => !s.is_empty() && s != "0",
            Arg::Json(v) => crate::comparison::is_truthy(v),
            Arg::Predicate(_) => true,
        }
    }

    /// Document form of the argument; predicates have none and map to null.
    pub fn to_value(&self) -> Value {
        match self {
            Arg::Null | Arg::Predicate(_) => Value::Null,
            Arg::Bool(b) => Value::Bool(*b),
            Arg::Int(i) => Value::from(*i),
            Arg::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Arg::Str(s) => Value::String(s.clone()),
            Arg::Json(v) => v.clone(),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Null => write!(f, "Null"),
            Arg::Bool(b) => write!(f, "Bool({b})"),
            Arg::Int(i) => write!(f, "Int({i})"),
            Arg::Float(x) => write!(f, "Float({x})"),
            Arg::Str(s) => write!(f, "Str({s:?})"),
            Arg::Json(v) => write!(f, "Json({v})"),
            Arg::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Predicate(_) => write!(f, "{{closure}}"),
            other => write!(f, "{}", stringify(&other.to_value())),
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::Null, Arg::Null) => true,
            (Arg::Bool(a), Arg::Bool(b)) => a == b,
            (Arg::Int(a), Arg::Int(b)) => a == b,
            (Arg::Float(a), Arg::Float(b)) => a == b,
            (Arg::Str(a), Arg::Str(b)) => a == b,
            (Arg::Json(a), Arg::Json(b)) => a == b,
            (Arg::Predicate(a), Arg::Predicate(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<i64> for Arg {
    fn from(i: i64) -> Self {
        Arg::Int(i)
    }
}

impl From<i32> for Arg {
    fn from(i: i32) -> Self {
        Arg::Int(i64::from(i))
    }
}

impl From<f64> for Arg {
    fn from(f: f64) -> Self {
        Arg::Float(f)
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Arg::Null,
            Value::Bool(b) => Arg::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Arg::Int(i),
                None => Arg::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Arg::Str(s),
            other => Arg::Json(other),
        }
    }
}

/// Coerce one raw argument token.
///
/// Prefixed integers (`0x`, `0b`, leading-zero octal) come first, then plain
/// numbers, then the named constants `true`/`false`/`null`. Anything else is
/// kept as a trimmed string.
pub fn cast(token: &str) -> Arg {
    let checked = token.trim();
    if let Ok(i) = Parser::new(checked).parse_radix_int() {
        return Arg::Int(i);
    }
    if let Ok(v) = Parser::new(checked).parse_number_literal() {
        return Arg::from(v);
    }
    if let Some(constant) = named_constant(checked) {
        return constant;
    }
    Arg::Str(checked.to_string())
}

fn named_constant(word: &str) -> Option<Arg> {
    match word.to_ascii_lowercase().as_str() {
        "true" => Some(Arg::Bool(true)),
        "false" => Some(Arg::Bool(false)),
        "null" => Some(Arg::Null),
        _ => None,
    }
}

/// Ordered rule-name → arguments list for one field.
///
/// Order is execution order. Re-inserting a name replaces its arguments but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleChain {
    rules: Vec<(String, Vec<Arg>)>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a rule without arguments.
    pub fn rule(self, name: impl Into<String>) -> Self {
        self.rule_with(name, Vec::<Arg>::new())
    }

    /// Builder: append a rule with arguments.
    pub fn rule_with<A: Into<Arg>>(
        mut self,
        name: impl Into<String>,
        args: impl IntoIterator<Item = A>,
    ) -> Self {
        self.insert(name, args.into_iter().map(Into::into).collect());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, args: Vec<Arg>) {
        let name = name.into();
        match self.rules.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = args,
            None => self.rules.push((name, args)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Arg]> {
        self.rules
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, args)| args.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arg])> {
        self.rules.iter().map(|(n, a)| (n.as_str(), a.as_slice()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Pre-parsed object form: `{"min": [3], "required": []}`.
    /// A scalar argument stands for a one-element list; null means no arguments.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut chain = RuleChain::new();
        for (name, args) in map {
            let args = match args {
                Value::Null => Vec::new(),
                Value::Array(items) => items.iter().cloned().map(Arg::from).collect(),
                other => vec![Arg::from(other.clone())],
            };
            chain.insert(name.clone(), args);
        }
        chain
    }
}

impl From<&str> for RuleChain {
    fn from(expr: &str) -> Self {
        parse(expr)
    }
}

impl From<String> for RuleChain {
    fn from(expr: String) -> Self {
        parse(&expr)
    }
}

impl From<&String> for RuleChain {
    fn from(expr: &String) -> Self {
        parse(expr)
    }
}

/// Parse `rule1:arg1,arg2|rule2:arg1|rule3` into a [`RuleChain`].
///
/// Empty segments are dropped, so a trailing `|` is harmless. Only the first
/// `:` separates the name from its argument line.
pub fn parse(expr: &str) -> RuleChain {
    let mut chain = RuleChain::new();
    let mut p = Parser::new(expr);
    while !p.eof() {
        let segment = p.take_until('|');
        p.consume_char('|');
        if segment.is_empty() {
            continue;
        }
        let (name, line) = match segment.split_once(':') {
            Some((name, line)) => (name, Some(line)),
            None => (segment, None),
        };
        let args = match line {
            Some(line) if !line.is_empty() => line.split(',').map(|t| cast(t.trim())).collect(),
            _ => Vec::new(),
        };
        chain.insert(name.trim(), args);
    }
    chain
}

/// Ordered field-path → rule chain declarations for one `validate` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRules {
    fields: Vec<(String, RuleChain)>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare (or redeclare) a field.
    pub fn field(mut self, path: impl Into<String>, chain: impl Into<RuleChain>) -> Self {
        self.insert(path, chain.into());
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, chain: RuleChain) {
        let path = path.into();
        match self.fields.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => slot.1 = chain,
            None => self.fields.push((path, chain)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleChain)> {
        self.fields.iter().map(|(p, c)| (p.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read declarations from a JSON object whose members are either
    /// expression strings or pre-parsed `{rule: [args]}` objects.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| RuleError::Declaration("expected an object of field rules".into()))?;
        let mut rules = FieldRules::new();
        for (path, chain) in map {
            let chain = match chain {
                Value::String(expr) => parse(expr),
                Value::Object(m) => RuleChain::from_map(m),
                other => {
                    return Err(RuleError::Declaration(format!(
                        "field `{path}` has a {} rule chain, expected string or object",
                        crate::comparison::type_name(other)
                    )))
                }
            };
            rules.insert(path.clone(), chain);
        }
        Ok(rules)
    }
}

impl<P: Into<String>, C: Into<RuleChain>> FromIterator<(P, C)> for FieldRules {
    fn from_iter<T: IntoIterator<Item = (P, C)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(FieldRules::new(), |rules, (p, c)| rules.field(p, c))
    }
}
