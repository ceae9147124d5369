use crate::context::Context;
use crate::errors::{Result, RuleError};
use crate::expression::Arg;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

pub mod builtins;
pub mod messages;

/// What a rule reports back to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The value passes; it is kept as-is.
    Pass,
    /// The value fails; the chain stops and a violation is recorded.
    Fail,
    /// The value passes and is replaced, unless the rule already set one on the context.
    Value(Value),
}

impl From<bool> for Outcome {
    fn from(ok: bool) -> Self {
        if ok {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }
}

/// Trait for pluggable rules run by the validation engine.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;
    fn arity(&self) -> RangeInclusive<usize>;
    fn check(&self, ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome>;
}

/// Closure-backed rule, the shape custom rules are registered in.
pub struct RuleFn<F> {
    name: String,
    arity: RangeInclusive<usize>,
    f: F,
}

impl<F> RuleFn<F>
where
    F: Fn(&mut Context<'_>, &[Arg]) -> Result<Outcome> + Send + Sync,
{
    /// A rule accepting any number of arguments.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            arity: 0..=usize::MAX,
            f,
        }
    }

    pub fn with_arity(mut self, arity: RangeInclusive<usize>) -> Self {
        self.arity = arity;
        self
    }
}

impl<F> Rule for RuleFn<F>
where
    F: Fn(&mut Context<'_>, &[Arg]) -> Result<Outcome> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }
    fn arity(&self) -> RangeInclusive<usize> {
        self.arity.clone()
    }
    fn check(&self, ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
        (self.f)(ctx, args)
    }
}

/// Thread-safe rule and message registry.
///
/// Cloning is cheap; registration copies the tables on write, so a registry
/// shared across threads is never mutated underneath a running validation.
#[derive(Clone, Default)]
pub struct Registry {
    rules: Arc<HashMap<String, Arc<dyn Rule>>>,
    messages: Arc<HashMap<String, String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for rule in builtins::catalog() {
            registry.register(rule);
        }
        registry.set_messages(
            messages::DEFAULT_MESSAGES
                .iter()
                .map(|(rule, message)| (rule.to_string(), message.to_string())),
        );
        registry
    }

    pub fn register<R: Rule + 'static>(&mut self, rule: R) {
        let map = Arc::make_mut(&mut self.rules);
        map.insert(rule.name().to_string(), Arc::new(rule));
    }

    /// Register a closure under `name`, optionally with its default message.
    pub fn register_fn<F>(&mut self, name: &str, f: F, message: Option<&str>)
    where
        F: Fn(&mut Context<'_>, &[Arg]) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.register(RuleFn::new(name, f));
        if let Some(message) = message {
            self.set_message(name, message);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.rules.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn set_message(&mut self, rule: &str, template: &str) {
        Arc::make_mut(&mut self.messages).insert(rule.to_string(), template.to_string());
    }

    pub fn set_messages<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Arc::make_mut(&mut self.messages).extend(messages);
    }

    /// Default message template for a rule. Names are case-sensitive, as in
    /// [`Registry::execute`].
    pub fn message(&self, rule: &str) -> Option<&str> {
        self.messages.get(rule).map(String::as_str)
    }

    pub fn messages(&self) -> &HashMap<String, String> {
        &self.messages
    }

    /// Resolve and run one rule. Unknown names and arity mismatches are
    /// configuration errors.
    pub fn execute(&self, name: &str, ctx: &mut Context<'_>, args: &[Arg]) -> Result<Outcome> {
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| RuleError::UnknownRule(name.to_string()))?;
        let arity = rule.arity();
        if !arity.contains(&args.len()) {
            return Err(RuleError::Arity {
                rule: name.to_string(),
                expected: describe_arity(&arity),
                given: args.len(),
            });
        }
        rule.check(ctx, args)
    }
}

fn describe_arity(arity: &RangeInclusive<usize>) -> String {
    match (*arity.start(), *arity.end()) {
        (start, usize::MAX) => format!("at least {start}"),
        (start, end) if start == end => start.to_string(),
        (start, end) => format!("{start} to {end}"),
    }
}
