pub mod comparison;
pub mod context;
pub mod dates;
pub mod engine;
pub mod errors;
pub mod expression;
pub mod path;
pub mod rules;
pub mod violations;
mod parser;

use serde_json::Value;
use std::collections::HashMap;

pub use context::{Context, Scope};
pub use engine::{ValidateOptions, Validation};
pub use errors::{Result, RuleError};
pub use expression::{cast, parse, Arg, FieldRules, RuleChain};
pub use rules::{Outcome, Registry, Rule, RuleFn};
pub use violations::Violations;

/// Configured validation engine: the built-in catalog plus whatever custom
/// rules and messages were registered during setup.
///
/// Setup takes `&mut self`; `validate` takes `&self`, so a finished validator
/// can be shared across threads.
#[derive(Clone)]
pub struct Validator {
    registry: Registry,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            registry: Registry::with_builtins(),
        }
    }

    /// Start from a prepared registry instead of the built-in catalog.
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    /// Register (or replace) a rule, optionally with its default message.
    pub fn register_rule<F>(&mut self, name: &str, f: F, message: Option<&str>) -> &mut Self
    where
        F: Fn(&mut Context<'_>, &[Arg]) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.registry.register_fn(name, f, message);
        self
    }

    pub fn set_message(&mut self, rule: &str, template: &str) -> &mut Self {
        self.registry.set_message(rule, template);
        self
    }

    pub fn set_messages<I, K, V>(&mut self, messages: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.registry
            .set_messages(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn messages(&self) -> &HashMap<String, String> {
        self.registry.messages()
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate and coerce `data` against `rules`.
    ///
    /// Violations are reported in the returned [`Validation`]; only configuration
    /// problems (unknown rule, bad arity, unreadable date comparison) are errors.
    pub fn validate(
        &self,
        rules: &FieldRules,
        data: &Value,
        options: &ValidateOptions,
    ) -> Result<Validation> {
        engine::Engine::new(&self.registry).run(rules, data, options)
    }
}

/// Convenience: validate with a default [`Validator`].
pub fn validate(rules: &FieldRules, data: &Value, options: &ValidateOptions) -> Result<Validation> {
    Validator::new().validate(rules, data, options)
}
