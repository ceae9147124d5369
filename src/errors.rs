use thiserror::Error; // Import the `Error` derive macro from the `thiserror` crate

// Configuration errors raised out of `validate`. Per-record violations never land here.
#[derive(Debug, Error)]
pub enum RuleError {
    // A rule chain names a rule that is not registered
    #[error("rule not exists: {0}")]
    UnknownRule(String),

    // A rule was given a number of arguments outside its declared arity
    #[error("rule `{rule}` expects {expected} argument(s), got {given}")]
    Arity {
        rule: String,
        expected: String,
        given: usize,
    },

    // An argument has a shape the rule cannot use (e.g. a non-numeric bound)
    #[error("invalid argument for rule `{rule}`: {message}")]
    InvalidArgument { rule: String, message: String },

    // A `match`/`not_match` pattern did not compile
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    // One side of a date comparison could not be read as a date
    #[error("both dates should be valid dates: {0}")]
    InvalidDate(String),

    // A field-rules document that is not shaped like `{path: chain}`
    #[error("invalid rule declaration: {0}")]
    Declaration(String),
}

impl RuleError {
    pub(crate) fn argument(rule: &str, message: impl Into<String>) -> Self {
        RuleError::InvalidArgument {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

// Type alias for results that use `RuleError` as the error type
pub type Result<T> = std::result::Result<T, RuleError>;
