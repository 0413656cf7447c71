//! Error types for the scripting crate
//!
//! Only structural problems surface as errors; evaluation-time anomalies
//! degrade to empty/false results so a broken trigger can never take the
//! simulation down.

use wyldmud_core::MudError;

/// Script-specific error types
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Parse error in a script body
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// `$if` condition that does not split into subject, operator, predicate
    #[error("Malformed condition: {0}")]
    MalformedCondition(String),

    /// Operator token outside the supported set
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// `contains` pattern group with no closing parenthesis
    #[error("Unterminated pattern group: {0}")]
    UnterminatedGroup(String),
}

impl From<ScriptError> for MudError {
    fn from(err: ScriptError) -> Self {
        MudError::Script(err.to_string())
    }
}

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, ScriptError>;
