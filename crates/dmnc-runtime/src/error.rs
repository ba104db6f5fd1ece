//! Evaluation error types

use thiserror::Error;

/// Evaluation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// A single-hit table matched no rule
    #[error("Decision table '{table}': no rule matched")]
    NoMatch { table: String },

    /// A UNIQUE table matched more than one rule
    #[error("Decision table '{table}': rules {rules:?} all matched under hit policy UNIQUE")]
    MultipleMatches { table: String, rules: Vec<String> },

    /// An ANY table matched rules with different outputs
    #[error("Decision table '{table}': rules {rules:?} matched with conflicting outputs under hit policy ANY")]
    ConflictingOutputs { table: String, rules: Vec<String> },

    /// Operand kinds do not fit the operation
    #[error("Type error: {0}")]
    TypeError(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Requested table is not part of the service
    #[error("Unknown decision table: {0}")]
    UnknownTable(String),

    /// An error raised while evaluating one rule
    #[error("Decision table '{table}' rule {rule}: {source}")]
    InRule {
        table: String,
        rule: String,
        #[source]
        source: Box<EvaluationError>,
    },
}

/// Result type for evaluation
pub type Result<T> = std::result::Result<T, EvaluationError>;
