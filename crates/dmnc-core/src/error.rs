//! Error types for DMN Decision Central Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unsupported hit policy: {0}")]
    UnsupportedHitPolicy(String),

    #[error("Duplicate decision table: {0}")]
    DuplicateTable(String),

    #[error("Decision sequence references unknown table: {0}")]
    UnknownTable(String),

    #[error("Decision table '{table}' rule {rule}: {message}")]
    MalformedRule {
        table: String,
        rule: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
