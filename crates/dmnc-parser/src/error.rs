//! Parser error types

use dmnc_core::CoreError;
use thiserror::Error;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Invalid FEEL syntax
    #[error("Invalid expression syntax: {0}")]
    InvalidExpression(String),

    /// A cell of a decision table failed to parse
    #[error("Decision table '{table}' rule {rule}: cannot parse '{text}': {message}")]
    InvalidCell {
        table: String,
        rule: String,
        text: String,
        message: String,
    },

    /// Recognised but unreadable source format
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// The parsed content does not form a valid service
    #[error("Invalid decision service: {0}")]
    InvalidService(#[from] CoreError),
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::XmlError(err.to_string())
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
