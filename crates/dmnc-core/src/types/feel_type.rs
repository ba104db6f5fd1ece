//! FEEL type tags carried by glossary entries

use serde::{Serialize, Serializer};
use std::fmt;

/// Declared FEEL type of a glossary variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FeelType {
    String,
    Number,
    Boolean,
    Date,
    Time,
    DateTime,
    DayTimeDuration,
    YearMonthDuration,
    Range,
    List,
    Context,
    /// No declared type
    #[default]
    Any,
    /// A type reference this crate does not know, kept verbatim
    Other(String),
}

impl FeelType {
    /// Parse a DMN `typeRef`.
    ///
    /// Accepts FEEL names (`date and time`), XML Schema style names
    /// (`dateTime`, `yearMonthDuration`) and an optional `feel:` prefix.
    pub fn parse(type_ref: &str) -> Self {
        let trimmed = type_ref.trim();
        let bare = trimmed.strip_prefix("feel:").unwrap_or(trimmed);
        match bare.to_ascii_lowercase().as_str() {
            "" | "any" => FeelType::Any,
            "string" | "text" => FeelType::String,
            "number" | "integer" | "int" | "long" | "double" | "decimal" => FeelType::Number,
            "boolean" | "bool" => FeelType::Boolean,
            "date" => FeelType::Date,
            "time" => FeelType::Time,
            "date and time" | "datetime" => FeelType::DateTime,
            "days and time duration" | "daytimeduration" | "duration" => {
                FeelType::DayTimeDuration
            }
            "years and months duration" | "yearmonthduration" => FeelType::YearMonthDuration,
            "range" | "interval" => FeelType::Range,
            "list" => FeelType::List,
            "context" => FeelType::Context,
            _ => FeelType::Other(bare.to_string()),
        }
    }

    /// Canonical FEEL name
    pub fn as_str(&self) -> &str {
        match self {
            FeelType::String => "string",
            FeelType::Number => "number",
            FeelType::Boolean => "boolean",
            FeelType::Date => "date",
            FeelType::Time => "time",
            FeelType::DateTime => "date and time",
            FeelType::DayTimeDuration => "days and time duration",
            FeelType::YearMonthDuration => "years and months duration",
            FeelType::Range => "range",
            FeelType::List => "list",
            FeelType::Context => "context",
            FeelType::Any => "Any",
            FeelType::Other(name) => name,
        }
    }
}

impl fmt::Display for FeelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FeelType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
