//! Type definitions for FEEL values and glossary type tags

pub mod feel_type;
pub mod value;

pub use feel_type::FeelType;
pub use value::{FeelDateTime, FeelTime, FeelValue, Interval};
