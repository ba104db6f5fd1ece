//! DMN Decision Central Parser
//!
//! This crate turns uploaded rule files into `ServiceDefinition`s:
//! - a FEEL parser for literals, expressions and unary tests
//! - loaders for DMN XML and YAML service files behind the `ServiceLoader` trait

pub mod error;
pub mod feel;
pub mod loader;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use feel::FeelParser;
pub use loader::{DmnLoader, ServiceLoader};
