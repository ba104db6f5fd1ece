//! DMN Decision Central Core - Core types and definitions
//!
//! This crate provides the fundamental types shared by every other crate:
//! - FEEL value types for request/response payloads
//! - AST definitions for FEEL expressions and unary tests
//! - The decision service model (glossary, decision tables, service definition)
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{
    Cell, CollectOperator, DecisionTable, Glossary, GlossaryEntry, HitPolicy, Rule,
    ServiceDefinition, SourceFormat, SourceInfo, TableInput, TableOutput,
};
pub use error::CoreError;
pub use types::{FeelDateTime, FeelTime, FeelType, FeelValue, Interval};
