//! Abstract Syntax Tree and decision service model
//!
//! Expressions and unary tests are produced by `dmnc-parser` and executed by
//! `dmnc-runtime`. The service model (glossary, tables, service definition)
//! is immutable once constructed.

pub mod expression;
pub mod glossary;
pub mod service;
pub mod table;
pub mod unary;

pub use expression::{ArithmeticOp, Comparison, Expr};
pub use glossary::{Glossary, GlossaryEntry};
pub use service::{ServiceDefinition, SourceFormat, SourceInfo};
pub use table::{Cell, CollectOperator, DecisionTable, HitPolicy, Rule, TableInput, TableOutput};
pub use unary::{UnaryTest, UnaryTests};
