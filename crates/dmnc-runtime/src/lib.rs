//! DMN Decision Central Runtime
//!
//! Evaluates decision tables against a set of named FEEL values:
//! - expression and unary-test evaluation
//! - hit policies (UNIQUE, ANY, FIRST, RULE ORDER, COLLECT and its aggregations)
//! - decision-sequence chaining across the tables of a service

pub mod engine;
pub mod error;

pub use engine::{Decision, DecisionEvaluator, DmnEngine, ExecutedRule, TableOutcome, Variables};
pub use error::{EvaluationError, Result};
