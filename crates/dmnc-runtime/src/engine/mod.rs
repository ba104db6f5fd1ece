//! Decision table engine
//!
//! `DecisionEvaluator` is the seam the server evaluates through; `DmnEngine`
//! is the shipped implementation.

mod expression;
mod hit_policy;
mod operators;
mod unary;

use crate::error::{EvaluationError, Result};
use dmnc_core::{DecisionTable, FeelValue, ServiceDefinition};
use serde::Serialize;
use std::collections::BTreeMap;

/// Named values an evaluation reads and produces
pub type Variables = BTreeMap<String, FeelValue>;

/// Rule that contributed to a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutedRule {
    pub table: String,
    pub rule: String,
}

/// Result of evaluating one decision table
#[derive(Debug, Clone, PartialEq)]
pub struct TableOutcome {
    /// Output name to value, after the hit policy has been applied
    pub outputs: Variables,
    /// Ids of the rules that contributed, in rule order
    pub matched: Vec<String>,
}

/// Result of a service- or table-level evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decision {
    /// Merged outputs of every evaluated table
    pub outputs: Variables,
    pub executed: Vec<ExecutedRule>,
}

impl Decision {
    fn absorb(&mut self, table: &DecisionTable, outcome: TableOutcome) {
        self.executed.extend(outcome.matched.into_iter().map(|rule| ExecutedRule {
            table: table.name.clone(),
            rule,
        }));
        self.outputs.extend(outcome.outputs);
    }
}

/// Evaluates decision tables
pub trait DecisionEvaluator: Send + Sync {
    /// Evaluate a single table against `inputs`
    fn evaluate_table(&self, table: &DecisionTable, inputs: &Variables) -> Result<TableOutcome>;

    /// Evaluate one table of a service, or the whole decision sequence.
    ///
    /// Along the sequence, each table sees the request inputs merged with the
    /// outputs of every earlier table; an output replaces a same-named input.
    fn evaluate(
        &self,
        service: &ServiceDefinition,
        table: Option<&str>,
        inputs: Variables,
    ) -> Result<Decision> {
        let mut decision = Decision::default();

        if let Some(name) = table {
            let table = service
                .table(name)
                .ok_or_else(|| EvaluationError::UnknownTable(name.to_string()))?;
            let outcome = self.evaluate_table(table, &inputs)?;
            decision.absorb(table, outcome);
            return Ok(decision);
        }

        let mut context = inputs;
        for table in service.sequence_tables() {
            let outcome = self.evaluate_table(table, &context)?;
            context.extend(
                outcome
                    .outputs
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone())),
            );
            decision.absorb(table, outcome);
        }
        Ok(decision)
    }
}

/// Shipped decision table evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct DmnEngine;

impl DmnEngine {
    pub fn new() -> Self {
        Self
    }
}

impl DecisionEvaluator for DmnEngine {
    fn evaluate_table(&self, table: &DecisionTable, inputs: &Variables) -> Result<TableOutcome> {
        let input_values = table
            .inputs
            .iter()
            .map(|input| expression::evaluate(&input.expression.parsed, inputs))
            .collect::<Result<Vec<_>>>()?;

        let mut hits = Vec::new();
        for rule in &table.rules {
            let in_rule = |source: EvaluationError| EvaluationError::InRule {
                table: table.name.clone(),
                rule: rule.id.clone(),
                source: Box::new(source),
            };

            let mut matched = true;
            for (cell, value) in rule.inputs.iter().zip(&input_values) {
                if !unary::matches(&cell.parsed, value, inputs).map_err(in_rule)? {
                    matched = false;
                    break;
                }
            }
            if !matched {
                continue;
            }

            tracing::debug!(table = %table.name, rule = %rule.id, "Rule matched");
            let row = rule
                .outputs
                .iter()
                .map(|cell| expression::evaluate(&cell.parsed, inputs))
                .collect::<Result<Vec<_>>>()
                .map_err(in_rule)?;
            hits.push(hit_policy::Hit { rule, row });

            if table.hit_policy == dmnc_core::HitPolicy::First {
                break;
            }
        }

        hit_policy::apply(table, hits)
    }
}

#[cfg(test)]
mod tests;
