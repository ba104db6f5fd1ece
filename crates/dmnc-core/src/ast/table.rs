//! Decision table definitions

use super::expression::Expr;
use super::unary::UnaryTests;
use crate::error::{CoreError, Result};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// A parsed cell that remembers its source text
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<T> {
    pub text: String,
    pub parsed: T,
}

impl<T> Cell<T> {
    pub fn new(text: impl Into<String>, parsed: T) -> Self {
        Self {
            text: text.into(),
            parsed,
        }
    }
}

/// Aggregation applied by a COLLECT hit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOperator {
    Sum,
    Count,
    Min,
    Max,
}

/// Hit policy of a decision table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HitPolicy {
    #[default]
    Unique,
    Any,
    First,
    RuleOrder,
    Collect(Option<CollectOperator>),
}

impl HitPolicy {
    /// Parse a hit policy from its DMN spelling.
    ///
    /// Accepts single-letter codes (`U`, `C+`), full names (`RULE ORDER`,
    /// `RULE_ORDER`) and a separate aggregation (`COLLECT` + `SUM`).
    pub fn parse(hit_policy: &str, aggregation: Option<&str>) -> Result<Self> {
        let normalized = hit_policy.trim().to_ascii_uppercase().replace('_', " ");
        let policy = match normalized.as_str() {
            "" | "U" | "UNIQUE" => HitPolicy::Unique,
            "A" | "ANY" => HitPolicy::Any,
            "F" | "FIRST" => HitPolicy::First,
            "R" | "RULE ORDER" => HitPolicy::RuleOrder,
            "C" | "COLLECT" => HitPolicy::Collect(None),
            "C+" => HitPolicy::Collect(Some(CollectOperator::Sum)),
            "C#" => HitPolicy::Collect(Some(CollectOperator::Count)),
            "C<" => HitPolicy::Collect(Some(CollectOperator::Min)),
            "C>" => HitPolicy::Collect(Some(CollectOperator::Max)),
            _ => return Err(CoreError::UnsupportedHitPolicy(hit_policy.trim().to_string())),
        };

        match (policy, aggregation.map(|a| a.trim().to_ascii_uppercase())) {
            (HitPolicy::Collect(None), Some(aggregation)) => {
                let operator = match aggregation.as_str() {
                    "SUM" => CollectOperator::Sum,
                    "COUNT" => CollectOperator::Count,
                    "MIN" => CollectOperator::Min,
                    "MAX" => CollectOperator::Max,
                    other => {
                        return Err(CoreError::UnsupportedHitPolicy(format!("COLLECT {}", other)))
                    }
                };
                Ok(HitPolicy::Collect(Some(operator)))
            }
            (policy, _) => Ok(policy),
        }
    }

    /// Single-letter code, e.g. `U` or `C+`
    pub fn code(&self) -> &'static str {
        match self {
            HitPolicy::Unique => "U",
            HitPolicy::Any => "A",
            HitPolicy::First => "F",
            HitPolicy::RuleOrder => "R",
            HitPolicy::Collect(None) => "C",
            HitPolicy::Collect(Some(CollectOperator::Sum)) => "C+",
            HitPolicy::Collect(Some(CollectOperator::Count)) => "C#",
            HitPolicy::Collect(Some(CollectOperator::Min)) => "C<",
            HitPolicy::Collect(Some(CollectOperator::Max)) => "C>",
        }
    }

    /// Whether at most one rule contributes to the result
    pub fn is_single_hit(&self) -> bool {
        matches!(self, HitPolicy::Unique | HitPolicy::Any | HitPolicy::First)
    }
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for HitPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Input column: a glossary variable name and the expression reading it
#[derive(Debug, Clone, PartialEq)]
pub struct TableInput {
    pub name: String,
    pub expression: Cell<Expr>,
}

impl TableInput {
    /// Input that reads the variable `name` directly
    pub fn variable(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            expression: Cell::new(name.clone(), Expr::Name(name.clone())),
            name,
        }
    }
}

/// Output column
#[derive(Debug, Clone, PartialEq)]
pub struct TableOutput {
    pub name: String,
}

/// One row of a decision table
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub inputs: Vec<Cell<UnaryTests>>,
    pub outputs: Vec<Cell<Expr>>,
    pub annotation: Option<String>,
}

/// Decision table
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTable {
    pub name: String,
    pub hit_policy: HitPolicy,
    pub inputs: Vec<TableInput>,
    pub outputs: Vec<TableOutput>,
    pub rules: Vec<Rule>,
}

impl DecisionTable {
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.name.as_str())
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|o| o.name.as_str())
    }

    /// Check the table's shape: at least one output, unique output names,
    /// unique rule ids, and one cell per column in every rule
    pub fn validate(&self) -> Result<()> {
        if self.outputs.is_empty() {
            return Err(CoreError::InvalidValue(format!(
                "Decision table '{}' declares no outputs",
                self.name
            )));
        }

        let mut outputs = HashSet::new();
        for output in &self.outputs {
            if !outputs.insert(output.name.as_str()) {
                return Err(CoreError::InvalidValue(format!(
                    "Decision table '{}' declares output '{}' twice",
                    self.name, output.name
                )));
            }
        }

        let mut ids = HashSet::new();
        for rule in &self.rules {
            if !ids.insert(rule.id.as_str()) {
                return Err(self.malformed(rule, "duplicate rule id"));
            }
            if rule.inputs.len() != self.inputs.len() {
                return Err(self.malformed(
                    rule,
                    &format!(
                        "expected {} input entries, found {}",
                        self.inputs.len(),
                        rule.inputs.len()
                    ),
                ));
            }
            if rule.outputs.len() != self.outputs.len() {
                return Err(self.malformed(
                    rule,
                    &format!(
                        "expected {} output entries, found {}",
                        self.outputs.len(),
                        rule.outputs.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn malformed(&self, rule: &Rule, message: &str) -> CoreError {
        CoreError::MalformedRule {
            table: self.name.clone(),
            rule: rule.id.clone(),
            message: message.to_string(),
        }
    }
}
