//! Hit policy resolution

use super::{TableOutcome, Variables};
use crate::error::{EvaluationError, Result};
use dmnc_core::{CollectOperator, DecisionTable, FeelValue, HitPolicy, Rule};
use std::cmp::Ordering;

/// A matched rule and its evaluated output entries
pub(crate) struct Hit<'a> {
    pub rule: &'a Rule,
    pub row: Vec<FeelValue>,
}

/// Reduce the matched rules of a table to its outputs
pub(crate) fn apply(table: &DecisionTable, hits: Vec<Hit<'_>>) -> Result<TableOutcome> {
    let matched: Vec<String> = hits.iter().map(|hit| hit.rule.id.clone()).collect();

    let outputs = match table.hit_policy {
        HitPolicy::Unique | HitPolicy::Any | HitPolicy::First if hits.is_empty() => {
            return Err(EvaluationError::NoMatch {
                table: table.name.clone(),
            });
        }
        HitPolicy::Unique if hits.len() > 1 => {
            return Err(EvaluationError::MultipleMatches {
                table: table.name.clone(),
                rules: matched,
            });
        }
        HitPolicy::Any if hits.iter().any(|hit| hit.row != hits[0].row) => {
            return Err(EvaluationError::ConflictingOutputs {
                table: table.name.clone(),
                rules: matched,
            });
        }
        HitPolicy::Unique | HitPolicy::Any | HitPolicy::First => single(table, &hits[0].row),
        HitPolicy::RuleOrder | HitPolicy::Collect(None) => collect(table, &hits),
        HitPolicy::Collect(Some(operator)) => aggregate(table, &hits, operator)?,
    };

    Ok(TableOutcome { outputs, matched })
}

fn single(table: &DecisionTable, row: &[FeelValue]) -> Variables {
    table
        .output_names()
        .map(str::to_string)
        .zip(row.iter().cloned())
        .collect()
}

/// One list per output, in rule order
fn collect(table: &DecisionTable, hits: &[Hit<'_>]) -> Variables {
    table
        .output_names()
        .enumerate()
        .map(|(column, name)| {
            let values = hits.iter().map(|hit| hit.row[column].clone()).collect();
            (name.to_string(), FeelValue::List(values))
        })
        .collect()
}

fn aggregate(
    table: &DecisionTable,
    hits: &[Hit<'_>],
    operator: CollectOperator,
) -> Result<Variables> {
    table
        .output_names()
        .enumerate()
        .map(|(column, name)| {
            let values: Vec<&FeelValue> = hits
                .iter()
                .map(|hit| &hit.row[column])
                .filter(|value| !value.is_null())
                .collect();
            let result = match operator {
                CollectOperator::Count => FeelValue::Number(values.len() as f64),
                CollectOperator::Sum => sum(table, name, &values)?,
                CollectOperator::Min => extreme(table, name, &values, Ordering::Less)?,
                CollectOperator::Max => extreme(table, name, &values, Ordering::Greater)?,
            };
            Ok((name.to_string(), result))
        })
        .collect()
}

fn sum(table: &DecisionTable, output: &str, values: &[&FeelValue]) -> Result<FeelValue> {
    if values.is_empty() {
        return Ok(FeelValue::Null);
    }
    let mut total = 0.0;
    for value in values {
        match value {
            FeelValue::Number(n) => total += n,
            other => {
                return Err(EvaluationError::TypeError(format!(
                    "Decision table '{}': cannot sum {} values of output '{}'",
                    table.name,
                    other.kind(),
                    output
                )))
            }
        }
    }
    Ok(FeelValue::Number(total))
}

/// Smallest (`Less`) or largest (`Greater`) value
fn extreme(
    table: &DecisionTable,
    output: &str,
    values: &[&FeelValue],
    keep: Ordering,
) -> Result<FeelValue> {
    let mut best: Option<&FeelValue> = None;
    for &value in values {
        best = match best {
            None => Some(value),
            Some(current) => match value.compare(current) {
                Some(ordering) if ordering == keep => Some(value),
                Some(_) => Some(current),
                None => {
                    return Err(EvaluationError::TypeError(format!(
                        "Decision table '{}': cannot order {} and {} values of output '{}'",
                        table.name,
                        value.kind(),
                        current.kind(),
                        output
                    )))
                }
            },
        };
    }
    Ok(best.cloned().unwrap_or(FeelValue::Null))
}
