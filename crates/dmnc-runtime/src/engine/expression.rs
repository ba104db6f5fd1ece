//! Expression evaluation

use super::operators::{execute_arithmetic, execute_compare, execute_negate};
use super::Variables;
use crate::error::Result;
use dmnc_core::ast::Expr;
use dmnc_core::{FeelValue, Interval};
use std::collections::BTreeMap;

/// Evaluate an expression against the named variables
pub(crate) fn evaluate(expr: &Expr, variables: &Variables) -> Result<FeelValue> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Name(name) => Ok(lookup(name, variables)),
        Expr::Negate(inner) => execute_negate(&evaluate(inner, variables)?),
        Expr::Arithmetic { op, left, right } => {
            execute_arithmetic(&evaluate(left, variables)?, *op, &evaluate(right, variables)?)
        }
        Expr::Compare { op, left, right } => {
            let left = evaluate(left, variables)?;
            let right = evaluate(right, variables)?;
            execute_compare(&left, *op, &right).map(FeelValue::Bool)
        }
        Expr::And(left, right) => {
            let left = evaluate(left, variables)?;
            let right = evaluate(right, variables)?;
            Ok(match (truth(&left), truth(&right)) {
                (Some(false), _) | (_, Some(false)) => FeelValue::Bool(false),
                (Some(true), Some(true)) => FeelValue::Bool(true),
                _ => FeelValue::Null,
            })
        }
        Expr::Or(left, right) => {
            let left = evaluate(left, variables)?;
            let right = evaluate(right, variables)?;
            Ok(match (truth(&left), truth(&right)) {
                (Some(true), _) | (_, Some(true)) => FeelValue::Bool(true),
                (Some(false), Some(false)) => FeelValue::Bool(false),
                _ => FeelValue::Null,
            })
        }
        Expr::Not(inner) => Ok(match truth(&evaluate(inner, variables)?) {
            Some(b) => FeelValue::Bool(!b),
            None => FeelValue::Null,
        }),
        Expr::List(items) => items
            .iter()
            .map(|item| evaluate(item, variables))
            .collect::<Result<Vec<_>>>()
            .map(FeelValue::List),
        Expr::Context(entries) => entries
            .iter()
            .map(|(key, value)| Ok((key.clone(), evaluate(value, variables)?)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(FeelValue::Context),
        Expr::Interval {
            start_closed,
            start,
            end,
            end_closed,
        } => Ok(FeelValue::Interval(Box::new(Interval::new(
            *start_closed,
            evaluate(start, variables)?,
            evaluate(end, variables)?,
            *end_closed,
        )))),
    }
}

/// Resolve a name; `a.b` reads entry `b` of context `a` when no variable is
/// literally called `a.b`. Missing names are null.
fn lookup(name: &str, variables: &Variables) -> FeelValue {
    if let Some(value) = variables.get(name) {
        return value.clone();
    }

    let mut parts = name.split('.');
    let Some(head) = parts.next().and_then(|first| variables.get(first)) else {
        tracing::debug!(name, "Unknown name evaluates to null");
        return FeelValue::Null;
    };
    let mut current = head;
    for part in parts {
        match current {
            FeelValue::Context(entries) => match entries.get(part) {
                Some(next) => current = next,
                None => return FeelValue::Null,
            },
            _ => {
                return FeelValue::Null;
            }
        }
    }
    current.clone()
}

fn truth(value: &FeelValue) -> Option<bool> {
    match value {
        FeelValue::Bool(b) => Some(*b),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmnc_core::ast::{ArithmeticOp, Comparison};

    fn vars(pairs: &[(&str, FeelValue)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_arithmetic_over_names() {
        let expr = Expr::Arithmetic {
            op: ArithmeticOp::Mul,
            left: Box::new(Expr::name("income")),
            right: Box::new(Expr::literal(0.1)),
        };
        let result = evaluate(&expr, &vars(&[("income", FeelValue::Number(2000.0))])).unwrap();
        assert_eq!(result, FeelValue::Number(200.0));
    }

    #[test]
    fn test_missing_name_is_null() {
        assert_eq!(evaluate(&Expr::name("nope"), &Variables::new()).unwrap(), FeelValue::Null);
    }

    #[test]
    fn test_dotted_lookup() {
        let applicant = FeelValue::Context(
            [("age".to_string(), FeelValue::Number(30.0))].into_iter().collect(),
        );
        let variables = vars(&[("Applicant", applicant)]);
        assert_eq!(
            evaluate(&Expr::name("Applicant.age"), &variables).unwrap(),
            FeelValue::Number(30.0)
        );
        assert_eq!(
            evaluate(&Expr::name("Applicant.income"), &variables).unwrap(),
            FeelValue::Null
        );
    }

    #[test]
    fn test_three_valued_logic() {
        let and = Expr::And(Box::new(Expr::literal(true)), Box::new(Expr::name("missing")));
        assert_eq!(evaluate(&and, &Variables::new()).unwrap(), FeelValue::Null);

        let or = Expr::Or(Box::new(Expr::literal(true)), Box::new(Expr::name("missing")));
        assert_eq!(evaluate(&or, &Variables::new()).unwrap(), FeelValue::Bool(true));
    }

    #[test]
    fn test_comparison_expression() {
        let expr = Expr::Compare {
            op: Comparison::Ge,
            left: Box::new(Expr::name("age")),
            right: Box::new(Expr::literal(18.0)),
        };
        assert_eq!(
            evaluate(&expr, &vars(&[("age", FeelValue::Number(18.0))])).unwrap(),
            FeelValue::Bool(true)
        );
        assert_eq!(evaluate(&expr, &Variables::new()).unwrap(), FeelValue::Bool(false));
    }
}
