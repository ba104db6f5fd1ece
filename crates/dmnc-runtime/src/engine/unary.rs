//! Input entry matching

use super::expression::evaluate;
use super::operators::execute_compare;
use super::Variables;
use crate::error::{EvaluationError, Result};
use dmnc_core::ast::{UnaryTest, UnaryTests};
use dmnc_core::{FeelValue, Interval};

/// Whether `input` satisfies an input entry cell
pub(crate) fn matches(tests: &UnaryTests, input: &FeelValue, variables: &Variables) -> Result<bool> {
    match tests {
        UnaryTests::Any => Ok(true),
        UnaryTests::OneOf(tests) => any_match(tests, input, variables),
        UnaryTests::NoneOf(tests) => any_match(tests, input, variables).map(|hit| !hit),
    }
}

fn any_match(tests: &[UnaryTest], input: &FeelValue, variables: &Variables) -> Result<bool> {
    for test in tests {
        if test_matches(test, input, variables)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn test_matches(test: &UnaryTest, input: &FeelValue, variables: &Variables) -> Result<bool> {
    match test {
        UnaryTest::Compare(op, endpoint) => {
            let endpoint = evaluate(endpoint, variables)?;
            execute_compare(input, *op, &endpoint)
        }
        UnaryTest::Range {
            start_closed,
            start,
            end,
            end_closed,
        } => {
            let interval = Interval::new(
                *start_closed,
                evaluate(start, variables)?,
                evaluate(end, variables)?,
                *end_closed,
            );
            in_interval(&interval, input)
        }
        UnaryTest::Equal(expected) => match evaluate(expected, variables)? {
            // a list cell matches any of its members
            FeelValue::List(items) if !matches!(input, FeelValue::List(_)) => {
                Ok(items.iter().any(|item| input.feel_eq(item) == Some(true)))
            }
            FeelValue::Interval(interval) => in_interval(&interval, input),
            expected => Ok(input.feel_eq(&expected) == Some(true)),
        },
    }
}

fn in_interval(interval: &Interval, input: &FeelValue) -> Result<bool> {
    if input.is_null() || interval.start.is_null() || interval.end.is_null() {
        return Ok(false);
    }
    interval.contains(input).ok_or_else(|| {
        EvaluationError::TypeError(format!(
            "Cannot test {} against range {}",
            input.kind(),
            interval.to_feel_literal()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmnc_core::ast::{Comparison, Expr};

    fn range(start: f64, end: f64, end_closed: bool) -> UnaryTest {
        UnaryTest::Range {
            start_closed: true,
            start: Expr::literal(start),
            end: Expr::literal(end),
            end_closed,
        }
    }

    #[test]
    fn test_any_matches_null() {
        assert!(matches(&UnaryTests::Any, &FeelValue::Null, &Variables::new()).unwrap());
    }

    #[test]
    fn test_range_bounds() {
        let tests = UnaryTests::OneOf(vec![range(18.0, 65.0, false)]);
        let vars = Variables::new();
        assert!(matches(&tests, &FeelValue::Number(18.0), &vars).unwrap());
        assert!(!matches(&tests, &FeelValue::Number(65.0), &vars).unwrap());
        assert!(!matches(&tests, &FeelValue::Null, &vars).unwrap());
    }

    #[test]
    fn test_negated_list() {
        let tests = UnaryTests::NoneOf(vec![
            UnaryTest::Equal(Expr::literal("red")),
            UnaryTest::Equal(Expr::literal("blue")),
        ]);
        let vars = Variables::new();
        assert!(matches(&tests, &FeelValue::from("green"), &vars).unwrap());
        assert!(!matches(&tests, &FeelValue::from("red"), &vars).unwrap());
    }

    #[test]
    fn test_null_never_satisfies_comparison() {
        let tests = UnaryTests::OneOf(vec![UnaryTest::Compare(Comparison::Lt, Expr::literal(18.0))]);
        assert!(!matches(&tests, &FeelValue::Null, &Variables::new()).unwrap());
    }

    #[test]
    fn test_incompatible_range_is_an_error() {
        let tests = UnaryTests::OneOf(vec![range(1.0, 5.0, true)]);
        assert!(matches(&tests, &FeelValue::from("three"), &Variables::new()).is_err());
    }

    #[test]
    fn test_equal_against_variable() {
        let tests = UnaryTests::OneOf(vec![UnaryTest::Equal(Expr::name("limit"))]);
        let vars: Variables = [("limit".to_string(), FeelValue::Number(3.0))].into_iter().collect();
        assert!(matches(&tests, &FeelValue::Number(3.0), &vars).unwrap());
    }
}
