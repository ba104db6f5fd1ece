//! Comparison operator execution

use crate::error::{EvaluationError, Result};
use dmnc_core::ast::Comparison;
use dmnc_core::FeelValue;
use std::cmp::Ordering;

/// Execute a comparison.
///
/// Equality across different kinds is `false`; ordering across different
/// kinds is a type error. Any ordering involving null is `false` so that
/// rules skip over missing inputs.
pub(crate) fn execute_compare(left: &FeelValue, op: Comparison, right: &FeelValue) -> Result<bool> {
    let accept: fn(Ordering) -> bool = match op {
        Comparison::Eq => return Ok(left.feel_eq(right).unwrap_or(false)),
        Comparison::Ne => return Ok(!left.feel_eq(right).unwrap_or(false)),
        Comparison::Lt => |o| o == Ordering::Less,
        Comparison::Le => |o| o != Ordering::Greater,
        Comparison::Gt => |o| o == Ordering::Greater,
        Comparison::Ge => |o| o != Ordering::Less,
    };

    if left.is_null() || right.is_null() {
        tracing::debug!(
            "Null comparison: {:?} {} {:?}, returning false",
            left,
            op,
            right
        );
        return Ok(false);
    }

    left.compare(right).map(accept).ok_or_else(|| {
        EvaluationError::TypeError(format!(
            "Cannot compare {} and {} with {}",
            left.kind(),
            right.kind(),
            op
        ))
    })
}
