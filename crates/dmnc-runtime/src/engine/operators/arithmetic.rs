//! Arithmetic operator execution

use crate::error::{EvaluationError, Result};
use chrono::{Months, NaiveDate, NaiveDateTime, TimeDelta};
use dmnc_core::ast::ArithmeticOp;
use dmnc_core::{FeelDateTime, FeelValue};

/// Execute an arithmetic operation
pub(crate) fn execute_arithmetic(
    left: &FeelValue,
    op: ArithmeticOp,
    right: &FeelValue,
) -> Result<FeelValue> {
    // Null in any operation yields null so missing inputs propagate
    if left.is_null() || right.is_null() {
        tracing::debug!(
            "Null in arithmetic: {:?} {} {:?}, returning null",
            left,
            op,
            right
        );
        return Ok(FeelValue::Null);
    }

    use ArithmeticOp::*;
    use FeelValue as V;

    let result = match (left, op, right) {
        (V::Number(l), Add, V::Number(r)) => Some(V::Number(l + r)),
        (V::Number(l), Sub, V::Number(r)) => Some(V::Number(l - r)),
        (V::Number(l), Mul, V::Number(r)) => Some(V::Number(l * r)),
        (V::Number(l), Div, V::Number(r)) => {
            if *r == 0.0 {
                return Err(EvaluationError::DivisionByZero);
            }
            Some(V::Number(l / r))
        }

        (V::String(l), Add, V::String(r)) => Some(V::String(format!("{}{}", l, r))),

        (V::DayTimeDuration(l), Add, V::DayTimeDuration(r)) => l.checked_add(r).map(V::DayTimeDuration),
        (V::DayTimeDuration(l), Sub, V::DayTimeDuration(r)) => l.checked_sub(r).map(V::DayTimeDuration),
        (V::YearMonthDuration(l), Add, V::YearMonthDuration(r)) => l.checked_add(*r).map(V::YearMonthDuration),
        (V::YearMonthDuration(l), Sub, V::YearMonthDuration(r)) => l.checked_sub(*r).map(V::YearMonthDuration),
        (V::DayTimeDuration(d), Mul, V::Number(n)) | (V::Number(n), Mul, V::DayTimeDuration(d)) => {
            scale(d, *n).map(V::DayTimeDuration)
        }
        (V::YearMonthDuration(m), Mul, V::Number(n)) | (V::Number(n), Mul, V::YearMonthDuration(m)) => {
            Some(V::YearMonthDuration((*m as f64 * n).round() as i64))
        }

        (V::Date(d), Add, V::DayTimeDuration(delta)) | (V::DayTimeDuration(delta), Add, V::Date(d)) => {
            d.checked_add_signed(*delta).map(V::Date)
        }
        (V::Date(d), Sub, V::DayTimeDuration(delta)) => d.checked_sub_signed(*delta).map(V::Date),
        (V::Date(d), Add, V::YearMonthDuration(m)) | (V::YearMonthDuration(m), Add, V::Date(d)) => {
            shift_date(*d, *m).map(V::Date)
        }
        (V::Date(d), Sub, V::YearMonthDuration(m)) => {
            m.checked_neg().and_then(|m| shift_date(*d, m)).map(V::Date)
        }
        (V::Date(l), Sub, V::Date(r)) => Some(V::DayTimeDuration(l.signed_duration_since(*r))),

        (V::DateTime(dt), Add, V::DayTimeDuration(delta)) | (V::DayTimeDuration(delta), Add, V::DateTime(dt)) => {
            dt.local
                .checked_add_signed(*delta)
                .map(|local| V::DateTime(FeelDateTime::new(local, dt.offset)))
        }
        (V::DateTime(dt), Sub, V::DayTimeDuration(delta)) => dt
            .local
            .checked_sub_signed(*delta)
            .map(|local| V::DateTime(FeelDateTime::new(local, dt.offset))),
        (V::DateTime(dt), Add, V::YearMonthDuration(m)) | (V::YearMonthDuration(m), Add, V::DateTime(dt)) => {
            shift_date_time(dt.local, *m).map(|local| V::DateTime(FeelDateTime::new(local, dt.offset)))
        }
        (V::DateTime(l), Sub, V::DateTime(r)) if l.offset == r.offset => {
            Some(V::DayTimeDuration(l.local.signed_duration_since(r.local)))
        }

        _ => {
            return Err(EvaluationError::TypeError(format!(
                "Cannot apply {} to {} and {}",
                op,
                left.kind(),
                right.kind()
            )))
        }
    };

    result.ok_or_else(|| {
        EvaluationError::TypeError(format!(
            "{} {} {} is out of range",
            left.to_feel_literal(),
            op,
            right.to_feel_literal()
        ))
    })
}

/// Execute unary minus
pub(crate) fn execute_negate(value: &FeelValue) -> Result<FeelValue> {
    match value {
        FeelValue::Null => Ok(FeelValue::Null),
        FeelValue::Number(n) => Ok(FeelValue::Number(-n)),
        FeelValue::DayTimeDuration(d) => Ok(FeelValue::DayTimeDuration(-*d)),
        FeelValue::YearMonthDuration(m) => m
            .checked_neg()
            .map(FeelValue::YearMonthDuration)
            .ok_or_else(|| {
                EvaluationError::TypeError(format!("-{} is out of range", value.to_feel_literal()))
            }),
        other => Err(EvaluationError::TypeError(format!(
            "Cannot negate {}",
            other.kind()
        ))),
    }
}

fn scale(delta: &TimeDelta, factor: f64) -> Option<TimeDelta> {
    let millis = delta.num_milliseconds() as f64 * factor;
    if !millis.is_finite() {
        return None;
    }
    TimeDelta::try_milliseconds(millis.round() as i64)
}

fn shift_date(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

fn shift_date_time(local: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        local.checked_add_months(magnitude)
    } else {
        local.checked_sub_months(magnitude)
    }
}
