//! Operator execution modules

mod arithmetic;
mod comparison;

pub(crate) use arithmetic::{execute_arithmetic, execute_negate};
pub(crate) use comparison::execute_compare;
