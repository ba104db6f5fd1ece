//! FEEL expression definitions

use crate::types::{FeelValue, Interval};
use std::collections::BTreeMap;
use std::fmt;

/// FEEL expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(FeelValue),

    /// Variable reference; may contain spaces and dots (`Applicant Age`, `Applicant.age`)
    Name(String),

    /// Arithmetic negation
    Negate(Box<Expr>),

    /// Arithmetic: `left op right`
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Comparison: `left op right`
    Compare {
        op: Comparison,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Logical conjunction
    And(Box<Expr>, Box<Expr>),

    /// Logical disjunction
    Or(Box<Expr>, Box<Expr>),

    /// Logical negation: `not(expr)`
    Not(Box<Expr>),

    /// List: `[a, b, c]`
    List(Vec<Expr>),

    /// Context: `{key: value}`
    Context(Vec<(String, Expr)>),

    /// Interval: `[start .. end]`
    Interval {
        start_closed: bool,
        start: Box<Expr>,
        end: Box<Expr>,
        end_closed: bool,
    },
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Expr {
    pub fn literal(value: impl Into<FeelValue>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    /// Fold a constant expression into its value.
    ///
    /// Only literal forms qualify: literals, negated numbers, and lists,
    /// contexts and intervals made of constants. Anything referencing a
    /// name or an operator other than negation yields `None`.
    pub fn as_constant(&self) -> Option<FeelValue> {
        match self {
            Expr::Literal(value) => Some(value.clone()),
            Expr::Negate(inner) => match inner.as_constant()? {
                FeelValue::Number(n) => Some(FeelValue::Number(-n)),
                FeelValue::DayTimeDuration(d) => Some(FeelValue::DayTimeDuration(-d)),
                FeelValue::YearMonthDuration(m) => m.checked_neg().map(FeelValue::YearMonthDuration),
                _ => None,
            },
            Expr::List(items) => items
                .iter()
                .map(Expr::as_constant)
                .collect::<Option<Vec<_>>>()
                .map(FeelValue::List),
            Expr::Context(entries) => entries
                .iter()
                .map(|(k, v)| v.as_constant().map(|v| (k.clone(), v)))
                .collect::<Option<BTreeMap<_, _>>>()
                .map(FeelValue::Context),
            Expr::Interval {
                start_closed,
                start,
                end,
                end_closed,
            } => Some(FeelValue::Interval(Box::new(Interval::new(
                *start_closed,
                start.as_constant()?,
                end.as_constant()?,
                *end_closed,
            )))),
            _ => None,
        }
    }

    /// Variable names referenced by this expression, in source order
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Name(name) => out.push(name),
            Expr::Negate(inner) | Expr::Not(inner) => inner.collect_names(out),
            Expr::Arithmetic { left, right, .. }
            | Expr::Compare { left, right, .. }
            | Expr::And(left, right)
            | Expr::Or(left, right) => {
                left.collect_names(out);
                right.collect_names(out);
            }
            Expr::List(items) => items.iter().for_each(|item| item.collect_names(out)),
            Expr::Context(entries) => entries.iter().for_each(|(_, v)| v.collect_names(out)),
            Expr::Interval { start, end, .. } => {
                start.collect_names(out);
                end.collect_names(out);
            }
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Eq => "=",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        })
    }
}
