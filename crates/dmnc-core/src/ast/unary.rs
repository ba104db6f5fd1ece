//! Unary tests: the condition cells of a decision table

use super::expression::{Comparison, Expr};

/// A single positive unary test
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryTest {
    /// `< 18`, `>= @"2024-01-01"`
    Compare(Comparison, Expr),

    /// `[18 .. 65)`
    Range {
        start_closed: bool,
        start: Expr,
        end: Expr,
        end_closed: bool,
    },

    /// Plain value, matched by equality (`"gold"`, `true`, `null`)
    Equal(Expr),
}

/// Content of one input entry cell
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryTests {
    /// `-` or an empty cell: matches anything
    Any,

    /// Matches when any test matches
    OneOf(Vec<UnaryTest>),

    /// `not(...)`: matches when no test matches
    NoneOf(Vec<UnaryTest>),
}
