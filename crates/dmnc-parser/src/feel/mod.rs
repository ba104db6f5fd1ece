//! FEEL (Friendly Enough Expression Language) parsing
//!
//! Covers the subset decision tables use: constant literals, simple
//! expressions over glossary names, and the unary tests of input entries.

mod lexer;
mod parser;
pub mod temporal;

pub use parser::FeelParser;
