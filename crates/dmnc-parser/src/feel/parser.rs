//! FEEL parser
//!
//! Recursive descent over the token stream. Precedence, lowest first:
//! `or`, `and`, comparison, `+ -`, `* /`, unary minus, primary.
//!
//! Supported syntax:
//! - Literals: `42`, `3.14`, `"string"`, `true`, `false`, `null`, `@"2024-01-15"`
//! - Names: `age`, `Applicant Age`, `Applicant.age`
//! - Built-in constructors with constant arguments: `date("2024-01-15")`,
//!   `date(2024, 1, 15)`, `time(...)`, `date and time(...)`, `duration(...)`
//! - Negation: `not(expr)`
//! - Lists `[1, 2]`, contexts `{a: 1, "b c": 2}`, intervals `[1 .. 10)`, `]1 .. 10[`

use super::lexer::{tokenize, Token};
use super::temporal;
use crate::error::{ParseError, Result};
use chrono::NaiveDate;
use dmnc_core::ast::{ArithmeticOp, Comparison, Expr, UnaryTest, UnaryTests};
use dmnc_core::{FeelDateTime, FeelValue};

/// Deepest nesting of brackets, unary minus and operator chains
const MAX_DEPTH: usize = 128;

/// Words that end a multi-word name
const KEYWORDS: &[&str] = &["and", "or", "true", "false", "null"];

/// FEEL parser
pub struct FeelParser;

impl FeelParser {
    /// Parse a FEEL expression
    pub fn parse_expression(input: &str) -> Result<Expr> {
        if input.trim().is_empty() {
            return Err(ParseError::InvalidExpression("Empty expression".to_string()));
        }
        let mut parser = Parser::new(input)?;
        let expr = parser.expression()?;
        parser.expect_end()?;
        Ok(expr)
    }

    /// Parse a constant FEEL value.
    ///
    /// Accepts bare ISO date, time, date-time and duration text as well as
    /// any constant expression (`30`, `"x"`, `[1 .. 10)`, `@"2024-01-15"`).
    pub fn parse_literal(input: &str) -> Result<FeelValue> {
        if let Some(value) = temporal::parse_temporal(input) {
            return Ok(value);
        }
        let expr = Self::parse_expression(input)?;
        expr.as_constant().ok_or_else(|| {
            ParseError::InvalidExpression(format!("Not a literal value: {}", input.trim()))
        })
    }

    /// Parse the unary tests of an input entry cell
    pub fn parse_unary_tests(input: &str) -> Result<UnaryTests> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "-" {
            return Ok(UnaryTests::Any);
        }

        let mut parser = Parser::new(trimmed)?;
        let negated = parser.peek_word("not") && parser.peek_at(1) == Some(&Token::LParen);
        if negated {
            parser.advance();
            parser.advance();
        }

        let mut tests = vec![parser.unary_test()?];
        while parser.eat(&Token::Comma) {
            tests.push(parser.unary_test()?);
        }

        if negated {
            parser.expect(&Token::RParen)?;
        }
        parser.expect_end()?;

        Ok(if negated {
            UnaryTests::NoneOf(tests)
        } else {
            UnaryTests::OneOf(tests)
        })
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            depth: 0,
        })
    }

    /// Enter one more level of the expression tree
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::InvalidExpression(format!(
                "Expression nested deeper than {} levels",
                MAX_DEPTH
            )));
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w == word)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("{:?}", token)))
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }

    fn unexpected(&self, wanted: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::InvalidExpression(format!(
                "Expected {} but found {:?}",
                wanted, token
            )),
            None => ParseError::InvalidExpression(format!(
                "Expected {} but reached end of input",
                wanted
            )),
        }
    }

    fn unary_test(&mut self) -> Result<UnaryTest> {
        let comparison = match self.peek() {
            Some(Token::Lt) => Some(Comparison::Lt),
            Some(Token::Le) => Some(Comparison::Le),
            Some(Token::Gt) => Some(Comparison::Gt),
            Some(Token::Ge) => Some(Comparison::Ge),
            Some(Token::Eq) => Some(Comparison::Eq),
            Some(Token::Ne) => Some(Comparison::Ne),
            _ => None,
        };
        if let Some(op) = comparison {
            self.advance();
            return Ok(UnaryTest::Compare(op, self.additive()?));
        }

        match self.expression()? {
            Expr::Interval {
                start_closed,
                start,
                end,
                end_closed,
            } => Ok(UnaryTest::Range {
                start_closed,
                start: *start,
                end: *end,
                end_closed,
            }),
            expr => Ok(UnaryTest::Equal(expr)),
        }
    }

    fn expression(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut left = self.conjunction()?;
        while self.peek_word("or") {
            self.advance();
            self.descend()?;
            let right = self.conjunction()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn conjunction(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut left = self.comparison()?;
        while self.peek_word("and") {
            self.advance();
            self.descend()?;
            let right = self.comparison()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let left = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => Comparison::Eq,
            Some(Token::Ne) => Comparison::Ne,
            Some(Token::Lt) => Comparison::Lt,
            Some(Token::Le) => Comparison::Le,
            Some(Token::Gt) => Comparison::Gt,
            Some(Token::Ge) => Comparison::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.additive()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn additive(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithmeticOp::Add,
                Some(Token::Minus) => ArithmeticOp::Sub,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.multiplicative()?;
            left = Expr::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth = depth;
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let depth = self.depth;
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithmeticOp::Mul,
                Some(Token::Slash) => ArithmeticOp::Div,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.unary()?;
            left = Expr::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth = depth;
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        self.descend()?;
        let expr = if self.eat(&Token::Minus) {
            self.unary().map(|operand| match operand {
                Expr::Literal(FeelValue::Number(n)) => Expr::Literal(FeelValue::Number(-n)),
                other => Expr::Negate(Box::new(other)),
            })
        } else {
            self.primary()
        };
        self.depth -= 1;
        expr
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.advance().ok_or_else(|| {
            ParseError::InvalidExpression("Unexpected end of expression".to_string())
        })?;

        match token {
            Token::Number(n) => Ok(Expr::literal(n)),
            Token::String(s) => Ok(Expr::literal(s)),
            Token::Temporal(text) => temporal::parse_temporal(&text)
                .map(Expr::Literal)
                .ok_or_else(|| {
                    ParseError::InvalidExpression(format!("Invalid temporal literal: @\"{}\"", text))
                }),
            Token::LParen => {
                let inner = self.expression()?;
                if self.eat(&Token::Range) {
                    return self.interval_tail(false, inner);
                }
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::RBracket => {
                let start = self.expression()?;
                self.expect(&Token::Range)?;
                self.interval_tail(false, start)
            }
            Token::LBracket => self.list_or_interval(),
            Token::LBrace => self.context(),
            Token::Word(word) => self.word(word),
            other => Err(ParseError::InvalidExpression(format!(
                "Unexpected token {:?}",
                other
            ))),
        }
    }

    /// After `[`: a list, or an interval with a closed start
    fn list_or_interval(&mut self) -> Result<Expr> {
        if self.eat(&Token::RBracket) {
            return Ok(Expr::List(Vec::new()));
        }
        let first = self.expression()?;
        if self.eat(&Token::Range) {
            return self.interval_tail(true, first);
        }

        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            items.push(self.expression()?);
        }
        self.expect(&Token::RBracket)?;
        Ok(Expr::List(items))
    }

    /// After `<start> ..`: the end point and its closing bracket
    fn interval_tail(&mut self, start_closed: bool, start: Expr) -> Result<Expr> {
        let end = self.expression()?;
        let end_closed = match self.advance() {
            Some(Token::RBracket) => true,
            Some(Token::RParen) | Some(Token::LBracket) => false,
            _ => {
                return Err(ParseError::InvalidExpression(
                    "Interval must end with ']', ')' or '['".to_string(),
                ))
            }
        };
        Ok(Expr::Interval {
            start_closed,
            start: Box::new(start),
            end: Box::new(end),
            end_closed,
        })
    }

    fn context(&mut self) -> Result<Expr> {
        let mut entries = Vec::new();
        if self.eat(&Token::RBrace) {
            return Ok(Expr::Context(entries));
        }
        loop {
            let key = match self.advance() {
                Some(Token::String(key)) => key,
                Some(Token::Word(word)) => self.name_from(word),
                _ => {
                    return Err(ParseError::InvalidExpression(
                        "Context key must be a name or a string".to_string(),
                    ))
                }
            };
            self.expect(&Token::Colon)?;
            entries.push((key, self.expression()?));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace)?;
        Ok(Expr::Context(entries))
    }

    fn word(&mut self, word: String) -> Result<Expr> {
        match word.as_str() {
            "true" => return Ok(Expr::literal(true)),
            "false" => return Ok(Expr::literal(false)),
            "null" => return Ok(Expr::Literal(FeelValue::Null)),
            _ => {}
        }

        // `date and time(...)` is the one built-in whose name contains a keyword
        if word == "date"
            && self.peek_word("and")
            && matches!(self.peek_at(1), Some(Token::Word(w)) if w == "time")
            && self.peek_at(2) == Some(&Token::LParen)
        {
            self.pos += 3;
            return self.builtin("date and time");
        }

        let name = self.name_from(word);
        if self.eat(&Token::LParen) {
            return self.builtin(&name);
        }
        Ok(Expr::Name(name))
    }

    /// Join consecutive non-keyword words into one name
    fn name_from(&mut self, first: String) -> String {
        let mut name = first;
        while let Some(Token::Word(next)) = self.peek() {
            if KEYWORDS.contains(&next.as_str()) {
                break;
            }
            name.push(' ');
            name.push_str(next);
            self.pos += 1;
        }
        name
    }

    /// Built-in call; the opening parenthesis has been consumed
    fn builtin(&mut self, name: &str) -> Result<Expr> {
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
        }

        if name == "not" {
            return match args.len() {
                1 => Ok(Expr::Not(Box::new(args.remove(0)))),
                n => Err(ParseError::InvalidExpression(format!(
                    "not() takes one argument, found {}",
                    n
                ))),
            };
        }

        let values = args
            .iter()
            .map(|arg| {
                arg.as_constant().ok_or_else(|| {
                    ParseError::InvalidExpression(format!(
                        "{}() only accepts literal arguments",
                        name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        construct(name, &values).map(Expr::Literal).ok_or_else(|| {
            ParseError::InvalidExpression(format!("Invalid call: {}({})", name, render(&values)))
        })
    }
}

/// Evaluate a temporal constructor over constant arguments
fn construct(name: &str, args: &[FeelValue]) -> Option<FeelValue> {
    match (name, args) {
        ("date", [FeelValue::String(s)]) => temporal::parse_date(s).map(FeelValue::Date),
        ("date", [FeelValue::DateTime(dt)]) => Some(FeelValue::Date(dt.local.date())),
        ("date", [FeelValue::Number(y), FeelValue::Number(m), FeelValue::Number(d)]) => {
            NaiveDate::from_ymd_opt(*y as i32, *m as u32, *d as u32).map(FeelValue::Date)
        }
        ("time", [FeelValue::String(s)]) => temporal::parse_time(s).map(FeelValue::Time),
        ("date and time", [FeelValue::String(s)]) => {
            temporal::parse_date_time(s).map(FeelValue::DateTime)
        }
        ("date and time", [FeelValue::Date(d), FeelValue::Time(t)]) => Some(FeelValue::DateTime(
            FeelDateTime::new(d.and_time(t.time), t.offset),
        )),
        ("duration", [FeelValue::String(s)]) => temporal::parse_duration(s),
        _ => None,
    }
}

fn render(values: &[FeelValue]) -> String {
    values
        .iter()
        .map(FeelValue::to_feel_literal)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_precedence() {
        let expr = FeelParser::parse_expression("a + b * 2 > 10 and c").unwrap();
        let Expr::And(left, right) = expr else {
            panic!("expected and");
        };
        assert_eq!(*right, Expr::name("c"));
        let Expr::Compare { op, left, .. } = *left else {
            panic!("expected comparison");
        };
        assert_eq!(op, Comparison::Gt);
        assert!(matches!(*left, Expr::Arithmetic { op: ArithmeticOp::Add, .. }));
    }

    #[test]
    fn test_multi_word_name() {
        assert_eq!(
            FeelParser::parse_expression("Applicant Age").unwrap(),
            Expr::name("Applicant Age")
        );
        let expr = FeelParser::parse_expression("Monthly Income and approved").unwrap();
        assert_eq!(expr.names(), vec!["Monthly Income", "approved"]);
    }

    #[test]
    fn test_date_and_time_builtin() {
        let value = FeelParser::parse_literal(r#"date and time("2024-01-15T10:00:00")"#).unwrap();
        assert!(matches!(value, FeelValue::DateTime(_)));
        assert_eq!(
            FeelParser::parse_literal("date(2024, 1, 15)").unwrap(),
            FeelValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_parse_literal_bare_iso() {
        assert_eq!(
            FeelParser::parse_literal("P2D").unwrap(),
            FeelValue::DayTimeDuration(TimeDelta::try_days(2).unwrap())
        );
        assert_eq!(FeelParser::parse_literal("30").unwrap(), FeelValue::Number(30.0));
        assert_eq!(FeelParser::parse_literal("-4.5").unwrap(), FeelValue::Number(-4.5));
    }

    #[test]
    fn test_parse_literal_rejects_names() {
        assert!(FeelParser::parse_literal("hello world").is_err());
        assert!(FeelParser::parse_literal("a + 1").is_err());
    }

    #[test]
    fn test_intervals() {
        let open_start = FeelParser::parse_literal("]1 .. 10]").unwrap();
        assert_eq!(open_start.to_feel_literal(), "(1 .. 10]");
        let temporal = FeelParser::parse_literal(r#"[@"2024-01-01" .. @"2024-12-31")"#).unwrap();
        let FeelValue::Interval(interval) = temporal else {
            panic!("expected an interval");
        };
        assert!(interval.start_closed);
        assert!(!interval.end_closed);
    }

    #[test]
    fn test_context_and_list() {
        let value = FeelParser::parse_literal(r#"{name: "x", "two words": [1, 2]}"#).unwrap();
        let FeelValue::Context(entries) = value else {
            panic!("expected a context");
        };
        assert_eq!(entries["name"], FeelValue::from("x"));
        assert_eq!(
            entries["two words"],
            FeelValue::List(vec![FeelValue::Number(1.0), FeelValue::Number(2.0)])
        );
    }

    #[test]
    fn test_unary_tests() {
        assert_eq!(FeelParser::parse_unary_tests(" - ").unwrap(), UnaryTests::Any);
        assert_eq!(FeelParser::parse_unary_tests("").unwrap(), UnaryTests::Any);

        let tests = FeelParser::parse_unary_tests(r#""gold", "silver""#).unwrap();
        let UnaryTests::OneOf(tests) = tests else {
            panic!("expected positive tests");
        };
        assert_eq!(tests.len(), 2);

        let tests = FeelParser::parse_unary_tests(">= 18").unwrap();
        assert_eq!(
            tests,
            UnaryTests::OneOf(vec![UnaryTest::Compare(Comparison::Ge, Expr::literal(18.0))])
        );
    }

    #[test]
    fn test_unary_tests_ranges_and_negation() {
        let tests = FeelParser::parse_unary_tests("[18..65)").unwrap();
        assert!(matches!(
            tests,
            UnaryTests::OneOf(ref t) if matches!(t[0], UnaryTest::Range { start_closed: true, end_closed: false, .. })
        ));

        let tests = FeelParser::parse_unary_tests(r#"not("red", "blue")"#).unwrap();
        assert!(matches!(tests, UnaryTests::NoneOf(ref t) if t.len() == 2));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let brackets = "[".repeat(50_000);
        assert!(matches!(
            FeelParser::parse_literal(&brackets),
            Err(ParseError::InvalidExpression(_))
        ));
        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(FeelParser::parse_expression(&parens).is_err());
        assert!(FeelParser::parse_expression(&format!("{}1", "-".repeat(10_000))).is_err());
        let chain = vec!["1"; 10_000].join(" + ");
        assert!(FeelParser::parse_expression(&chain).is_err());
        assert!(FeelParser::parse_unary_tests(&format!("{}1", "[".repeat(50_000))).is_err());
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let nested = format!("{}1{}", "[".repeat(20), "]".repeat(20));
        assert!(FeelParser::parse_literal(&nested).is_ok());
        let chain = vec!["1"; 50].join(" + ");
        assert!(FeelParser::parse_expression(&chain).is_ok());
        assert!(FeelParser::parse_expression("((a + b) * -(c - 1)) >= 10 and not(d)").is_ok());
    }

    #[test]
    fn test_unary_tests_reject_garbage() {
        assert!(FeelParser::parse_unary_tests(">= ").is_err());
        assert!(FeelParser::parse_unary_tests("[1 .. 2").is_err());
        assert!(FeelParser::parse_unary_tests("1 2 )").is_err());
    }
}
