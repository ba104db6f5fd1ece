//! FEEL tokenizer

use crate::error::{ParseError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    String(String),
    /// `@"..."`, contents unescaped
    Temporal(String),
    /// A single word; the parser joins consecutive words into names
    Word(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Range,
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Split FEEL source into tokens
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            '{' => tokens.push(Token::LBrace),
            '}' => tokens.push(Token::RBrace),
            ',' => tokens.push(Token::Comma),
            ':' => tokens.push(Token::Colon),
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' => tokens.push(Token::Star),
            '/' => tokens.push(Token::Slash),
            '=' => tokens.push(Token::Eq),
            '.' if chars.get(i + 1) == Some(&'.') => {
                tokens.push(Token::Range);
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Ne);
                i += 1;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Le);
                i += 1;
            }
            '<' => tokens.push(Token::Lt),
            '>' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Ge);
                i += 1;
            }
            '>' => tokens.push(Token::Gt),
            '"' => {
                let (text, next) = read_string(&chars, i)?;
                tokens.push(Token::String(text));
                i = next;
                continue;
            }
            '@' if chars.get(i + 1) == Some(&'"') => {
                let (text, next) = read_string(&chars, i + 1)?;
                tokens.push(Token::Temporal(text));
                i = next;
                continue;
            }
            c if c.is_ascii_digit()
                || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                let (number, next) = read_number(&chars, i)?;
                tokens.push(Token::Number(number));
                i = next;
                continue;
            }
            c if is_word_start(c) => {
                let start = i;
                while i < chars.len() && is_word_part(&chars, i) {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
                continue;
            }
            other => {
                return Err(ParseError::InvalidExpression(format!(
                    "Unexpected character '{}' at position {}",
                    other, i
                )))
            }
        }
        i += 1;
    }

    Ok(tokens)
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '?'
}

/// Word characters, plus a dot between two word characters (`Applicant.age`)
fn is_word_part(chars: &[char], i: usize) -> bool {
    let c = chars[i];
    if c.is_alphanumeric() || c == '_' || c == '?' || c == '\'' {
        return true;
    }
    c == '.'
        && i > 0
        && chars[i - 1] != '.'
        && chars.get(i + 1).is_some_and(|n| is_word_start(*n))
}

/// Read a double-quoted string starting at `start`; returns the unescaped
/// text and the index after the closing quote
fn read_string(chars: &[char], start: usize) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok((out, i + 1)),
            '\\' => {
                let escaped = chars.get(i + 1).ok_or_else(|| {
                    ParseError::InvalidExpression("Unterminated escape in string".to_string())
                })?;
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    other => out.push(*other),
                }
                i += 2;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Err(ParseError::InvalidExpression("Unterminated string literal".to_string()))
}

fn read_number(chars: &[char], start: usize) -> Result<(f64, usize)> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    // a fraction, but not the `..` range operator
    if i < chars.len()
        && chars[i] == '.'
        && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
    {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    let text: String = chars[start..i].iter().collect();
    text.parse::<f64>()
        .map(|n| (n, i))
        .map_err(|_| ParseError::InvalidExpression(format!("Invalid number: {}", text)))
}
