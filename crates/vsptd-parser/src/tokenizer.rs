//! Tokenizer for the restricted expression language
//!
//! Token types:
//! - **Number**: `42`, `3.5`, `.25`, `10E-5`
//! - **Str**: `'text'` or `"text"` with backslash escapes
//! - **Ident**: function names, `True`/`False`, `and`/`or`/`not`
//! - **Op**: arithmetic, comparison and logical operator symbols
//! - **LParen** / **RParen** / **Comma**

use crate::error::{ParseError, Result};
use std::fmt;
use vsptd_core::ast::Operator;
use vsptd_core::Value;

/// Operator symbols recognized by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Binary(Operator),
    /// `!`
    Bang,
}

/// A classified token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Value),
    Str(String),
    Ident(String),
    Op(Symbol),
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(v) => write!(f, "{v}"),
            Token::Str(s) => write!(f, "{}", Value::Str(s.clone()).to_literal()),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Op(Symbol::Binary(op)) => write!(f, "{op}"),
            Token::Op(Symbol::Bang) => write!(f, "!"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Token with the character offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Split expression text into tokens.
///
/// Whitespace is consumed but not emitted.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        let ch = chars[i];
        let start = i;

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        let token = match ch {
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            '\'' | '"' => {
                let (text, next) = read_string(&chars, i)?;
                i = next;
                Token::Str(text)
            }
            c if c.is_ascii_digit() || (c == '.' && peek_digit(&chars, i + 1)) => {
                let (value, next) = read_number(&chars, i)?;
                i = next;
                Token::Number(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                while i < len && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                Token::Ident(chars[start..i].iter().collect())
            }
            _ => {
                let (symbol, next) = read_operator(&chars, i)?;
                i = next;
                Token::Op(symbol)
            }
        };

        tokens.push(Spanned {
            token,
            position: start,
        });
    }

    Ok(tokens)
}

fn peek_digit(chars: &[char], i: usize) -> bool {
    chars.get(i).is_some_and(|c| c.is_ascii_digit())
}

fn read_string(chars: &[char], start: usize) -> Result<(String, usize)> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or_else(|| ParseError::UnexpectedEnd("unterminated string".to_string()))?;
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => *other,
                });
                i += 2;
            }
            c if c == quote => return Ok((out, i + 1)),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    Err(ParseError::UnexpectedEnd(format!(
        "unterminated string starting at {}",
        start
    )))
}

fn read_number(chars: &[char], start: usize) -> Result<(Value, usize)> {
    let len = chars.len();
    let mut i = start;
    let mut is_float = false;

    while i < len && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < len && chars[i] == '.' {
        is_float = true;
        i += 1;
        while i < len && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < len && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < len && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if peek_digit(chars, j) {
            is_float = true;
            i = j;
            while i < len && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
    }

    let text: String = chars[start..i].iter().collect();
    let invalid = || ParseError::syntax(start, format!("invalid number '{}'", text));

    let value = match text.parse::<i64>() {
        Ok(n) if !is_float => Value::Int(n),
        _ => {
            let f = text.parse::<f64>().map_err(|_| invalid())?;
            if !f.is_finite() {
                return Err(ParseError::syntax(
                    start,
                    format!("number '{}' is out of range", text),
                ));
            }
            Value::Float(f)
        }
    };
    Ok((value, i))
}

fn read_operator(chars: &[char], i: usize) -> Result<(Symbol, usize)> {
    let next = chars.get(i + 1).copied();
    let (symbol, width) = match (chars[i], next) {
        ('*', Some('*')) => (Symbol::Binary(Operator::Pow), 2),
        ('=', Some('=')) => (Symbol::Binary(Operator::Eq), 2),
        ('!', Some('=')) => (Symbol::Binary(Operator::Ne), 2),
        ('<', Some('=')) => (Symbol::Binary(Operator::Le), 2),
        ('>', Some('=')) => (Symbol::Binary(Operator::Ge), 2),
        ('&', Some('&')) => (Symbol::Binary(Operator::And), 2),
        ('|', Some('|')) => (Symbol::Binary(Operator::Or), 2),
        ('+', _) => (Symbol::Binary(Operator::Add), 1),
        ('-', _) => (Symbol::Binary(Operator::Sub), 1),
        ('*', _) => (Symbol::Binary(Operator::Mul), 1),
        ('/', _) => (Symbol::Binary(Operator::Div), 1),
        ('%', _) => (Symbol::Binary(Operator::Mod), 1),
        ('<', _) => (Symbol::Binary(Operator::Lt), 1),
        ('>', _) => (Symbol::Binary(Operator::Gt), 1),
        ('!', _) => (Symbol::Bang, 1),
        ('=', _) | ('&', _) | ('|', _) => {
            return Err(ParseError::InvalidOperator(chars[i].to_string()));
        }
        (other, _) => {
            return Err(ParseError::syntax(
                i,
                format!("unexpected character '{}'", other),
            ));
        }
    };
    Ok((symbol, i + width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokens("42"), vec![Token::Number(Value::Int(42))]);
        assert_eq!(tokens("3.5"), vec![Token::Number(Value::Float(3.5))]);
        assert_eq!(tokens(".25"), vec![Token::Number(Value::Float(0.25))]);
        assert_eq!(tokens("10E-5"), vec![Token::Number(Value::Float(0.0001))]);
        assert_eq!(tokens("1e3"), vec![Token::Number(Value::Float(1000.0))]);
        assert_eq!(
            tokens("99999999999999999999"),
            vec![Token::Number(Value::Float(1e20))]
        );
    }

    #[test]
    fn test_out_of_range_number() {
        match tokenize("1e400").unwrap_err() {
            ParseError::Syntax { position, .. } => assert_eq!(position, 0),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(tokens(r"'it\'s'"), vec![Token::Str("it's".to_string())]);
        assert_eq!(tokens(r#""a b""#), vec![Token::Str("a b".to_string())]);
        assert!(tokenize("'open").is_err());
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokens("a**b <= c != d"),
            vec![
                Token::Ident("a".to_string()),
                Token::Op(Symbol::Binary(Operator::Pow)),
                Token::Ident("b".to_string()),
                Token::Op(Symbol::Binary(Operator::Le)),
                Token::Ident("c".to_string()),
                Token::Op(Symbol::Binary(Operator::Ne)),
                Token::Ident("d".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_equals_is_invalid() {
        let err = tokenize("1 = 1").unwrap_err();
        assert!(matches!(err, ParseError::InvalidOperator(_)));
    }

    #[test]
    fn test_unexpected_character_position() {
        match tokenize("1 + [2]").unwrap_err() {
            ParseError::Syntax { position, .. } => assert_eq!(position, 4),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_cyrillic_identifier() {
        assert_eq!(tokens("ЕСТЬ"), vec![Token::Ident("ЕСТЬ".to_string())]);
    }
}
