//! Expression parser
//!
//! Parses the restricted expression language into Expression AST nodes.
//!
//! Supported syntax:
//! - Literals: `42`, `3.5`, `10E-5`, `'string'`, `"string"`, `True`, `False`
//! - Arithmetic: `+`, `-`, `*`, `/`, `%`, `**`
//! - Comparison: `==`, `!=`, `<`, `<=`, `>`, `>=` (chains like `1 < x < 3`)
//! - Logical: `and`/`&&`, `or`/`||`, `not`/`!`
//! - Function calls: `max(1, 2)`, `sqrt(16)`
//! - Parentheses for grouping: `(a + b) * c`
//!
//! There are no variables: any bare name that is not a call is rejected.
//! Input is limited to [`MAX_TOKENS`] tokens and [`MAX_DEPTH`] levels of
//! nesting (parentheses, call arguments, prefix operators, `**` exponents).
//!
//! ```text
//! or      := and (("or" | "||") and)*
//! and     := not (("and" | "&&") not)*
//! not     := ("not" | "!") not | compare
//! compare := sum (cmp_op sum)*
//! sum     := product (("+" | "-") product)*
//! product := unary (("*" | "/" | "%") unary)*
//! unary   := ("-" | "+") unary | power
//! power   := primary ("**" unary)?
//! primary := number | string | bool | ident "(" args ")" | "(" or ")"
//! ```

use crate::error::{ParseError, Result};
use crate::tokenizer::{tokenize, Spanned, Symbol, Token};
use vsptd_core::ast::{Expression, Operator, UnaryOperator};
use vsptd_core::Value;

/// Most tokens an expression may have
pub const MAX_TOKENS: usize = 1024;

/// Deepest nesting an expression may have
pub const MAX_DEPTH: usize = 128;

/// Expression parser
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> Result<Expression> {
        if input.trim().is_empty() {
            return Err(ParseError::syntax(0, "Empty expression"));
        }

        let tokens = tokenize(input)?;
        if let Some(extra) = tokens.get(MAX_TOKENS) {
            return Err(ParseError::syntax(
                extra.position,
                format!("expression is longer than {} tokens", MAX_TOKENS),
            ));
        }

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_or()?;

        if let Some(extra) = parser.peek() {
            return Err(ParseError::syntax(
                extra.position,
                format!("unexpected '{}'", extra.token),
            ));
        }

        log::trace!("parsed expression {:?}", expr);
        Ok(expr)
    }
}

struct Parser<'t> {
    tokens: &'t [Spanned],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Spanned> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_binary(&self) -> Option<Operator> {
        match self.peek().map(|s| &s.token) {
            Some(Token::Op(Symbol::Binary(op))) => Some(*op),
            _ => None,
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek().map(|s| &s.token), Some(Token::Ident(name)) if name == keyword)
    }

    fn expect(&mut self, expected: Token, context: &str) -> Result<()> {
        match self.next() {
            Some(s) if s.token == expected => Ok(()),
            Some(s) => Err(ParseError::syntax(
                s.position,
                format!("expected '{}' {}, found '{}'", expected, context, s.token),
            )),
            None => Err(ParseError::UnexpectedEnd(format!(
                "expected '{}' {}",
                expected, context
            ))),
        }
    }

    /// Run a nested rule one level deeper
    fn descend(&mut self, rule: fn(&mut Self) -> Result<Expression>) -> Result<Expression> {
        if self.depth >= MAX_DEPTH {
            let position = self.peek().map_or(0, |s| s.position);
            return Err(ParseError::syntax(
                position,
                format!("expression is nested deeper than {} levels", MAX_DEPTH),
            ));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        loop {
            if self.peek_keyword("or") || self.peek_binary() == Some(Operator::Or) {
                self.pos += 1;
                let right = self.parse_and()?;
                left = Expression::binary(left, Operator::Or, right);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_not()?;
        loop {
            if self.peek_keyword("and") || self.peek_binary() == Some(Operator::And) {
                self.pos += 1;
                let right = self.parse_not()?;
                left = Expression::binary(left, Operator::And, right);
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_not(&mut self) -> Result<Expression> {
        let is_not = self.peek_keyword("not")
            || matches!(self.peek().map(|s| &s.token), Some(Token::Op(Symbol::Bang)));
        if is_not {
            self.pos += 1;
            let operand = self.descend(Self::parse_not)?;
            return Ok(Expression::unary(UnaryOperator::Not, operand));
        }
        self.parse_compare()
    }

    /// `a < b < c` means `a < b and b < c`
    fn parse_compare(&mut self) -> Result<Expression> {
        let first = self.parse_sum()?;
        let mut result: Option<Expression> = None;
        let mut left = first.clone();

        while let Some(op) = self.peek_binary().filter(Operator::is_comparison) {
            self.pos += 1;
            let right = self.parse_sum()?;
            let comparison = Expression::binary(left, op, right.clone());
            result = Some(match result {
                None => comparison,
                Some(prev) => Expression::binary(prev, Operator::And, comparison),
            });
            left = right;
        }

        Ok(result.unwrap_or(first))
    }

    fn parse_sum(&mut self) -> Result<Expression> {
        let mut left = self.parse_product()?;
        while let Some(op) = self
            .peek_binary()
            .filter(|op| matches!(op, Operator::Add | Operator::Sub))
        {
            self.pos += 1;
            let right = self.parse_product()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_product(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self
            .peek_binary()
            .filter(|op| matches!(op, Operator::Mul | Operator::Div | Operator::Mod))
        {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        let op = match self.peek_binary() {
            Some(Operator::Sub) => Some(UnaryOperator::Negate),
            Some(Operator::Add) => Some(UnaryOperator::Plus),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let operand = self.descend(Self::parse_unary)?;
            return Ok(Expression::unary(op, operand));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expression> {
        let base = self.parse_primary()?;
        if self.peek_binary() == Some(Operator::Pow) {
            self.pos += 1;
            let exponent = self.descend(Self::parse_unary)?;
            return Ok(Expression::binary(base, Operator::Pow, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let Some(spanned) = self.next() else {
            return Err(ParseError::UnexpectedEnd("expected an operand".to_string()));
        };

        match &spanned.token {
            Token::Number(value) => Ok(Expression::Literal(value.clone())),
            Token::Str(s) => Ok(Expression::literal(Value::Str(s.clone()))),
            Token::LParen => {
                let inner = self.descend(Self::parse_or)?;
                self.expect(Token::RParen, "to close '('")?;
                Ok(inner)
            }
            Token::Ident(name) => match name.as_str() {
                "True" | "true" => Ok(Expression::literal(true)),
                "False" | "false" => Ok(Expression::literal(false)),
                _ if matches!(self.peek().map(|s| &s.token), Some(Token::LParen)) => {
                    self.pos += 1;
                    let args = self.parse_args()?;
                    Ok(Expression::call(name.clone(), args))
                }
                _ => Err(ParseError::syntax(
                    spanned.position,
                    format!("unknown name '{}'", name),
                )),
            },
            other => Err(ParseError::syntax(
                spanned.position,
                format!("unexpected '{}'", other),
            )),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expression>> {
        let mut args = Vec::new();
        if matches!(self.peek().map(|s| &s.token), Some(Token::RParen)) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.descend(Self::parse_or)?);
            match self.next() {
                Some(s) if s.token == Token::Comma => continue,
                Some(s) if s.token == Token::RParen => return Ok(args),
                Some(s) => {
                    return Err(ParseError::syntax(
                        s.position,
                        format!("expected ',' or ')', found '{}'", s.token),
                    ))
                }
                None => {
                    return Err(ParseError::UnexpectedEnd(
                        "unclosed argument list".to_string(),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsptd_core::ErrorKind;

    fn int(i: i64) -> Expression {
        Expression::literal(i)
    }

    #[test]
    fn test_precedence() {
        let expr = ExpressionParser::parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                int(1),
                Operator::Add,
                Expression::binary(int(2), Operator::Mul, int(3))
            )
        );
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        let expr = ExpressionParser::parse("-2 ** 2").unwrap();
        assert_eq!(
            expr,
            Expression::unary(
                UnaryOperator::Negate,
                Expression::binary(int(2), Operator::Pow, int(2))
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = ExpressionParser::parse("2 ** 3 ** 2").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                int(2),
                Operator::Pow,
                Expression::binary(int(3), Operator::Pow, int(2))
            )
        );
    }

    #[test]
    fn test_comparison_chain() {
        let expr = ExpressionParser::parse("1 < 2 < 3").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                Expression::binary(int(1), Operator::Lt, int(2)),
                Operator::And,
                Expression::binary(int(2), Operator::Lt, int(3))
            )
        );
    }

    #[test]
    fn test_logical_keywords_and_symbols() {
        let words = ExpressionParser::parse("not True or False and True").unwrap();
        let symbols = ExpressionParser::parse("!True || False && True").unwrap();
        assert_eq!(words, symbols);
        assert!(matches!(words, Expression::Binary { op: Operator::Or, .. }));
    }

    #[test]
    fn test_function_call() {
        let expr = ExpressionParser::parse("max(1, min(2, 3))").unwrap();
        assert_eq!(
            expr,
            Expression::call(
                "max",
                vec![int(1), Expression::call("min", vec![int(2), int(3)])]
            )
        );
        assert_eq!(
            ExpressionParser::parse("f()").unwrap(),
            Expression::call("f", vec![])
        );
    }

    #[test]
    fn test_bare_name_is_rejected() {
        let err = ExpressionParser::parse("x + 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert!(ExpressionParser::parse(&nested(MAX_DEPTH - 1)).is_ok());

        for input in [
            nested(MAX_DEPTH + 1),
            nested(100_000),
            format!("{}1", "-".repeat(MAX_DEPTH + 1)),
            format!("{}True", "not ".repeat(MAX_DEPTH + 1)),
            format!("{}1", "2**".repeat(MAX_DEPTH + 1)),
            format!("{}1{}", "max(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1)),
        ] {
            let err = ExpressionParser::parse(&input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax);
        }
    }

    #[test]
    fn test_token_limit() {
        let chain = |n: usize| format!("1{}", "+1".repeat(n));
        assert!(ExpressionParser::parse(&chain(MAX_TOKENS / 2 - 1)).is_ok());

        let err = ExpressionParser::parse(&chain(MAX_TOKENS)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        let err = ExpressionParser::parse(&chain(100_000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_errors() {
        for input in ["", "   ", "(1 + 2", "1 +", "1 2", "max(1,", "[1,2]", "1 = 2"] {
            let err = ExpressionParser::parse(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax, "input: {:?}", input);
        }
    }
}
