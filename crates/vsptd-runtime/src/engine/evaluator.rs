//! Evaluator of the restricted expression language
//!
//! Walks an [`Expression`] tree and produces a [`Value`]. Only literals,
//! operators and allow-listed functions exist; nothing in an expression can
//! reach the host.

use super::functions::call_function;
use super::operators::{execute_binary_op, execute_compare, execute_unary_op};
use crate::error::Result;
use vsptd_core::ast::{Expression, Operator};
use vsptd_core::Value;
use vsptd_parser::ExpressionParser;

/// Expression evaluator
pub struct Evaluator;

impl Evaluator {
    /// Evaluate a parsed expression
    pub fn evaluate(expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Binary { left, op, right } if op.is_logical() => {
                Self::logical(left, op, right)
            }

            Expression::Binary { left, op, right } => {
                let l = Self::evaluate(left)?;
                let r = Self::evaluate(right)?;
                if op.is_comparison() {
                    Ok(Value::Bool(execute_compare(&l, op, &r)?))
                } else {
                    execute_binary_op(&l, op, &r)
                }
            }

            Expression::Unary { op, operand } => {
                let value = Self::evaluate(operand)?;
                execute_unary_op(&value, op)
            }

            Expression::FunctionCall { name, args } => {
                let args = args
                    .iter()
                    .map(Self::evaluate)
                    .collect::<Result<Vec<_>>>()?;
                call_function(name, &args)
            }
        }
    }

    /// `and`/`or` with short-circuit; the result is always a bool
    fn logical(left: &Expression, op: &Operator, right: &Expression) -> Result<Value> {
        let l = Self::evaluate(left)?.is_truthy();
        if l == (*op == Operator::Or) {
            return Ok(Value::Bool(l));
        }
        Ok(Value::Bool(Self::evaluate(right)?.is_truthy()))
    }

    /// Parse and evaluate expression text
    pub fn evaluate_str(text: &str) -> Result<Value> {
        let expr = ExpressionParser::parse(text)?;
        let value = Self::evaluate(&expr)?;
        tracing::debug!("evaluated {:?} to {:?}", text, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use vsptd_core::ErrorKind;

    fn eval(text: &str) -> Value {
        Evaluator::evaluate_str(text).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("21 * 2"), Value::Int(42));
        assert_eq!(eval("21*2/1"), Value::Float(42.0));
        assert_eq!(eval("2 ** 3 ** 2"), Value::Int(512));
        assert_eq!(eval("-2 ** 2"), Value::Int(-4));
        assert_eq!(eval("(1 + 2) * 3 % 5"), Value::Int(4));
        assert_eq!(eval("'a' + 'b'"), Value::from("ab"));
    }

    #[test]
    fn test_logic_returns_bools() {
        assert_eq!(eval("1 and 'x'"), Value::Bool(true));
        assert_eq!(eval("0 or ''"), Value::Bool(false));
        assert_eq!(eval("not 0"), Value::Bool(true));
        assert_eq!(eval("1 < 2 < 3"), Value::Bool(true));
        assert_eq!(eval("3 > 2 > 2"), Value::Bool(false));
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        assert_eq!(eval("False and 1 / 0"), Value::Bool(false));
        assert_eq!(eval("True or 1 / 0"), Value::Bool(true));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("max(1, 2.5, 2)"), Value::Float(2.5));
        assert_eq!(eval("strcat('a', 'b') == 'ab'"), Value::Bool(true));
        assert_eq!(eval("abs(-3) + sqrt(16)"), Value::Float(7.0));
    }

    #[test]
    fn test_errors() {
        let err = Evaluator::evaluate_str("1 / 0").unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero));

        let err = Evaluator::evaluate_str("open('x')").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = Evaluator::evaluate_str("'a' - 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = Evaluator::evaluate_str("1 +").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
