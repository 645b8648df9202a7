//! Unary operator execution

use super::Number;
use crate::error::{Result, RuntimeError};
use vsptd_core::ast::UnaryOperator;
use vsptd_core::Value;

/// Execute a unary operation
pub(crate) fn execute_unary_op(operand: &Value, op: &UnaryOperator) -> Result<Value> {
    match (op, Number::of(operand)) {
        (UnaryOperator::Not, _) => Ok(Value::Bool(!operand.is_truthy())),
        (UnaryOperator::Negate, Some(Number::Int(i))) => Ok(i
            .checked_neg()
            .map(Value::Int)
            .unwrap_or(Value::Float(-(i as f64)))),
        (UnaryOperator::Negate, Some(Number::Float(f))) => Ok(Value::Float(-f)),
        (UnaryOperator::Plus, Some(Number::Int(i))) => Ok(Value::Int(i)),
        (UnaryOperator::Plus, Some(Number::Float(f))) => Ok(Value::Float(f)),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot apply {:?} to {}",
            op,
            operand.type_name()
        ))),
    }
}
