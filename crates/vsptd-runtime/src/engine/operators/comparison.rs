//! Comparison operator execution

use super::Number;
use crate::error::{Result, RuntimeError};
use std::cmp::Ordering;
use vsptd_core::ast::Operator;
use vsptd_core::Value;

/// Execute a comparison operation.
///
/// Numbers compare across int and float, strings lexicographically.
/// Operands of different kinds are never equal and cannot be ordered.
pub(crate) fn execute_compare(left: &Value, op: &Operator, right: &Value) -> Result<bool> {
    let ordering = match (left, right) {
        (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
        _ => match (Number::of(left), Number::of(right)) {
            (Some(Number::Int(l)), Some(Number::Int(r))) => Some(l.cmp(&r)),
            (Some(l), Some(r)) => l.as_f64().partial_cmp(&r.as_f64()),
            _ => {
                return match op {
                    Operator::Eq => Ok(false),
                    Operator::Ne => Ok(true),
                    _ => Err(RuntimeError::InvalidOperation(format!(
                        "Cannot compare {} and {} with {}",
                        left.type_name(),
                        right.type_name(),
                        op
                    ))),
                };
            }
        },
    };

    // NaN orders as nothing: only != holds
    let Some(ordering) = ordering else {
        return Ok(*op == Operator::Ne);
    };

    match op {
        Operator::Eq => Ok(ordering == Ordering::Equal),
        Operator::Ne => Ok(ordering != Ordering::Equal),
        Operator::Gt => Ok(ordering == Ordering::Greater),
        Operator::Ge => Ok(ordering != Ordering::Less),
        Operator::Lt => Ok(ordering == Ordering::Less),
        Operator::Le => Ok(ordering != Ordering::Greater),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "{} is not a comparison",
            op
        ))),
    }
}
