//! Binary arithmetic operator execution

use super::Number;
use crate::error::{Result, RuntimeError};
use vsptd_core::ast::Operator;
use vsptd_core::Value;

/// Execute an arithmetic operation.
///
/// Integers stay integers for `+ - * %` and for `**` with a non-negative
/// exponent, and turn into floats on overflow. `/` always divides as floats.
pub(crate) fn execute_binary_op(left: &Value, op: &Operator, right: &Value) -> Result<Value> {
    if !op.is_arithmetic() {
        return Err(invalid(left, op, right));
    }
    if let (Value::Str(l), Operator::Add, Value::Str(r)) = (left, op, right) {
        return Ok(Value::Str(format!("{}{}", l, r)));
    }

    let (Some(l), Some(r)) = (Number::of(left), Number::of(right)) else {
        return Err(invalid(left, op, right));
    };

    let result = match (l, r) {
        (Number::Int(l), Number::Int(r)) => int_op(l, op, r),
        _ => float_op(l.as_f64(), op, r.as_f64()),
    };
    result.map_err(|e| match e {
        RuntimeError::InvalidOperation(_) => invalid(left, op, right),
        other => other,
    })
}

fn int_op(l: i64, op: &Operator, r: i64) -> Result<Value> {
    let checked = match op {
        Operator::Add => l.checked_add(r),
        Operator::Sub => l.checked_sub(r),
        Operator::Mul => l.checked_mul(r),
        Operator::Div => return float_op(l as f64, op, r as f64),
        Operator::Mod => {
            if r == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            l.checked_rem(r).map(|m| if m != 0 && (m < 0) != (r < 0) { m + r } else { m })
        }
        Operator::Pow => {
            if r < 0 {
                return float_op(l as f64, op, r as f64);
            }
            u32::try_from(r).ok().and_then(|exp| l.checked_pow(exp))
        }
        _ => return Err(RuntimeError::InvalidOperation(op.to_string())),
    };

    match checked {
        Some(v) => Ok(Value::Int(v)),
        None => float_op(l as f64, op, r as f64),
    }
}

fn float_op(l: f64, op: &Operator, r: f64) -> Result<Value> {
    let result = match op {
        Operator::Add => l + r,
        Operator::Sub => l - r,
        Operator::Mul => l * r,
        Operator::Div => {
            if r == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            l / r
        }
        Operator::Mod => {
            if r == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            let m = l % r;
            if m != 0.0 && (m < 0.0) != (r < 0.0) {
                m + r
            } else {
                m
            }
        }
        Operator::Pow => {
            if l == 0.0 && r < 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            l.powf(r)
        }
        _ => return Err(RuntimeError::InvalidOperation(op.to_string())),
    };
    if !result.is_finite() && l.is_finite() && r.is_finite() {
        return Err(RuntimeError::InvalidValue(format!(
            "{} {} {} has no finite result",
            l, op, r
        )));
    }
    Ok(Value::Float(result))
}

fn invalid(left: &Value, op: &Operator, right: &Value) -> RuntimeError {
    RuntimeError::InvalidOperation(format!(
        "Cannot apply {} to {} and {}",
        op,
        left.type_name(),
        right.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(l: Value, op: Operator, r: Value) -> Result<Value> {
        execute_binary_op(&l, &op, &r)
    }

    #[test]
    fn test_int_arithmetic_stays_int() {
        assert!(matches!(eval(Value::Int(2), Operator::Add, Value::Int(3)), Ok(Value::Int(5))));
        assert!(matches!(eval(Value::Int(7), Operator::Mul, Value::Int(6)), Ok(Value::Int(42))));
        assert!(matches!(eval(Value::Int(2), Operator::Pow, Value::Int(10)), Ok(Value::Int(1024))));
    }

    #[test]
    fn test_true_division() {
        assert!(matches!(eval(Value::Int(7), Operator::Div, Value::Int(2)), Ok(Value::Float(f)) if f == 3.5));
        assert!(matches!(eval(Value::Int(4), Operator::Div, Value::Int(2)), Ok(Value::Float(f)) if f == 2.0));
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert!(matches!(eval(Value::Int(-7), Operator::Mod, Value::Int(3)), Ok(Value::Int(2))));
        assert!(matches!(eval(Value::Int(7), Operator::Mod, Value::Int(-3)), Ok(Value::Int(-2))));
    }

    #[test]
    fn test_overflow_turns_float() {
        let result = eval(Value::Int(i64::MAX), Operator::Add, Value::Int(1)).unwrap();
        assert!(matches!(result, Value::Float(_)));
    }

    #[test]
    fn test_negative_exponent() {
        assert!(matches!(eval(Value::Int(2), Operator::Pow, Value::Int(-1)), Ok(Value::Float(f)) if f == 0.5));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(eval(Value::Int(1), Operator::Div, Value::Int(0)), Err(RuntimeError::DivisionByZero)));
        assert!(matches!(eval(Value::Float(1.0), Operator::Mod, Value::Float(0.0)), Err(RuntimeError::DivisionByZero)));
        assert!(matches!(eval(Value::Int(0), Operator::Pow, Value::Int(-1)), Err(RuntimeError::DivisionByZero)));
    }

    #[test]
    fn test_float_overflow_is_value_error() {
        assert!(matches!(
            eval(Value::Float(1e308), Operator::Mul, Value::Int(10)),
            Err(RuntimeError::InvalidValue(_))
        ));
        assert!(matches!(
            eval(Value::Int(10), Operator::Pow, Value::Int(400)),
            Err(RuntimeError::InvalidValue(_))
        ));
        assert!(matches!(
            eval(Value::Int(-8), Operator::Pow, Value::Float(0.5)),
            Err(RuntimeError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_non_arithmetic_operator_rejected() {
        assert!(matches!(
            eval(Value::Int(1), Operator::And, Value::Int(1)),
            Err(RuntimeError::InvalidOperation(_))
        ));
        assert!(matches!(
            eval(Value::Int(1), Operator::Lt, Value::Int(2)),
            Err(RuntimeError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_string_concat_and_mismatch() {
        assert!(matches!(
            eval(Value::from("ab"), Operator::Add, Value::from("cd")),
            Ok(Value::Str(s)) if s == "abcd"
        ));
        assert!(matches!(
            eval(Value::from("ab"), Operator::Add, Value::Int(1)),
            Err(RuntimeError::InvalidOperation(_))
        ));
    }
}
