//! Allow-listed functions of the expression language

use super::operators::{execute_binary_op, execute_compare, Number};
use crate::error::{Result, RuntimeError};
use vsptd_core::ast::Operator;
use vsptd_core::Value;

/// Every function an expression may call
pub const ALLOWED_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "acos", "atan", "sinh", "cosh", "tanh", "sqrt", "exp", "ln", "log",
    "strcat", "min", "max", "abs",
];

pub fn is_allowed_function(name: &str) -> bool {
    ALLOWED_FUNCTIONS.contains(&name)
}

/// Call an allow-listed function
pub(crate) fn call_function(name: &str, args: &[Value]) -> Result<Value> {
    match name {
        "sin" => math(name, args, f64::sin),
        "cos" => math(name, args, f64::cos),
        "tan" => math(name, args, f64::tan),
        "acos" => math(name, args, f64::acos),
        "atan" => math(name, args, f64::atan),
        "sinh" => math(name, args, f64::sinh),
        "cosh" => math(name, args, f64::cosh),
        "tanh" => math(name, args, f64::tanh),
        "sqrt" => math(name, args, f64::sqrt),
        "exp" => math(name, args, f64::exp),
        "ln" => math(name, args, f64::ln),
        "log" => math(name, args, f64::log10),
        "abs" => {
            let [arg] = args else {
                return Err(arity(name, "1", args.len()));
            };
            match Number::of(arg) {
                Some(Number::Int(i)) => Ok(i
                    .checked_abs()
                    .map(Value::Int)
                    .unwrap_or(Value::Float((i as f64).abs()))),
                Some(Number::Float(f)) => Ok(Value::Float(f.abs())),
                None => Err(not_a_number(name, arg)),
            }
        }
        "strcat" => {
            let [a, b] = args else {
                return Err(arity(name, "2", args.len()));
            };
            execute_binary_op(a, &Operator::Add, b)
        }
        "min" => extreme(name, args, Operator::Lt),
        "max" => extreme(name, args, Operator::Gt),
        _ => Err(RuntimeError::UnknownFunction(name.to_string())),
    }
}

fn math(name: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value> {
    let [arg] = args else {
        return Err(arity(name, "1", args.len()));
    };
    let x = Number::of(arg)
        .ok_or_else(|| not_a_number(name, arg))?
        .as_f64();

    let y = f(x);
    if x.is_finite() && !y.is_finite() {
        return Err(RuntimeError::InvalidValue(format!(
            "{}({}) is outside the function domain",
            name, x
        )));
    }
    Ok(Value::Float(y))
}

/// First argument that beats all others under `op`
fn extreme(name: &str, args: &[Value], op: Operator) -> Result<Value> {
    if args.len() < 2 {
        return Err(arity(name, "at least 2", args.len()));
    }
    let mut best = &args[0];
    for candidate in &args[1..] {
        if execute_compare(candidate, &op, best)? {
            best = candidate;
        }
    }
    Ok(best.clone())
}

fn arity(name: &str, expected: &str, actual: usize) -> RuntimeError {
    RuntimeError::TypeError(format!(
        "{}() takes {} arguments, {} given",
        name, expected, actual
    ))
}

fn not_a_number(name: &str, arg: &Value) -> RuntimeError {
    RuntimeError::TypeError(format!(
        "{}() needs a number, not {}",
        name,
        arg.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float(result: Result<Value>) -> f64 {
        match result {
            Ok(Value::Float(f)) => f,
            other => panic!("Expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_math_functions() {
        assert_eq!(float(call_function("sqrt", &[Value::Int(16)])), 4.0);
        assert_eq!(float(call_function("log", &[Value::Int(1000)])), 3.0);
        assert_eq!(float(call_function("ln", &[Value::Int(1)])), 0.0);
        assert_eq!(float(call_function("sin", &[Value::Int(0)])), 0.0);
    }

    #[test]
    fn test_domain_errors() {
        let err = call_function("sqrt", &[Value::Int(-1)]).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidValue(_)));
        let err = call_function("ln", &[Value::Int(0)]).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidValue(_)));
    }

    #[test]
    fn test_min_max_keep_kind() {
        let args = [Value::Int(3), Value::Float(1.5), Value::Int(7)];
        assert_eq!(call_function("min", &args).unwrap(), Value::Float(1.5));
        assert!(matches!(call_function("max", &args).unwrap(), Value::Int(7)));
        assert!(call_function("max", &[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_strcat_and_abs() {
        assert_eq!(
            call_function("strcat", &[Value::from("ab"), Value::from("c")]).unwrap(),
            Value::from("abc")
        );
        assert!(matches!(call_function("abs", &[Value::Int(-4)]).unwrap(), Value::Int(4)));
    }

    #[test]
    fn test_unknown_and_arity() {
        assert!(matches!(
            call_function("eval", &[]).unwrap_err(),
            RuntimeError::UnknownFunction(_)
        ));
        assert!(matches!(
            call_function("sin", &[]).unwrap_err(),
            RuntimeError::TypeError(_)
        ));
        assert!(is_allowed_function("strcat"));
        assert!(!is_allowed_function("STRCAT"));
    }
}
