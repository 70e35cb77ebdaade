// ABOUTME: Arithmetic primitives: +, -, *

use super::{as_number, register_primitive};
use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;

/// Sums all arguments; `(+)` is `0`.
fn add(args: &[Value]) -> Result<Value, LispError> {
    let mut total: i64 = 0;
    for a in args {
        total = total
            .checked_add(as_number("+", a)?)
            .ok_or_else(|| LispError::RuntimeError("+: integer overflow".into()))?;
    }
    Ok(Value::Number(total))
}

/// `(- x)` negates; `(- x y ...)` subtracts the rest from `x`.
fn sub(args: &[Value]) -> Result<Value, LispError> {
    let first = as_number("-", &args[0])?;
    if args.len() == 1 {
        return first
            .checked_neg()
            .map(Value::Number)
            .ok_or_else(|| LispError::RuntimeError("-: integer overflow".into()));
    }
    let mut total = first;
    for a in &args[1..] {
        total = total
            .checked_sub(as_number("-", a)?)
            .ok_or_else(|| LispError::RuntimeError("-: integer overflow".into()))?;
    }
    Ok(Value::Number(total))
}

/// Multiplies all arguments; `(*)` is `1`.
fn mul(args: &[Value]) -> Result<Value, LispError> {
    let mut total: i64 = 1;
    for a in args {
        total = total
            .checked_mul(as_number("*", a)?)
            .ok_or_else(|| LispError::RuntimeError("*: integer overflow".into()))?;
    }
    Ok(Value::Number(total))
}

pub fn register(env: &Environment) {
    register_primitive(env, "+", 0, None, add);
    register_primitive(env, "-", 1, None, sub);
    register_primitive(env, "*", 0, None, mul);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sums_and_defaults_to_zero() {
        assert!(matches!(add(&[]).unwrap(), Value::Number(0)));
        assert!(matches!(
            add(&[Value::Number(1), Value::Number(2), Value::Number(3)]).unwrap(),
            Value::Number(6)
        ));
    }

    #[test]
    fn sub_with_one_arg_negates() {
        assert!(matches!(sub(&[Value::Number(5)]).unwrap(), Value::Number(-5)));
    }

    #[test]
    fn mul_overflow_is_a_runtime_error() {
        assert!(matches!(
            mul(&[Value::Number(i64::MAX), Value::Number(2)]),
            Err(LispError::RuntimeError(_))
        ));
    }
}
