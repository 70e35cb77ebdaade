// ABOUTME: Numeric comparison primitives: =, <, <=, >, >=

use super::{as_number, register_primitive};
use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;

fn compare(
    name: &str,
    args: &[Value],
    op: impl Fn(i64, i64) -> bool,
) -> Result<Value, LispError> {
    let a = as_number(name, &args[0])?;
    let b = as_number(name, &args[1])?;
    Ok(Value::Boolean(op(a, b)))
}

pub fn register(env: &Environment) {
    register_primitive(env, "=", 2, Some(2), |a| compare("=", a, |x, y| x == y));
    register_primitive(env, "<", 2, Some(2), |a| compare("<", a, |x, y| x < y));
    register_primitive(env, "<=", 2, Some(2), |a| compare("<=", a, |x, y| x <= y));
    register_primitive(env, ">", 2, Some(2), |a| compare(">", a, |x, y| x > y));
    register_primitive(env, ">=", 2, Some(2), |a| compare(">=", a, |x, y| x >= y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_numbers() {
        assert!(matches!(
            compare("<", &[Value::Number(1), Value::Number(2)], |a, b| a < b).unwrap(),
            Value::Boolean(true)
        ));
        assert!(matches!(
            compare("=", &[Value::Number(2), Value::Number(2)], |a, b| a == b).unwrap(),
            Value::Boolean(true)
        ));
    }

    #[test]
    fn non_number_is_a_type_error() {
        assert!(matches!(
            compare("<", &[Value::Boolean(true), Value::Number(2)], |a, b| a < b),
            Err(LispError::WrongArgType { .. })
        ));
    }
}
