// ABOUTME: Built-in primitive procedures bound into the global environment

use crate::env::Environment;
use crate::error::LispError;
use crate::value::{Primitive, Value};
use std::rc::Rc;

pub mod arithmetic;
pub mod comparison;
pub mod lists;
pub mod logic;
pub mod misc;
pub mod strings;
pub mod supplemental;
pub mod types;

pub fn register_all(env: &Environment) {
    arithmetic::register(env);
    comparison::register(env);
    logic::register(env);
    strings::register(env);
    lists::register(env);
    types::register(env);
    misc::register(env);
    supplemental::register(env);
}

/// Binds a native primitive under `name`, with arity enforced by the
/// evaluator before `func` ever runs.
pub(crate) fn register_primitive(
    env: &Environment,
    name: &str,
    min_arity: usize,
    max_arity: Option<usize>,
    func: impl Fn(&[Value]) -> Result<Value, LispError> + 'static,
) {
    env.add(
        Rc::from(name),
        Value::Primitive(Rc::new(Primitive {
            name: name.to_string(),
            min_arity,
            max_arity,
            func: Box::new(func),
        })),
    );
}

fn as_number(function: &str, v: &Value) -> Result<i64, LispError> {
    match v {
        Value::Number(n) => Ok(*n),
        other => Err(LispError::wrong_arg_type(function, "number", other)),
    }
}

fn as_string(function: &str, v: &Value) -> Result<Rc<str>, LispError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        other => Err(LispError::wrong_arg_type(function, "string", other)),
    }
}
