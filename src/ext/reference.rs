// ABOUTME: Mutable boxed cell extension: ref, ref-get, ref-set, ref?

use crate::builtins::register_primitive;
use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

fn ref_new(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Reference(Rc::new(RefCell::new(args[0].clone()))))
}

fn ref_get(args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::Reference(cell) => Ok(cell.borrow().clone()),
        other => Err(LispError::wrong_arg_type("ref-get", "ref", other)),
    }
}

fn ref_set(args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::Reference(cell) => {
            *cell.borrow_mut() = args[1].clone();
            Ok(Value::Nil)
        }
        other => Err(LispError::wrong_arg_type("ref-set", "ref", other)),
    }
}

fn ref_p(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Boolean(matches!(args[0], Value::Reference(_))))
}

/// Registers `ref`, `ref-get`, `ref-set`, `ref?` on `env`. Not part of the
/// default primitive set wired by `Engine::new`; a host opts in explicitly.
pub fn register_reference_primitives(env: &Environment) {
    register_primitive(env, "ref", 1, Some(1), ref_new);
    register_primitive(env, "ref-get", 1, Some(1), ref_get);
    register_primitive(env, "ref-set", 2, Some(2), ref_set);
    register_primitive(env, "ref?", 1, Some(1), ref_p);
}
