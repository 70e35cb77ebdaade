// ABOUTME: Primitives that don't fit a narrower category: apply, equality, printing

use super::register_primitive;
use crate::env::Environment;
use crate::error::LispError;
use crate::eval::apply_value;
use crate::value::Value;

fn apply(args: &[Value]) -> Result<Value, LispError> {
    if !args[1].is_list_kind() {
        return Err(LispError::wrong_arg_type("apply", "list", &args[1]));
    }
    let call_args: Vec<Value> = args[1].iter_list().cloned().collect();
    apply_value(&args[0], &call_args)
}

fn eq_p(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Boolean(args[0].eq_p(&args[1])))
}

fn eql_p(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Boolean(args[0].eql_p(&args[1])))
}

fn print(args: &[Value]) -> Result<Value, LispError> {
    println!("{}", args[0]);
    Ok(args[0].clone())
}

pub fn register(env: &Environment) {
    register_primitive(env, "apply", 2, Some(2), apply);
    register_primitive(env, "eq?", 2, Some(2), eq_p);
    register_primitive(env, "eql?", 2, Some(2), eql_p);
    register_primitive(env, "print", 1, Some(1), print);
}
