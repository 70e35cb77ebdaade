// ABOUTME: Association-list-backed map extension: make-dict, get, update, set, dict?

use crate::builtins::register_primitive;
use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

fn is_key_kind(v: &Value) -> bool {
    matches!(
        v,
        Value::Number(_) | Value::String(_) | Value::Symbol(_) | Value::Boolean(_) | Value::Nil
    )
}

fn make_dict(args: &[Value]) -> Result<Value, LispError> {
    if !args[0].is_list_kind() {
        return Err(LispError::wrong_arg_type("make-dict", "list", &args[0]));
    }
    let mut entries = Vec::new();
    for entry in args[0].iter_list() {
        let parts: Vec<&Value> = entry.iter_list().collect();
        if parts.len() != 2 {
            return Err(LispError::MalformedList);
        }
        entries.push((parts[0].clone(), parts[1].clone()));
    }
    Ok(Value::Dict(Rc::new(RefCell::new(entries))))
}

fn dict_get(args: &[Value]) -> Result<Value, LispError> {
    let dict = as_dict("get", &args[0])?;
    if !is_key_kind(&args[1]) {
        return Err(LispError::wrong_arg_type("get", "atomic key", &args[1]));
    }
    let result = dict
        .borrow()
        .iter()
        .find(|(k, _)| k.eql_p(&args[1]))
        .map(|(_, v)| v.clone())
        .ok_or_else(|| LispError::RuntimeError(format!("key not found in dictionary: {}", args[1])));
    result
}

fn dict_update(args: &[Value]) -> Result<Value, LispError> {
    let dict = as_dict("update", &args[0])?;
    if !is_key_kind(&args[1]) {
        return Err(LispError::wrong_arg_type("update", "atomic key", &args[1]));
    }
    let mut entries: Vec<(Value, Value)> = dict.borrow().clone();
    match entries.iter_mut().find(|(k, _)| k.eql_p(&args[1])) {
        Some(entry) => entry.1 = args[2].clone(),
        None => entries.push((args[1].clone(), args[2].clone())),
    }
    Ok(Value::Dict(Rc::new(RefCell::new(entries))))
}

fn dict_set(args: &[Value]) -> Result<Value, LispError> {
    let dict = as_dict("set", &args[0])?;
    if !is_key_kind(&args[1]) {
        return Err(LispError::wrong_arg_type("set", "atomic key", &args[1]));
    }
    let mut entries = dict.borrow_mut();
    match entries.iter_mut().find(|(k, _)| k.eql_p(&args[1])) {
        Some(entry) => entry.1 = args[2].clone(),
        None => entries.push((args[1].clone(), args[2].clone())),
    }
    Ok(Value::Nil)
}

fn dict_p(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Boolean(matches!(args[0], Value::Dict(_))))
}

fn as_dict(function: &str, v: &Value) -> Result<Rc<RefCell<Vec<(Value, Value)>>>, LispError> {
    match v {
        Value::Dict(entries) => Ok(entries.clone()),
        other => Err(LispError::wrong_arg_type(function, "dict", other)),
    }
}

/// Registers `make-dict`, `get`, `update`, `set`, `dict?` on `env`. `update`
/// returns a new dict (functional update); `set` mutates in place. Not part
/// of the default primitive set wired by `Engine::new`; a host opts in
/// explicitly.
pub fn register_dict_primitives(env: &Environment) {
    register_primitive(env, "make-dict", 1, Some(1), make_dict);
    register_primitive(env, "get", 2, Some(2), dict_get);
    register_primitive(env, "update", 3, Some(3), dict_update);
    register_primitive(env, "set", 3, Some(3), dict_set);
    register_primitive(env, "dict?", 1, Some(1), dict_p);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let entries = Value::list(vec![Value::list(vec![Value::symbol("a"), Value::Number(1)])]);
        make_dict(&[entries]).unwrap()
    }

    #[test]
    fn get_finds_an_existing_key() {
        let dict = sample();
        let result = dict_get(&[dict, Value::symbol("a")]).unwrap();
        assert!(matches!(result, Value::Number(1)));
    }

    #[test]
    fn get_missing_key_is_an_error() {
        let dict = sample();
        assert!(dict_get(&[dict, Value::symbol("missing")]).is_err());
    }

    #[test]
    fn update_is_functional_and_leaves_the_original_untouched() {
        let dict = sample();
        let updated = dict_update(&[dict.clone(), Value::symbol("a"), Value::Number(2)]).unwrap();
        assert!(matches!(dict_get(&[dict, Value::symbol("a")]).unwrap(), Value::Number(1)));
        assert!(matches!(dict_get(&[updated, Value::symbol("a")]).unwrap(), Value::Number(2)));
    }

    #[test]
    fn set_mutates_the_dict_in_place() {
        let dict = sample();
        dict_set(&[dict.clone(), Value::symbol("a"), Value::Number(9)]).unwrap();
        assert!(matches!(dict_get(&[dict, Value::symbol("a")]).unwrap(), Value::Number(9)));
    }
}
