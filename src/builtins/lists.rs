// ABOUTME: List primitives built on cons cells: cons, append, reverse, first, rest, map, filter, fold

use super::{as_number, register_primitive};
use crate::env::Environment;
use crate::error::LispError;
use crate::eval::apply_value;
use crate::value::Value;

fn cons(args: &[Value]) -> Result<Value, LispError> {
    Value::cons(args[0].clone(), args[1].clone())
}

fn append(args: &[Value]) -> Result<Value, LispError> {
    let mut items = Vec::new();
    for a in args {
        if !a.is_list_kind() {
            return Err(LispError::wrong_arg_type("append", "list", a));
        }
        items.extend(a.iter_list().cloned());
    }
    Ok(Value::list(items))
}

fn reverse(args: &[Value]) -> Result<Value, LispError> {
    if !args[0].is_list_kind() {
        return Err(LispError::wrong_arg_type("reverse", "list", &args[0]));
    }
    let mut items: Vec<Value> = args[0].iter_list().cloned().collect();
    items.reverse();
    Ok(Value::list(items))
}

fn first(args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::Cons(cell) => Ok(cell.head.clone()),
        other => Err(LispError::wrong_arg_type("first", "non-empty list", other)),
    }
}

fn rest(args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::Cons(cell) => Ok(cell.tail.clone()),
        other => Err(LispError::wrong_arg_type("rest", "non-empty list", other)),
    }
}

fn list(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::list(args.to_vec()))
}

fn length(args: &[Value]) -> Result<Value, LispError> {
    if !args[0].is_list_kind() {
        return Err(LispError::wrong_arg_type("length", "list", &args[0]));
    }
    Ok(Value::Number(args[0].iter_list().count() as i64))
}

fn nth(args: &[Value]) -> Result<Value, LispError> {
    if !args[0].is_list_kind() {
        return Err(LispError::wrong_arg_type("nth", "list", &args[0]));
    }
    let index = as_number("nth", &args[1])?;
    let items: Vec<&Value> = args[0].iter_list().collect();
    if index < 0 || index as usize >= items.len() {
        return Err(LispError::IndexOutOfRange {
            index,
            length: items.len(),
        });
    }
    Ok(items[index as usize].clone())
}

fn map(args: &[Value]) -> Result<Value, LispError> {
    if !args[1].is_list_kind() {
        return Err(LispError::wrong_arg_type("map", "list", &args[1]));
    }
    let mapped: Result<Vec<Value>, LispError> = args[1]
        .iter_list()
        .map(|item| apply_value(&args[0], std::slice::from_ref(item)))
        .collect();
    Ok(Value::list(mapped?))
}

fn filter(args: &[Value]) -> Result<Value, LispError> {
    if !args[1].is_list_kind() {
        return Err(LispError::wrong_arg_type("filter", "list", &args[1]));
    }
    let mut kept = Vec::new();
    for item in args[1].iter_list() {
        if apply_value(&args[0], std::slice::from_ref(item))?.is_truthy() {
            kept.push(item.clone());
        }
    }
    Ok(Value::list(kept))
}

/// `(foldr f init (a b c))` => `(f a (f b (f c init)))`
fn foldr(args: &[Value]) -> Result<Value, LispError> {
    if !args[2].is_list_kind() {
        return Err(LispError::wrong_arg_type("foldr", "list", &args[2]));
    }
    let items: Vec<&Value> = args[2].iter_list().collect();
    let mut acc = args[1].clone();
    for item in items.into_iter().rev() {
        acc = apply_value(&args[0], &[item.clone(), acc])?;
    }
    Ok(acc)
}

/// `(foldl f init (a b c))` => `(f (f (f init a) b) c)`
fn foldl(args: &[Value]) -> Result<Value, LispError> {
    if !args[2].is_list_kind() {
        return Err(LispError::wrong_arg_type("foldl", "list", &args[2]));
    }
    let mut acc = args[1].clone();
    for item in args[2].iter_list() {
        acc = apply_value(&args[0], &[acc, item.clone()])?;
    }
    Ok(acc)
}

pub fn register(env: &Environment) {
    register_primitive(env, "cons", 2, Some(2), cons);
    register_primitive(env, "append", 0, None, append);
    register_primitive(env, "reverse", 1, Some(1), reverse);
    register_primitive(env, "first", 1, Some(1), first);
    register_primitive(env, "rest", 1, Some(1), rest);
    register_primitive(env, "list", 0, None, list);
    register_primitive(env, "length", 1, Some(1), length);
    register_primitive(env, "nth", 2, Some(2), nth);
    register_primitive(env, "map", 2, Some(2), map);
    register_primitive(env, "filter", 2, Some(2), filter);
    register_primitive(env, "foldr", 3, Some(3), foldr);
    register_primitive(env, "foldl", 3, Some(3), foldl);
}
