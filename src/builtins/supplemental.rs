// ABOUTME: Primitives recovered from the original Mini-Lisp that the distilled set dropped

use super::{as_string, register_primitive};
use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;

fn split(args: &[Value]) -> Result<Value, LispError> {
    let s = as_string("string-split", &args[0])?;
    let sep = as_string("string-split", &args[1])?;
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        s.split(sep.as_ref()).map(Value::string).collect()
    };
    Ok(Value::list(parts))
}

/// Index of the first occurrence of `needle` in `haystack`, or `#nil` if
/// absent, counted in characters rather than bytes.
fn index(args: &[Value]) -> Result<Value, LispError> {
    let haystack = as_string("string-index", &args[0])?;
    let needle = as_string("string-index", &args[1])?;
    match haystack.find(needle.as_ref()) {
        Some(byte_pos) => Ok(Value::Number(haystack[..byte_pos].chars().count() as i64)),
        None => Ok(Value::Nil),
    }
}

fn symbol_to_string(args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::Symbol(s) => Ok(Value::string(s.to_string())),
        other => Err(LispError::wrong_arg_type("symbol->string", "symbol", other)),
    }
}

fn string_to_symbol(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::symbol(&as_string("string->symbol", &args[0])?))
}

fn last(args: &[Value]) -> Result<Value, LispError> {
    match &args[0] {
        Value::Cons(_) => Ok(args[0]
            .iter_list()
            .last()
            .cloned()
            .expect("checked non-empty above")),
        other => Err(LispError::wrong_arg_type("last", "non-empty list", other)),
    }
}

fn assert(args: &[Value]) -> Result<Value, LispError> {
    if args[0].is_truthy() {
        return Ok(Value::Nil);
    }
    let message = match args.get(1) {
        Some(m) => as_string("assert", m)?.to_string(),
        None => "assertion failed".to_string(),
    };
    Err(LispError::RuntimeError(message))
}

pub fn register(env: &Environment) {
    register_primitive(env, "string-split", 2, Some(2), split);
    register_primitive(env, "string-index", 2, Some(2), index);
    register_primitive(env, "symbol->string", 1, Some(1), symbol_to_string);
    register_primitive(env, "string->symbol", 1, Some(1), string_to_symbol);
    register_primitive(env, "last", 1, Some(1), last);
    register_primitive(env, "assert", 1, Some(2), assert);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_divides_on_delimiter() {
        let result = split(&[Value::string("a,b,c"), Value::string(",")]).unwrap();
        assert_eq!(result.iter_list().count(), 3);
    }

    #[test]
    fn index_reports_nil_when_absent() {
        assert!(matches!(
            index(&[Value::string("hello"), Value::string("z")]).unwrap(),
            Value::Nil
        ));
    }

    #[test]
    fn symbol_string_round_trip() {
        let sym = Value::symbol("Foo");
        let s = symbol_to_string(&[sym]).unwrap();
        assert!(matches!(&s, Value::String(text) if &**text == "foo"));
        let back = string_to_symbol(&[s]).unwrap();
        assert!(matches!(back, Value::Symbol(name) if &*name == "foo"));
    }

    #[test]
    fn last_returns_final_element() {
        let list = Value::list(vec![Value::Number(1), Value::Number(2)]);
        assert!(matches!(last(&[list]).unwrap(), Value::Number(2)));
    }

    #[test]
    fn assert_errors_with_custom_message() {
        let result = assert(&[Value::Boolean(false), Value::string("nope")]);
        assert!(matches!(result, Err(LispError::RuntimeError(msg)) if msg == "nope"));
    }

    #[test]
    fn assert_passes_truthy_value() {
        assert!(matches!(assert(&[Value::Number(1)]).unwrap(), Value::Nil));
    }
}
