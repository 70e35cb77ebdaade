// ABOUTME: Error types for read, parse, and evaluation failures

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum LispError {
    #[error("read error: {0}")]
    ReadError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("{function}: expected {expected} argument{}, got {actual}", if *expected == 1 { "" } else { "s" })]
    WrongArgCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("{function}: expected {expected} arguments, got {actual}")]
    WrongArgCountRange {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual}")]
    WrongArgType {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("uninitialized binding: {0}")]
    UninitializedBinding(String),

    #[error("value is not callable: {0}")]
    NotCallable(String),

    #[error("index out of range: {index} (length {length})")]
    IndexOutOfRange { index: i64, length: usize },

    #[error("malformed list: tail is not list-kind")]
    MalformedList,

    #[error("macro already registered: {0}")]
    DuplicateMacro(String),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("runtime error: {0}")]
    RuntimeError(String),
}

impl LispError {
    pub fn wrong_arg_type(function: &str, expected: &str, actual: &crate::value::Value) -> Self {
        LispError::WrongArgType {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    pub fn wrong_arg_count(function: &str, expected: usize, actual: usize) -> Self {
        LispError::WrongArgCount {
            function: function.to_string(),
            expected,
            actual,
        }
    }
}

/// A host-initiated termination signal. Distinct from `LispError` so that
/// code matching on evaluation failures never accidentally swallows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quit;

impl fmt::Display for Quit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quit requested")
    }
}

impl std::error::Error for Quit {}
