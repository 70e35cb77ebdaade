// ABOUTME: Host-facing façade wiring the reader, parser, evaluator, and environment together

use crate::builtins;
use crate::env::Environment;
use crate::error::{LispError, Quit};
use crate::eval;
use crate::expr::{Expr, TopLevel};
use crate::parser::{ParseMacroFn, Parser};
use crate::reader::{self, ReadMacroFn, Reader};
use crate::value::{Function, Primitive, Value};
use std::rc::Rc;

/// The embeddable interpreter. Owns a root environment pre-populated with
/// the mandatory and supplemental primitive sets, plus a `Reader`/`Parser`
/// pair a host can extend with its own macros.
pub struct Engine {
    root: Rc<Environment>,
    reader: Reader,
    parser: Parser,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let root = Environment::new();
        builtins::register_all(&root);
        root.add(Rc::from("true"), Value::Boolean(true));
        root.add(Rc::from("false"), Value::Boolean(false));
        root.add(Rc::from("empty"), Value::EmptyList);
        root.add(Rc::from("nil"), Value::Nil);
        Engine {
            root,
            reader: Reader::new(),
            parser: Parser::new(),
        }
    }

    /// Reads every top-level datum out of `text`, without parsing or
    /// evaluating it.
    pub fn read(&self, text: &str) -> Result<Vec<Value>, LispError> {
        self.reader.read_all(text)
    }

    /// Whether `text` has balanced top-level parens outside string
    /// literals, for a host accumulating multi-line input before calling
    /// `eval`.
    pub fn balance(&self, text: &str) -> Result<bool, LispError> {
        reader::balance(text)
    }

    /// Reads, parses, and evaluates every top-level form in `text` in
    /// order. Each form's result is reported through `emit` (`;; `-prefixed
    /// for errors) when `report` is set. A malformed read aborts the whole
    /// call; a single form's parse or evaluation error is reported and
    /// evaluation continues with the next form.
    pub fn eval(&self, text: &str, report: bool, emit: &mut dyn FnMut(&str)) -> Result<(), Quit> {
        let span = tracing::debug_span!("engine_eval");
        let _enter = span.enter();

        let datums = match self.read(text) {
            Ok(d) => d,
            Err(e) => {
                emit(&format!(";; {e}"));
                return Ok(());
            }
        };

        for datum in &datums {
            self.process_one_form(datum, report, emit)?;
        }
        Ok(())
    }

    fn process_one_form(
        &self,
        datum: &Value,
        report: bool,
        emit: &mut dyn FnMut(&str),
    ) -> Result<(), Quit> {
        let top = match self.parser.parse_top_level(datum) {
            Ok(top) => top,
            Err(e) => {
                emit(&format!(";; {e}"));
                return Ok(());
            }
        };

        let outcome = self.run_top_level(&top);
        match outcome {
            Ok(result) => {
                tracing::debug!(form = ?top, "processed top-level form");
                if report {
                    if let Some(v) = result {
                        emit(&v.to_string());
                    }
                }
            }
            Err(e) => {
                tracing::debug!(form = ?top, error = %e, "top-level form failed");
                emit(&format!(";; {e}"));
            }
        }
        Ok(())
    }

    fn run_top_level(&self, top: &TopLevel) -> Result<Option<Value>, LispError> {
        match top {
            TopLevel::Define { name, value } => {
                let v = eval::eval(value, self.root.clone())?;
                self.root.add(name.clone(), v);
                Ok(None)
            }
            TopLevel::Defun {
                name,
                params,
                rest,
                body,
            } => {
                let f = Value::Function(Rc::new(Function {
                    params: params.clone(),
                    rest: rest.clone(),
                    body: Expr::Do(body.clone()),
                    env: self.root.clone(),
                }));
                self.root.add(name.clone(), f);
                Ok(None)
            }
            TopLevel::TopExpression(expr) => eval::eval(expr, self.root.clone()).map(Some),
        }
    }

    /// Binds a host-provided value at top level, shadowing any existing
    /// binding of the same name.
    pub fn define_value(&self, name: &str, value: Value) {
        self.root.add(Rc::from(name), value);
    }

    /// Binds a host-provided native primitive at top level.
    pub fn define_primitive(
        &self,
        name: &str,
        min_arity: usize,
        max_arity: Option<usize>,
        func: impl Fn(&[Value]) -> Result<Value, LispError> + 'static,
    ) {
        self.root.add(
            Rc::from(name),
            Value::Primitive(Rc::new(Primitive {
                name: name.to_string(),
                min_arity,
                max_arity,
                func: Box::new(func),
            })),
        );
    }

    /// Registers a host-defined parse-time macro. Fails with
    /// `DuplicateMacro` if `name` is already a built-in form or a
    /// previously registered macro.
    pub fn register_parser_macro(&mut self, name: &str, transform: ParseMacroFn) -> Result<(), LispError> {
        self.parser.register_macro(name, transform)
    }

    /// Registers a host-defined read-time macro, invoked through
    /// `#(NAME datum*)` syntax.
    pub fn register_read_macro(&mut self, name: &str, transform: ReadMacroFn) -> Result<(), LispError> {
        self.reader.register_macro(name, transform)
    }

    /// Creates a fresh child scope of the root environment, for a host that
    /// wants to evaluate expressions with temporary local bindings.
    pub fn new_scope(&self) -> Rc<Environment> {
        Environment::with_parent(self.root.clone())
    }

    /// The root environment, for a host that needs direct access (e.g. to
    /// hand to `eval::eval` against a hand-built `Expr`).
    pub fn root(&self) -> Rc<Environment> {
        self.root.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &Engine, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        engine.eval(text, true, &mut |line| lines.push(line.to_string())).unwrap();
        lines
    }

    #[test]
    fn evaluates_and_reports_a_top_level_expression() {
        let engine = Engine::new();
        assert_eq!(run(&engine, "(+ 1 2 3)"), vec!["6"]);
    }

    #[test]
    fn define_binds_a_name_visible_to_later_forms() {
        let engine = Engine::new();
        assert_eq!(run(&engine, "(define x 10) (+ x 1)"), vec!["11"]);
    }

    #[test]
    fn defun_binds_a_callable_function() {
        let engine = Engine::new();
        assert_eq!(run(&engine, "(define (double n) (* n 2)) (double 21)"), vec!["42"]);
    }

    #[test]
    fn an_error_in_one_form_does_not_abort_the_rest() {
        let engine = Engine::new();
        let lines = run(&engine, "(+ 1 undefined-name) (+ 1 1)");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(";; "));
        assert_eq!(lines[1], "2");
    }

    #[test]
    fn host_can_define_a_native_primitive() {
        let engine = Engine::new();
        engine.define_primitive("triple", 1, Some(1), |args| match &args[0] {
            Value::Number(n) => Ok(Value::Number(n * 3)),
            other => Err(LispError::wrong_arg_type("triple", "number", other)),
        });
        assert_eq!(run(&engine, "(triple 4)"), vec!["12"]);
    }

    #[test]
    fn pre_bound_constants_are_available() {
        let engine = Engine::new();
        assert_eq!(run(&engine, "empty"), vec!["()"]);
        assert_eq!(run(&engine, "nil"), vec!["#nil"]);
        assert_eq!(run(&engine, "true"), vec!["#true"]);
    }

    #[test]
    fn balance_reports_unbalanced_input() {
        let engine = Engine::new();
        assert!(!engine.balance("(foo (bar)").unwrap());
        assert!(engine.balance("(foo (bar))").unwrap());
    }
}
