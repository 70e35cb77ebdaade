// ABOUTME: Parser module turning S-expressions into the abstract expression tree

use crate::error::LispError;
use crate::expr::{Expr, TopLevel};
use crate::value::Value;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

pub type ParseMacroFn = Rc<dyn Fn(&[Value]) -> Result<Value, LispError>>;

/// Parses S-expressions into the abstract expression tree. Recognizes a
/// fixed set of special forms (`if`, `fn`, `quote`, `do`, `letrec`) and a
/// fixed set of built-in macros (`let`, `let*`, `and`, `or`, `funrec`,
/// `loop`) that expand to those forms, plus any host-registered macros.
pub struct Parser {
    macros: HashMap<String, ParseMacroFn>,
    gensym_counter: Cell<u64>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            macros: HashMap::new(),
            gensym_counter: Cell::new(0),
        }
    }

    /// Registers a host-defined parse-time macro. Built-in forms (`if`,
    /// `let`, `and`, ...) cannot be shadowed this way.
    pub fn register_macro(&mut self, name: &str, transform: ParseMacroFn) -> Result<(), LispError> {
        if self.macros.contains_key(name) {
            return Err(LispError::DuplicateMacro(name.to_string()));
        }
        self.macros.insert(name.to_string(), transform);
        Ok(())
    }

    fn gensym(&self, prefix: &str) -> Value {
        let n = self.gensym_counter.get();
        self.gensym_counter.set(n + 1);
        Value::Symbol(Rc::from(format!("#:{}{}", prefix, n)))
    }

    pub fn parse_top_level(&self, datum: &Value) -> Result<TopLevel, LispError> {
        if let Value::Cons(cell) = datum {
            if matches!(&cell.head, Value::Symbol(s) if s.as_ref() == "define") {
                let items: Vec<Value> = cell.tail.iter_list().cloned().collect();
                if items.is_empty() {
                    return Err(LispError::ParseError("define: missing target".into()));
                }
                return match &items[0] {
                    Value::Cons(_) => {
                        let (name, params, rest) = parse_lambda_list(&items[0])?;
                        let body = self.parse_body(&items[1..])?;
                        Ok(TopLevel::Defun {
                            name,
                            params,
                            rest,
                            body,
                        })
                    }
                    Value::Symbol(name) => {
                        if items.len() != 2 {
                            return Err(LispError::ParseError(
                                "define: expected exactly one value expression".into(),
                            ));
                        }
                        Ok(TopLevel::Define {
                            name: name.clone(),
                            value: self.parse_expr(&items[1])?,
                        })
                    }
                    other => Err(LispError::ParseError(format!(
                        "define: invalid target {other}"
                    ))),
                };
            }
        }

        Ok(TopLevel::TopExpression(self.parse_expr(datum)?))
    }

    pub fn parse_expr(&self, datum: &Value) -> Result<Expr, LispError> {
        match datum {
            Value::Number(_) | Value::String(_) | Value::Boolean(_) | Value::Nil => {
                Ok(Expr::Literal(datum.clone()))
            }
            Value::Symbol(name) => Ok(Expr::SymbolRef(name.clone())),
            Value::EmptyList => Err(LispError::ParseError(
                "cannot evaluate the empty list as an expression".into(),
            )),
            Value::Cons(cell) => {
                let args: Vec<Value> = cell.tail.iter_list().cloned().collect();
                self.parse_form(&cell.head, &args)
            }
            other => Err(LispError::ParseError(format!(
                "unexpected datum in expression position: {other}"
            ))),
        }
    }

    fn parse_form(&self, head: &Value, args: &[Value]) -> Result<Expr, LispError> {
        if let Value::Symbol(name) = head {
            match name.as_ref() {
                "if" => return self.parse_if(args),
                "fn" => return self.parse_fn(args),
                "quote" => return self.parse_quote(args),
                "do" => return self.parse_do(args),
                "letrec" => return self.parse_letrec(args),
                "let" => return self.parse_expr(&self.expand_let(args)?),
                "let*" => return self.parse_expr(&self.expand_let_star(args)?),
                "and" => return self.parse_expr(&self.expand_and(args)?),
                "or" => return self.parse_expr(&self.expand_or(args)?),
                "funrec" => return self.parse_expr(&self.expand_funrec(args)?),
                "loop" => return self.parse_expr(&self.expand_loop(args)?),
                _ => {
                    if let Some(expand) = self.macros.get(name.as_ref()) {
                        let expanded = expand(args)?;
                        return self.parse_expr(&expanded);
                    }
                }
            }
        }

        let func = self.parse_expr(head)?;
        let args = args
            .iter()
            .map(|a| self.parse_expr(a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expr::Apply {
            func: Box::new(func),
            args,
        })
    }

    fn parse_if(&self, args: &[Value]) -> Result<Expr, LispError> {
        if args.len() != 2 && args.len() != 3 {
            return Err(LispError::ParseError(
                "if: expected (if test then) or (if test then else)".into(),
            ));
        }
        Ok(Expr::If {
            test: Box::new(self.parse_expr(&args[0])?),
            then: Box::new(self.parse_expr(&args[1])?),
            els: args
                .get(2)
                .map(|e| self.parse_expr(e))
                .transpose()?
                .map(Box::new),
        })
    }

    fn parse_fn(&self, args: &[Value]) -> Result<Expr, LispError> {
        if args.is_empty() {
            return Err(LispError::ParseError("fn: missing parameter list".into()));
        }
        let (params, rest) = parse_params(&args[0])?;
        let body = self.parse_body(&args[1..])?;
        Ok(Expr::Lambda { params, rest, body })
    }

    fn parse_quote(&self, args: &[Value]) -> Result<Expr, LispError> {
        if args.len() != 1 {
            return Err(LispError::ParseError("quote: expected exactly 1 argument".into()));
        }
        Ok(Expr::Quote(args[0].clone()))
    }

    fn parse_do(&self, args: &[Value]) -> Result<Expr, LispError> {
        Ok(Expr::Do(self.parse_body(args)?))
    }

    fn parse_letrec(&self, args: &[Value]) -> Result<Expr, LispError> {
        if args.is_empty() {
            return Err(LispError::ParseError("letrec: missing binding list".into()));
        }
        let mut bindings = Vec::new();
        for binding in args[0].iter_list() {
            let parts: Vec<&Value> = binding.iter_list().collect();
            if parts.len() != 2 {
                return Err(LispError::ParseError(
                    "letrec: each binding must be (name expr)".into(),
                ));
            }
            let name = match parts[0] {
                Value::Symbol(s) => s.clone(),
                other => {
                    return Err(LispError::ParseError(format!(
                        "letrec: expected symbol, got {other}"
                    )))
                }
            };
            bindings.push((name, self.parse_expr(parts[1])?));
        }
        let body = self.parse_body(&args[1..])?;
        Ok(Expr::LetRec { bindings, body })
    }

    fn parse_body(&self, forms: &[Value]) -> Result<Vec<Expr>, LispError> {
        if forms.is_empty() {
            return Err(LispError::ParseError("expected at least one body expression".into()));
        }
        forms.iter().map(|f| self.parse_expr(f)).collect()
    }

    /// `(let ((x e) ...) body...)` => `((fn (x ...) body...) e ...)`
    fn expand_let(&self, args: &[Value]) -> Result<Value, LispError> {
        if args.is_empty() {
            return Err(LispError::ParseError("let: missing binding list".into()));
        }
        let mut names = Vec::new();
        let mut inits = Vec::new();
        for binding in args[0].iter_list() {
            let parts: Vec<&Value> = binding.iter_list().collect();
            if parts.len() != 2 {
                return Err(LispError::ParseError("let: each binding must be (name expr)".into()));
            }
            names.push(parts[0].clone());
            inits.push(parts[1].clone());
        }
        let lambda = Value::list(
            std::iter::once(Value::symbol("fn"))
                .chain(std::iter::once(Value::list(names)))
                .chain(args[1..].iter().cloned()),
        );
        Ok(Value::list(std::iter::once(lambda).chain(inits)))
    }

    /// `(let* () body...)` => `(do body...)`; otherwise peels one binding
    /// into a `let` and recurses on the rest.
    fn expand_let_star(&self, args: &[Value]) -> Result<Value, LispError> {
        if args.is_empty() {
            return Err(LispError::ParseError("let*: missing binding list".into()));
        }
        let bindings: Vec<Value> = args[0].iter_list().cloned().collect();
        self.expand_let_star_rec(&bindings, &args[1..])
    }

    fn expand_let_star_rec(&self, bindings: &[Value], body: &[Value]) -> Result<Value, LispError> {
        match bindings.split_first() {
            None => Ok(Value::list(
                std::iter::once(Value::symbol("do")).chain(body.iter().cloned()),
            )),
            Some((first, rest)) => {
                let inner = self.expand_let_star_rec(rest, body)?;
                Ok(Value::list(vec![
                    Value::symbol("let"),
                    Value::list(vec![first.clone()]),
                    inner,
                ]))
            }
        }
    }

    /// `(and)` => `#true`; `(and e)` => `e`; otherwise binds the first
    /// value under a fresh name and branches on it, to evaluate it once.
    fn expand_and(&self, args: &[Value]) -> Result<Value, LispError> {
        match args {
            [] => Ok(Value::Boolean(true)),
            [only] => Ok(only.clone()),
            [first, rest @ ..] => {
                let g = self.gensym("and");
                let inner = self.expand_and(rest)?;
                Ok(Value::list(vec![
                    Value::symbol("let"),
                    Value::list(vec![Value::list(vec![g.clone(), first.clone()])]),
                    Value::list(vec![Value::symbol("if"), g.clone(), inner, g]),
                ]))
            }
        }
    }

    /// `(or)` => `#false`; `(or e)` => `e`; otherwise binds the first value
    /// under a fresh name and branches on it, to evaluate it once.
    fn expand_or(&self, args: &[Value]) -> Result<Value, LispError> {
        match args {
            [] => Ok(Value::Boolean(false)),
            [only] => Ok(only.clone()),
            [first, rest @ ..] => {
                let g = self.gensym("or");
                let inner = self.expand_or(rest)?;
                Ok(Value::list(vec![
                    Value::symbol("let"),
                    Value::list(vec![Value::list(vec![g.clone(), first.clone()])]),
                    Value::list(vec![Value::symbol("if"), g.clone(), g, inner]),
                ]))
            }
        }
    }

    /// `(funrec name (params...) body...)` =>
    /// `(letrec ((name (fn (params...) body...))) name)`
    fn expand_funrec(&self, args: &[Value]) -> Result<Value, LispError> {
        if args.len() < 2 {
            return Err(LispError::ParseError(
                "funrec: expected (funrec name (params...) body...)".into(),
            ));
        }
        let name = args[0].clone();
        let params = args[1].clone();
        let lambda = Value::list(
            std::iter::once(Value::symbol("fn"))
                .chain(std::iter::once(params))
                .chain(args[2..].iter().cloned()),
        );
        Ok(Value::list(vec![
            Value::symbol("letrec"),
            Value::list(vec![Value::list(vec![name.clone(), lambda])]),
            name,
        ]))
    }

    /// `(loop name ((param init)...) body...)` =>
    /// `((funrec name (param...) body...) init...)`
    fn expand_loop(&self, args: &[Value]) -> Result<Value, LispError> {
        if args.len() < 2 {
            return Err(LispError::ParseError(
                "loop: expected (loop name ((param init)...) body...)".into(),
            ));
        }
        let name = args[0].clone();
        let mut params = Vec::new();
        let mut inits = Vec::new();
        for binding in args[1].iter_list() {
            let parts: Vec<&Value> = binding.iter_list().collect();
            if parts.len() != 2 {
                return Err(LispError::ParseError("loop: each binding must be (param init)".into()));
            }
            params.push(parts[0].clone());
            inits.push(parts[1].clone());
        }
        let funrec = Value::list(
            std::iter::once(Value::symbol("funrec"))
                .chain(std::iter::once(name))
                .chain(std::iter::once(Value::list(params)))
                .chain(args[2..].iter().cloned()),
        );
        Ok(Value::list(std::iter::once(funrec).chain(inits)))
    }
}

fn parse_params(datum: &Value) -> Result<(Vec<Rc<str>>, Option<Rc<str>>), LispError> {
    let mut params = Vec::new();
    let mut cursor = datum;
    loop {
        match cursor {
            Value::EmptyList => return Ok((params, None)),
            Value::Cons(cell) => {
                match &cell.head {
                    Value::Symbol(s) => params.push(s.clone()),
                    other => {
                        return Err(LispError::ParseError(format!(
                            "expected parameter symbol, got {other}"
                        )))
                    }
                }
                cursor = &cell.tail;
            }
            Value::Symbol(rest) => return Ok((params, Some(rest.clone()))),
            other => {
                return Err(LispError::ParseError(format!(
                    "malformed parameter list: {other}"
                )))
            }
        }
    }
}

fn parse_lambda_list(datum: &Value) -> Result<(Rc<str>, Vec<Rc<str>>, Option<Rc<str>>), LispError> {
    match datum {
        Value::Cons(cell) => {
            let name = match &cell.head {
                Value::Symbol(s) => s.clone(),
                other => {
                    return Err(LispError::ParseError(format!(
                        "define: expected function name symbol, got {other}"
                    )))
                }
            };
            let (params, rest) = parse_params(&cell.tail)?;
            Ok((name, params, rest))
        }
        other => Err(LispError::ParseError(format!(
            "define: expected (name params...), got {other}"
        ))),
    }
}
