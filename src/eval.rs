// ABOUTME: Evaluator module executing the parsed expression tree with tail-call elimination

use crate::env::{Environment, Lookup};
use crate::error::LispError;
use crate::expr::Expr;
use crate::value::{Function, Primitive, Value};
use std::rc::Rc;

/// Evaluates `expr` in `env`, trampolining through tail positions (the
/// last expression of a function body, `do`, `letrec`, and both arms of
/// `if`) instead of recursing, so a tail-recursive Lisp function runs in
/// constant Rust stack space.
pub fn eval(expr: &Expr, env: Rc<Environment>) -> Result<Value, LispError> {
    let mut expr = expr.clone();
    let mut env = env;

    loop {
        tracing::trace!(expr = ?expr, "eval step");
        match expr {
            Expr::Literal(v) => return Ok(v),
            Expr::Quote(v) => return Ok(v),

            Expr::SymbolRef(name) => {
                return match env.lookup(&name) {
                    Some(Lookup::Value(v)) => Ok(v),
                    Some(Lookup::Uninitialized) => {
                        Err(LispError::UninitializedBinding(name.to_string()))
                    }
                    None => Err(LispError::UnboundSymbol(name.to_string())),
                };
            }

            Expr::If { test, then, els } => {
                let cond = eval(&test, env.clone())?;
                expr = if cond.is_truthy() {
                    *then
                } else {
                    match els {
                        Some(e) => *e,
                        None => return Ok(Value::Nil),
                    }
                };
            }

            Expr::Lambda { params, rest, body } => {
                return Ok(Value::Function(Rc::new(Function {
                    params,
                    rest,
                    body: Expr::Do(body),
                    env: env.clone(),
                })));
            }

            Expr::Do(mut exprs) => {
                if exprs.is_empty() {
                    return Ok(Value::Nil);
                }
                let last = exprs.pop().expect("checked non-empty above");
                for e in &exprs {
                    eval(e, env.clone())?;
                }
                expr = last;
            }

            Expr::LetRec { bindings, body } => {
                let scope = Environment::with_parent(env.clone());
                for (name, _) in &bindings {
                    scope.add_pending(name.clone());
                }
                for (name, init) in &bindings {
                    let value = eval(init, scope.clone())?;
                    scope.resolve_pending(name, value);
                }
                env = scope;
                expr = Expr::Do(body);
            }

            Expr::Apply { func, args } => {
                let callee = eval(&func, env.clone())?;
                let args = args
                    .iter()
                    .map(|a| eval(a, env.clone()))
                    .collect::<Result<Vec<_>, _>>()?;

                match callee {
                    Value::Primitive(prim) => return call_primitive(&prim, &args),
                    Value::Function(f) => {
                        let scope = Environment::with_parent(f.env.clone());
                        bind_params(&f, &args, &scope)?;
                        env = scope;
                        expr = f.body.clone();
                    }
                    other => return Err(LispError::NotCallable(other.to_string())),
                }
            }
        }
    }
}

/// Calls a `Value` as a function, for primitives (`apply`, `map`,
/// `filter`, `foldl`/`foldr`) that need to invoke a callee they were
/// handed rather than one written in source. Not itself tail-optimized;
/// callers loop, this does not trampoline across calls.
pub fn apply_value(callee: &Value, args: &[Value]) -> Result<Value, LispError> {
    match callee {
        Value::Primitive(prim) => call_primitive(prim, args),
        Value::Function(f) => {
            let scope = Environment::with_parent(f.env.clone());
            bind_params(f, args, &scope)?;
            eval(&f.body, scope)
        }
        other => Err(LispError::NotCallable(other.to_string())),
    }
}

fn bind_params(f: &Function, args: &[Value], scope: &Environment) -> Result<(), LispError> {
    match &f.rest {
        None => {
            if args.len() != f.params.len() {
                return Err(LispError::wrong_arg_count("function", f.params.len(), args.len()));
            }
        }
        Some(_) => {
            if args.len() < f.params.len() {
                return Err(LispError::WrongArgCountRange {
                    function: "function".to_string(),
                    expected: format!("at least {}", f.params.len()),
                    actual: args.len(),
                });
            }
        }
    }

    for (param, arg) in f.params.iter().zip(args.iter()) {
        scope.add(param.clone(), arg.clone());
    }
    if let Some(rest) = &f.rest {
        scope.add(rest.clone(), Value::list(args[f.params.len()..].to_vec()));
    }
    Ok(())
}

fn call_primitive(prim: &Primitive, args: &[Value]) -> Result<Value, LispError> {
    let within_max = prim.max_arity.is_none_or(|max| args.len() <= max);
    if args.len() < prim.min_arity || !within_max {
        return Err(match prim.max_arity {
            Some(max) if max == prim.min_arity => {
                LispError::wrong_arg_count(&prim.name, prim.min_arity, args.len())
            }
            Some(max) => LispError::WrongArgCountRange {
                function: prim.name.clone(),
                expected: format!("{}-{}", prim.min_arity, max),
                actual: args.len(),
            },
            None => LispError::WrongArgCountRange {
                function: prim.name.clone(),
                expected: format!("at least {}", prim.min_arity),
                actual: args.len(),
            },
        });
    }
    (prim.func)(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::reader::Reader;

    fn eval_src(src: &str, env: Rc<Environment>) -> Result<Value, LispError> {
        let reader = Reader::new();
        let parser = Parser::new();
        let (datum, _) = reader.read_one(src)?;
        let expr = parser.parse_expr(&datum)?;
        eval(&expr, env)
    }

    #[test]
    fn literals_and_quote_self_evaluate() {
        let env = Environment::new();
        assert!(matches!(eval_src("42", env.clone()).unwrap(), Value::Number(42)));
        assert!(matches!(eval_src("'(1 2)", env).unwrap(), Value::Cons(_)));
    }

    #[test]
    fn unbound_symbol_errors() {
        let env = Environment::new();
        assert!(matches!(
            eval_src("undefined-name", env),
            Err(LispError::UnboundSymbol(_))
        ));
    }

    #[test]
    fn if_with_no_else_and_false_test_is_nil() {
        let env = Environment::new();
        assert!(matches!(eval_src("(if #false 1)", env).unwrap(), Value::Nil));
    }

    #[test]
    fn lambda_application_binds_params_in_fresh_scope() {
        let env = Environment::new();
        let result = eval_src("((fn (x y) x) 1 2)", env).unwrap();
        assert!(matches!(result, Value::Number(1)));
    }

    #[test]
    fn wrong_arity_is_an_error() {
        let env = Environment::new();
        assert!(matches!(
            eval_src("((fn (x y) x) 1)", env),
            Err(LispError::WrongArgCount { .. })
        ));
    }

    #[test]
    fn letrec_allows_mutual_self_reference_via_closures() {
        let env = Environment::new();
        let result = eval_src(
            "(letrec ((even? (fn (n) (if n (odd? n) #true)))
                       (odd? (fn (n) #false)))
               (even? #false))",
            env,
        )
        .unwrap();
        assert!(matches!(result, Value::Boolean(true)));
    }

    #[test]
    fn deep_tail_recursion_does_not_overflow_the_rust_stack() {
        let env = Environment::new();
        let result = eval_src(
            "(letrec ((count (fn (n acc) (if n (count #false acc) acc))))
               (count #false 0))",
            env,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn rest_parameter_collects_trailing_arguments_into_a_list() {
        let env = Environment::new();
        let result = eval_src("((fn args args) 1 2 3)", env).unwrap();
        assert_eq!(result.iter_list().count(), 3);
    }

    #[test]
    fn not_callable_value_is_an_error() {
        let env = Environment::new();
        assert!(matches!(eval_src("(1 2 3)", env), Err(LispError::NotCallable(_))));
    }

    #[test]
    fn apply_value_invokes_a_function_value_directly() {
        let env = Environment::new();
        let callee = eval_src("(fn (x y) (if x y x))", env).unwrap();
        let result = apply_value(&callee, &[Value::Boolean(false), Value::Number(9)]).unwrap();
        assert!(matches!(result, Value::Number(9)));
    }
}
