// ABOUTME: End-to-end pipeline tests exercising the reader, parser, evaluator, and environment together

use mini_lisp_engine::value::Value;
use mini_lisp_engine::Engine;

fn run(engine: &Engine, text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    engine
        .eval(text, true, &mut |line| lines.push(line.to_string()))
        .unwrap();
    lines
}

fn run_one(engine: &Engine, text: &str) -> String {
    let mut lines = run(engine, text);
    assert_eq!(lines.len(), 1, "expected exactly one reported result, got {lines:?}");
    lines.pop().unwrap()
}

#[test]
fn factorial_via_tail_recursive_accumulator() {
    let engine = Engine::new();
    run(
        &engine,
        "(define (fact n) (letrec ((go (fn (n acc) (if n (go (- n 1) (* n acc)) acc))))
           (go n 1)))",
    );
    assert_eq!(run_one(&engine, "(fact 10)"), "3628800");
}

#[test]
fn mutual_recursion_via_letrec_does_not_overflow_the_stack() {
    let engine = Engine::new();
    let result = run_one(
        &engine,
        "(letrec ((even? (fn (n) (if (= n 0) #true (odd? (- n 1)))))
                   (odd? (fn (n) (if (= n 0) #false (even? (- n 1))))))
           (even? 1000))",
    );
    assert_eq!(result, "#true");
}

#[test]
fn tail_calls_run_in_constant_stack_space() {
    let engine = Engine::new();
    let result = run_one(
        &engine,
        "(letrec ((ping (fn (n) (if (= n 0) 'done (pong (- n 1)))))
                   (pong (fn (n) (if (= n 0) 'done (ping (- n 1))))))
           (ping 1000000))",
    );
    assert_eq!(result, "done");
}

#[test]
fn let_shadows_while_let_star_sees_earlier_bindings() {
    let engine = Engine::new();
    assert_eq!(run_one(&engine, "(let ((x 1) (x 2)) x)"), "2");
    assert_eq!(run_one(&engine, "(let* ((x 1) (y (+ x 1))) y)"), "2");
}

#[test]
fn and_or_short_circuit_and_return_the_deciding_value() {
    let engine = Engine::new();
    assert_eq!(run_one(&engine, "(and 1 2 3)"), "3");
    assert_eq!(run_one(&engine, "(and 1 #false 3)"), "#false");
    assert_eq!(run_one(&engine, "(or #false 0 \"\" 7)"), "7");
    assert_eq!(run_one(&engine, "(or #false 0 \"\")"), "\"\"");
}

#[test]
fn or_does_not_evaluate_later_clauses_once_satisfied() {
    let engine = Engine::new();
    let result = run_one(&engine, "(or 1 undefined-name)");
    assert_eq!(result, "1");
}

#[test]
fn eq_is_identity_eql_is_structural() {
    let engine = Engine::new();
    assert_eq!(run_one(&engine, "(eq? '(1 2) '(1 2))"), "#false");
    assert_eq!(run_one(&engine, "(eql? '(1 2) '(1 2))"), "#true");
    assert_eq!(run_one(&engine, "(let ((x '(1 2))) (eq? x x))"), "#true");
}

#[test]
fn quote_is_a_fixed_point() {
    let engine = Engine::new();
    assert_eq!(run_one(&engine, "'(1 2 3)"), "(1 2 3)");
    assert_eq!(run_one(&engine, "''a"), "(quote a)");
}

#[test]
fn reader_and_printer_round_trip_printed_forms() {
    let engine = Engine::new();
    assert_eq!(run_one(&engine, "42"), "42");
    assert_eq!(run_one(&engine, "\"hi there\""), "\"hi there\"");
    assert_eq!(run_one(&engine, "#true"), "#true");
    assert_eq!(run_one(&engine, "()"), "()");
}

#[test]
fn closures_capture_their_defining_environment() {
    let engine = Engine::new();
    run(&engine, "(define (make-adder n) (fn (x) (+ n x)))");
    run(&engine, "(define add5 (make-adder 5))");
    assert_eq!(run_one(&engine, "(add5 10)"), "15");
}

#[test]
fn funrec_and_loop_desugar_to_working_self_recursion() {
    let engine = Engine::new();
    let result = run_one(
        &engine,
        "(loop sum-to ((n 10) (acc 0)) (if (= n 0) acc (sum-to (- n 1) (+ acc n))))",
    );
    assert_eq!(result, "55");
}

#[test]
fn higher_order_list_primitives_compose() {
    let engine = Engine::new();
    let result = run_one(
        &engine,
        "(foldl + 0 (filter (fn (x) (> x 2)) (map (fn (x) (* x 2)) (list 1 2 3 4))))",
    );
    assert_eq!(result, "18");
}

#[test]
fn parse_macro_confluence_is_overridable_per_host() {
    let mut engine = Engine::new();
    engine
        .register_parser_macro(
            "unless",
            std::rc::Rc::new(|args: &[Value]| {
                Ok(Value::list(vec![
                    Value::symbol("if"),
                    args[0].clone(),
                    Value::Boolean(false),
                    args[1].clone(),
                ]))
            }),
        )
        .unwrap();
    assert_eq!(run_one(&engine, "(unless #false 42)"), "42");
}

#[test]
fn letrec_referencing_its_own_binding_before_initialization_errors() {
    let engine = Engine::new();
    let lines = run(&engine, "(letrec ((x (+ x 1))) x)");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(";; "));
}

#[test]
fn environment_shadowing_is_local_to_the_inner_scope() {
    let engine = Engine::new();
    run(&engine, "(define x 10)");
    assert_eq!(run_one(&engine, "(let ((x 20)) (+ x 5))"), "25");
    assert_eq!(run_one(&engine, "x"), "10");
}

#[test]
fn supplemental_primitives_work_end_to_end() {
    let engine = Engine::new();
    assert_eq!(run_one(&engine, "(string-split \"a,b,c\" \",\")"), "(\"a\" \"b\" \"c\")");
    assert_eq!(run_one(&engine, "(symbol->string 'hello)"), "\"hello\"");
    assert_eq!(run_one(&engine, "(last (list 1 2 3))"), "3");
    assert_eq!(run_one(&engine, "(assert #true)"), "#nil");
}

#[test]
fn opt_in_reference_and_dict_extensions_are_absent_until_registered() {
    let engine = Engine::new();
    let lines = run(&engine, "(ref 1)");
    assert!(lines[0].starts_with(";; "));

    mini_lisp_engine::ext::reference::register_reference_primitives(&engine.root());
    let cell = run_one(&engine, "(ref 1)");
    assert!(cell.starts_with("#(ref"));
}
