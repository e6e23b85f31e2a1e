use tamarin::environment::Environment;
use tamarin::evaluator::eval_program;
use tamarin::parser::expression::Expression;
use tamarin::parser::parse;
use tamarin::parser::statement::{Block, Program, Statement};
use tamarin::value::error::RuntimeError;
use tamarin::value::Value;

fn run(source: &str) -> Result<Value, RuntimeError> {
    let (program, errors) = parse(source);
    assert!(
        errors.is_empty(),
        "unexpected parse errors for {source:?}: {errors:?}"
    );
    let environment = Environment::new();
    eval_program(&program, &environment)
}

fn run_value(source: &str) -> Value {
    run(source).unwrap_or_else(|error| panic!("unexpected runtime error for {source:?}: {error}"))
}

fn assert_integer(source: &str, expected: i64) {
    match run_value(source) {
        Value::Integer(value) => assert_eq!(value, expected, "for {source:?}"),
        other => panic!("expected INTEGER {expected} for {source:?}, got {other:?}"),
    }
}

fn assert_boolean(source: &str, expected: bool) {
    match run_value(source) {
        Value::Boolean(value) => assert_eq!(value, expected, "for {source:?}"),
        other => panic!("expected BOOLEAN {expected} for {source:?}, got {other:?}"),
    }
}

fn assert_null(source: &str) {
    match run_value(source) {
        Value::Null => {}
        other => panic!("expected NULL for {source:?}, got {other:?}"),
    }
}

fn assert_display(source: &str, expected: &str) {
    assert_eq!(run_value(source).to_string(), expected, "for {source:?}");
}

fn assert_error(source: &str, expected: &str) {
    match run(source) {
        Err(error) => assert_eq!(error.to_string(), expected, "for {source:?}"),
        Ok(value) => panic!("expected error {expected:?} for {source:?}, got {value:?}"),
    }
}

#[test]
fn evaluates_integer_expressions() {
    for (source, expected) in [
        ("1", 1),
        ("0", 0),
        ("999", 999),
        ("-2", -2),
        ("1 + 1", 2),
        ("1 - 3", -2),
        ("1 - -3", 4),
        ("2 * (1 + 3)", 8),
        ("1 + 2 * 3 / 2 - 4", 0),
    ] {
        assert_integer(source, expected);
    }
}

#[test]
fn evaluates_boolean_expressions() {
    for (source, expected) in [
        ("true", true),
        ("false", false),
        ("!true", false),
        ("!false", true),
        ("!!true", true),
        ("!!false", false),
        ("!1", false),
        ("!!1", true),
        ("!0", true),
        ("true == true", true),
        ("false == true", false),
        ("false != true", true),
        ("false != false", false),
        ("1 > 1", false),
        ("1 > -1", true),
        ("1 == 1", true),
        ("0 < 1", true),
        ("2 < 1", false),
        ("1 != 1", false),
        ("-1 != 1", true),
        ("1 <= 1", true),
        ("2 <= 1", false),
        ("1 >= 1", true),
        ("1 >= 2", false),
        ("(2 > 0) == true", true),
        ("!(2 > 0) == true", false),
    ] {
        assert_boolean(source, expected);
    }
}

#[test]
fn division_by_zero_is_null() {
    assert_null("1 / 0");
    assert_null("0 / 0");
}

#[test]
fn evaluates_if_expressions() {
    for (source, expected) in [
        ("if (true) {1;}", Some(1)),
        ("if (false) {1}", None),
        ("if (2 > 0) {1}", Some(1)),
        ("if (false) {1} else {2}", Some(2)),
        ("if (false == (1 == 1)) {1} else {2}", Some(2)),
        ("if (0) {} else {2}", Some(2)),
        ("if (1 / 0) {1} else {2}", Some(2)),
        ("if (1) {1} else {2}", Some(1)),
        ("if (\"\") {1} else {2}", Some(1)),
        ("if ([]) {1} else {2}", Some(1)),
        ("if (true) {return 1;} else {2}", Some(1)),
        ("if (true) {return;} else {2}", None),
    ] {
        match expected {
            Some(value) => assert_integer(source, value),
            None => assert_null(source),
        }
    }
}

#[test]
fn evaluates_return_statements() {
    for (source, expected) in [
        ("return;", None),
        ("9; return 1; 5", Some(1)),
        ("9; return; 5", None),
        ("return 1; 5", Some(1)),
        ("9; 0; return 2;", Some(2)),
        (
            "if (1 > 0) {\n\tif (1 > 0) {\n\t\treturn 2;\n\t}\n\treturn 0;\n}",
            Some(2),
        ),
        ("if (1 > 0) {return 2;}; return 0;", Some(2)),
    ] {
        match expected {
            Some(value) => assert_integer(source, value),
            None => assert_null(source),
        }
    }
}

#[test]
fn statements_after_return_do_not_run() {
    // The later statement would fail with a reference error if evaluated.
    assert_integer("return 1; boom;", 1);
}

#[test]
fn blocks_propagate_the_return_sentinel() {
    // A block statement fed straight to the evaluator bubbles its sentinel
    // up to the program boundary, which unwraps it.
    let program = Program {
        statements: vec![
            Statement::Block(Block {
                statements: vec![Statement::Return(Some(Expression::Integer(7)))],
            }),
            Statement::Expression(Expression::Integer(5)),
        ],
    };
    let environment = Environment::new();
    match eval_program(&program, &environment) {
        Ok(Value::Integer(7)) => {}
        other => panic!("expected 7, got {other:?}"),
    }
}

#[test]
fn reports_operator_errors() {
    for (source, expected) in [
        ("1 == true", "type mismatch: INTEGER == BOOLEAN"),
        ("true > false", "unknown operator: BOOLEAN > BOOLEAN"),
        ("true + false", "unknown operator: BOOLEAN + BOOLEAN"),
        ("true - false", "unknown operator: BOOLEAN - BOOLEAN"),
        ("-true", "unknown operator: -BOOLEAN"),
        ("-\"x\"", "unknown operator: -STRING"),
        ("!\"x\"", "unknown operator: !STRING"),
        ("1 > (false == 2)", "type mismatch: BOOLEAN == INTEGER"),
        ("!(true * true)", "unknown operator: BOOLEAN * BOOLEAN"),
        (
            "if (true) {\n\tif (1 != false) {\n\t\treturn 4\n\t}\n}",
            "type mismatch: INTEGER != BOOLEAN",
        ),
        ("false <= 1; return 2;", "type mismatch: BOOLEAN <= INTEGER"),
        ("1 % 2", "unknown operator: %INTEGER"),
        ("2 ^ 6", "unknown operator: ^INTEGER"),
        ("\"a\" - \"b\"", "unknown operator: STRING - STRING"),
        ("\"a\" == \"a\"", "unknown operator: STRING == STRING"),
        ("\"a\" + 1", "type mismatch: STRING + INTEGER"),
        ("[1] + [2]", "unsupported types: ARRAY + ARRAY"),
        ("fn(){} + fn(){}", "unsupported types: FUNCTION + FUNCTION"),
    ] {
        assert_error(source, expected);
    }
}

#[test]
fn reports_reference_errors() {
    for (source, expected) in [
        ("a + 1;", "reference error: a is not defined"),
        ("let b = a * 3", "reference error: a is not defined"),
        (
            "let f = fn(x, y) {a + y} (1, 2)",
            "reference error: a is not defined",
        ),
    ] {
        assert_error(source, expected);
    }
}

#[test]
fn errors_short_circuit_compound_forms() {
    for source in [
        "let a = boom;",
        "[1, boom, crash]",
        "{\"a\": boom}",
        "{boom: 1}",
        "len(boom)",
        "-boom",
        "boom + 1",
        "1 + boom",
        "return boom;",
        "[1][boom]",
        "boom[1]",
    ] {
        assert_error(source, "reference error: boom is not defined");
    }
}

#[test]
fn evaluates_let_statements() {
    assert_integer("let a = 1; a;", 1);
    assert_integer("let a = 1; let b = a - 2; b;", -1);
    // The let form itself yields no value.
    assert_null("let a = 1;");
    // A bare declaration binds null.
    assert_null("let a; a");
}

#[test]
fn evaluates_function_literals() {
    let value = run_value("fn (x) { x + 2;}");
    let Value::Function(function) = &value else {
        panic!("expected a FUNCTION value, got {value:?}");
    };
    assert_eq!(function.parameters.len(), 1);
    assert_eq!(function.parameters[0].to_string(), "x");
    assert_eq!(function.body.to_string(), "{(x + 2)}");
    assert_eq!(value.to_string(), "fn(x) {(x + 2)}");
}

#[test]
fn applies_functions() {
    for (source, expected) in [
        ("let identity = fn (x) {x}; identity(1);", 1),
        ("let double = fn (x) {x * 2}; double(2); 4", 4),
        (
            "let add = fn (a, b) {a + b}; add(add(1, 3), add(-1, -3))",
            0,
        ),
        ("fn(a, b){a + b}(1, 2);", 3),
        (
            "let a = fn (x) {\n\tlet b = fn (y) {\n\t\treturn y * 2\n\t}\n\treturn x + b(x)\n}\na(2);",
            6,
        ),
    ] {
        assert_integer(source, expected);
    }
}

#[test]
fn function_arity_is_not_diagnosed() {
    // Surplus arguments are dropped; missing parameters are simply unbound
    // and only fault when the body reads them.
    assert_integer("fn(){1}(5, 6)", 1);
    assert_integer("fn(x, y){ 1 }(1)", 1);
    assert_error("fn(x, y){ y }(1)", "reference error: y is not defined");
}

#[test]
fn evaluates_closures() {
    assert_integer(
        "let sumGenerator = fn (left) {\n\treturn fn (y) { left + y }\n}\nlet addTwo = sumGenerator(2);\naddTwo(4)",
        6,
    );
    assert_integer("let sum = fn(l){fn(y){l+y}}; let addTwo = sum(2); addTwo(4)", 6);
    // Capture is by environment, not by snapshot: each call produces an
    // independent closure.
    assert_integer(
        "let f = fn(x){ fn(y){ x + y } }; let g = f(2); let h = f(10); g(3)",
        5,
    );
    assert_integer(
        "let f = fn(x){ fn(y){ x + y } }; let g = f(2); let h = f(10); h(3)",
        13,
    );
}

#[test]
fn closures_observe_later_writes_to_their_environment() {
    assert_integer("let x = 1; let f = fn(){ x }; let x = 2; f()", 2);
}

#[test]
fn functions_recurse_through_their_own_binding() {
    assert_integer(
        "let countdown = fn(n) { if (n == 0) { return 0; } countdown(n - 1) }; countdown(5)",
        0,
    );
}

#[test]
fn evaluates_string_expressions() {
    assert_display("\"hello\"", "'hello'");
    assert_display(
        "let a = \"Hello\"; let b = \" world!\"; a + b",
        "'Hello world!'",
    );
    assert_display("\"\" + \"\"", "''");
}

#[test]
fn evaluates_array_expressions() {
    assert_display("[1, 2 * 2, 3 + 3]", "[1, 4, 6]");
    assert_display("[]", "[]");
    assert_integer("[1, 2, 3][0]", 1);
    assert_integer("[1, 2, 3][2]", 3);
    assert_integer("let i = 0; [10][i]", 10);
    assert_integer("let a = [1, 2, 3]; a[1] + a[2]", 5);
    assert_null("[1, 2, 3][3]");
    assert_null("[1, 2, 3][-1]");
    assert_error(
        "[1][true]",
        "type error: BOOLEAN cannot be used as index of ARRAY",
    );
    assert_error(
        "1[0]",
        "type error: INTEGER cannot be used as index expression",
    );
    assert_error(
        "\"abc\"[0]",
        "type error: STRING cannot be used as index expression",
    );
}

#[test]
fn evaluates_hash_expressions() {
    assert_integer("{\"two\": 2}[\"two\"]", 2);
    assert_display("{\"one\": 0 + 1}", "{'one': 1}");
    assert_integer("{1: 10, 2: 20}[2]", 20);
    assert_integer("{true: 1, false: 0}[true]", 1);
    assert_null("{\"a\": 1}[\"b\"]");
    assert_null("{}[1]");
    // Later writes win for duplicate keys.
    assert_integer("{\"a\": 1, \"a\": 2}[\"a\"]", 2);
    // Hash keys compare by content.
    assert_integer("let k = \"a\" + \"b\"; {\"ab\": 1}[k]", 1);
    assert_integer("let h = {5 - 3: 9}; h[2]", 9);
}

#[test]
fn rejects_unhashable_hash_keys() {
    assert_error(
        "{}[fn(){}]",
        "value error: unhashable type as hash key: FUNCTION",
    );
    assert_error(
        "{}[[]]",
        "value error: unhashable type as hash key: ARRAY",
    );
    assert_error(
        "{[1]: 1}",
        "value error: unhashable type as hash key: ARRAY",
    );
    assert_error(
        "{{}: 1}",
        "value error: unhashable type as hash key: HASH",
    );
}

#[test]
fn calls_require_a_callable() {
    assert_error("1(2)", "not a function");
    assert_error("\"x\"()", "not a function");
    assert_error("[1]()", "not a function");
}

#[test]
fn evaluates_len() {
    assert_integer("len(\"\")", 0);
    assert_integer("len(\"abcd\")", 4);
    assert_integer("len([1, 2, 3])", 3);
    assert_integer("len([])", 0);
    assert_integer("len({\"a\": 1, \"b\": 2})", 2);
    assert_integer("len([1,2,3]) + len(\"abcd\")", 7);
    assert_error("len()", "Type error: Expected 1 argument. Got 0");
    assert_error("len([], [])", "Type error: Expected 1 argument. Got 2");
    assert_error(
        "len(1)",
        "type mismatch: Expected STRING, ARRAY or HASH. Got INTEGER",
    );
    assert_error(
        "len(true)",
        "type mismatch: Expected STRING, ARRAY or HASH. Got BOOLEAN",
    );
}

#[test]
fn evaluates_head_foot_and_tail() {
    assert_integer("head([1, 2, 3])", 1);
    assert_null("head([])");
    assert_integer("foot([1, 2, 3])", 3);
    assert_null("foot([])");
    assert_display("tail([1, 2, 3])", "[2, 3]");
    assert_display("tail([1])", "[]");
    assert_null("tail([])");
    // tail returns a fresh array.
    assert_display("let a = [1, 2]; tail(a); a", "[1, 2]");
    assert_error("head()", "type error: Expected 1 argument. Got 0");
    assert_error("foot(1, 2)", "type error: Expected 1 argument. Got 2");
    assert_error("tail(\"abc\")", "type mismatch: Expected ARRAY. Got STRING");
    assert_error("head(1)", "type mismatch: Expected ARRAY. Got INTEGER");
}

#[test]
fn push_is_pure() {
    assert_display("push([1], 2)", "[1, 2]");
    assert_display("push([], 1)", "[1]");
    // The input array is untouched.
    assert_display("let a = [1]; push(a, 2); a", "[1]");
    assert_error("push([1])", "type error: Expected 2 arguments. Got 1");
    assert_error("push(1, 2)", "type mismatch: Expected ARRAY. Got INTEGER");
}

#[test]
fn pop_mutates() {
    assert_integer("pop([1, 2])", 2);
    assert_null("pop([])");
    // The mutation is observable through the binding.
    assert_display("let a = [1]; pop(a); a", "[]");
    assert_display("let a = [1, 2, 3]; pop(a); pop(a); a", "[1]");
    assert_error("pop()", "type error: Expected 1 argument. Got 0");
    assert_error("pop(\"abc\")", "type mismatch: Expected ARRAY. Got STRING");
}

#[test]
fn environment_bindings_shadow_builtins() {
    assert_integer("let len = fn(x) { 99 }; len(\"abc\")", 99);
}

#[test]
fn builtins_resolve_as_values() {
    assert_display("len", "__builtin__.len");
    assert_display("push", "__builtin__.push");
}

#[test]
fn value_display_forms() {
    assert_display("5", "5");
    assert_display("-5", "-5");
    assert_display("true", "true");
    assert_display("\"hi\"", "'hi'");
    assert_display("1 / 0", "null");
    assert_display("[1, \"two\", true]", "[1, 'two', true]");
    assert_display("{\"a\": [1]}", "{'a': [1]}");
    assert_display("fn(a, b) { a }", "fn(a, b) {a}");
}

#[test]
fn runtime_errors_render_with_the_error_prefix() {
    let error = run("1 == true").unwrap_err();
    assert_eq!(
        format!("ERROR: {error}"),
        "ERROR: type mismatch: INTEGER == BOOLEAN"
    );
}

#[test]
fn environment_persists_across_programs() {
    // The embedding contract: one environment drives many programs, as the
    // REPL does, and bindings plus captured closures survive.
    let environment = Environment::new();
    for (source, expected) in [
        ("let counter = fn(x) { fn() { x + 1 } };", "null"),
        ("let bump = counter(9);", "null"),
        ("bump()", "10"),
        ("bump()", "10"),
        ("let a = 1;", "null"),
        ("a + 41", "42"),
    ] {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "parse errors for {source:?}: {errors:?}");
        let value = eval_program(&program, &environment)
            .unwrap_or_else(|error| panic!("runtime error for {source:?}: {error}"));
        assert_eq!(value.to_string(), expected, "for {source:?}");
    }
}

#[test]
fn end_to_end_scenarios() {
    for (source, expected) in [
        ("1 + 2 * 3 / 2 - 4", "0"),
        (
            "let add = fn(a,b){a+b}; add(add(1,3), add(-1,-3))",
            "0",
        ),
        (
            "let a = \"Hello\"; let b = \" world!\"; a + b",
            "'Hello world!'",
        ),
        (
            "let sum = fn(l){fn(y){l+y}}; let addTwo = sum(2); addTwo(4)",
            "6",
        ),
        ("len([1,2,3]) + len(\"abcd\")", "7"),
        ("{\"two\": 2}[\"two\"]", "2"),
        ("if (1 > 0) { if (1 > 0) { return 2; } return 0; }", "2"),
    ] {
        assert_display(source, expected);
    }
}
