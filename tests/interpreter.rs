//! End-to-end tests: source text through scan, parse and interpret
//!
//! Covers:
//! - arithmetic, strings and truthiness
//! - scoping and closures
//! - loops with break/continue and functions with return
//! - runtime error reporting

use pretty_assertions::assert_eq;
use treelox::{scan, Config, ErrorKind, Evaluator, Output, Parser, RuntimeError};

/// Helper to run a program and return its printed lines
fn run(source: &str) -> Result<Vec<String>, RuntimeError> {
    let (tokens, lex_errors) = scan(source);
    assert!(lex_errors.is_empty(), "unexpected lex errors: {lex_errors:?}");

    let (statements, parse_errors) = Parser::new(tokens).parse();
    assert!(parse_errors.is_empty(), "unexpected parse errors: {parse_errors:?}");

    let mut evaluator = Evaluator::new(Config::default(), Output::buffer());
    evaluator.interpret(&statements)?;
    Ok(evaluator.output_mut().take())
}

/// Helper to run a program that must succeed
fn output(source: &str) -> Vec<String> {
    run(source).expect("program should run")
}

/// Helper to run a program that must fail at runtime
fn runtime_error(source: &str) -> RuntimeError {
    run(source).expect_err("program should fail")
}

// ============================================
// Expressions
// ============================================

#[test]
fn test_nan_never_equals_itself() {
    assert_eq!(output("var n = 0 / 0; print n == n; print n != n;"), ["false", "true"]);
}

#[test]
fn test_arithmetic_follows_ieee_doubles() {
    assert_eq!(output("print 1 + 2; print 7 - 10; print 2.5 * 4; print 1 / 3;"), [
        "3",
        "-3",
        "10",
        (1.0f64 / 3.0).to_string().as_str(),
    ]);
    assert_eq!(output("print 0.1 + 0.2;"), [(0.1f64 + 0.2).to_string()]);
}

#[test]
fn test_division_by_zero_is_not_an_error() {
    assert_eq!(output("print 1 / 0; print -1 / 0; print 0 / 0;"), ["Infinity", "-Infinity", "NaN"]);
}

#[test]
fn test_integral_numbers_print_without_fraction() {
    assert_eq!(output("print 6 / 2; print 3.0; print 2.50;"), ["3", "3", "2.5"]);
}

#[test]
fn test_string_concatenation() {
    assert_eq!(output("print \"foo\" + \"bar\";"), ["foobar"]);
}

#[test]
fn test_string_plus_number_is_a_type_error() {
    let err = runtime_error("print \"foo\" + 1;");
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert!(err.message.contains("operands must be two numbers or two strings."));
}

#[test]
fn test_comparison_requires_numbers() {
    let err = runtime_error("print \"a\" < \"b\";");
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "Operator '<': operands must be numbers.");
    assert_eq!(output("print 1 < 2; print 2 <= 2; print 3 > 4; print 4 >= 5;"), [
        "true", "true", "false", "false"
    ]);
}

#[test]
fn test_negating_a_non_number() {
    let err = runtime_error("print -nil;");
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert!(err.message.contains("'-'"));
    assert!(err.message.contains("operand must be a number"));
}

#[test]
fn test_truthiness() {
    assert_eq!(output("print !nil; print !false; print !0; print !\"\";"), ["true", "true", "false", "false"]);
}

#[test]
fn test_equality_never_type_errors() {
    assert_eq!(
        output("print nil == nil; print nil == false; print 1 == 1; print \"a\" != \"a\"; print 1 == \"1\";"),
        ["true", "false", "true", "false", "false"]
    );
}

#[test]
fn test_functions_compare_by_identity() {
    assert_eq!(
        output("fun f() {} fun g() {} var h = f; print f == h; print f == g; print clock == clock;"),
        ["true", "false", "true"]
    );
}

#[test]
fn test_logical_operators_return_deciding_operand() {
    assert_eq!(
        output("print nil or \"yes\"; print 0 or 1; print nil and boom; print 1 and 2; print false or nil;"),
        ["yes", "0", "nil", "2", "nil"]
    );
}

#[test]
fn test_logical_operators_short_circuit() {
    assert_eq!(output("var a = 0; true or (a = 1); false and (a = 2); print a;"), ["0"]);
}

#[test]
fn test_ternary_type_gate() {
    assert_eq!(output("print true ? 1 : \"x\";"), ["nil"]);
    assert_eq!(output("print true ? 1 : 2;"), ["1"]);
    assert_eq!(output("print false ? \"a\" : \"b\";"), ["b"]);
    assert_eq!(output("print nil ? 1 : 0 ? 2 : 3;"), ["2"]);
    assert_eq!(output("print true ? nil : nil;"), ["nil"]);
}

#[test]
fn test_compound_assignment() {
    assert_eq!(
        output("var x = 10; x += 5; print x; x -= 3; print x; x *= 2; print x; x /= 4; print x;"),
        ["15", "12", "24", "6"]
    );
    assert_eq!(output("var s = \"a\"; s += \"b\"; print s;"), ["ab"]);
}

#[test]
fn test_assignment_is_an_expression() {
    assert_eq!(output("var a; var b; a = b = 3; print a; print b; print a = 4;"), ["3", "3", "4"]);
}

// ============================================
// Variables and scope
// ============================================

#[test]
fn test_block_shadowing_does_not_leak() {
    assert_eq!(output("var x = 1; { var x = 2; } print x;"), ["1"]);
}

#[test]
fn test_inner_block_sees_and_updates_outer() {
    assert_eq!(output("var x = 1; { var y = x + 1; x = y * 10; print y; } print x;"), ["2", "20"]);
}

#[test]
fn test_uninitialized_variable_is_nil() {
    assert_eq!(output("var a; print a;"), ["nil"]);
}

#[test]
fn test_redeclaring_a_global_is_allowed() {
    assert_eq!(output("var a = 1; var a = 2; print a;"), ["2"]);
}

#[test]
fn test_undefined_variable_access() {
    let err = runtime_error("print ghost;");
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    assert!(err.message.contains("ghost"));
}

#[test]
fn test_undefined_variable_assignment_is_not_a_declaration() {
    let err = runtime_error("ghost = 1;");
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    assert!(err.message.contains("ghost"));

    let err = runtime_error("{ ghost = 1; } print ghost;");
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
}

// ============================================
// Control flow
// ============================================

#[test]
fn test_if_else() {
    assert_eq!(
        output("if (1 > 2) print \"a\"; else print \"b\"; if (0) print \"zero is truthy\";"),
        ["b", "zero is truthy"]
    );
}

#[test]
fn test_for_with_break() {
    assert_eq!(
        output("for (var i = 0; i < 5; i += 1) { if (i == 3) break; print i; }"),
        ["0", "1", "2"]
    );
}

#[test]
fn test_continue_in_while_rechecks_condition() {
    let source = "var i = 0;
                  while (i < 5) {
                      i = i + 1;
                      if (i == 2 or i == 4) continue;
                      print i;
                  }
                  print \"done\";";
    assert_eq!(output(source), ["1", "3", "5", "done"]);
}

#[test]
fn test_continue_in_for_still_increments() {
    assert_eq!(
        output("for (var i = 0; i < 5; i += 1) { if (i == 1) continue; print i; }"),
        ["0", "2", "3", "4"]
    );
}

#[test]
fn test_break_only_leaves_innermost_loop() {
    let source = "for (var i = 0; i < 3; i += 1) {
                      for (var j = 0; j < 3; j += 1) {
                          if (j == 1) break;
                          print i * 10 + j;
                      }
                  }";
    assert_eq!(output(source), ["0", "10", "20"]);
}

#[test]
fn test_loop_body_gets_fresh_scope_each_iteration() {
    let source = "var fns = nil;
                  var i = 0;
                  var first; var second;
                  while (i < 2) {
                      var captured = i;
                      fun show() { print captured; }
                      if (i == 0) first = show; else second = show;
                      i += 1;
                  }
                  first();
                  second();";
    assert_eq!(output(source), ["0", "1"]);
}

// ============================================
// Functions and closures
// ============================================

#[test]
fn test_function_call_and_return() {
    assert_eq!(
        output("fun add(a, b) { return a + b; } print add(1, 2); print add(\"x\", \"y\");"),
        ["3", "xy"]
    );
}

#[test]
fn test_function_without_return_yields_nil() {
    assert_eq!(output("fun f() { 1; } print f(); fun g() { return; } print g();"), ["nil", "nil"]);
}

#[test]
fn test_return_stops_the_body() {
    assert_eq!(output("fun f() { print 1; return 2; print 3; } print f();"), ["1", "2"]);
}

#[test]
fn test_recursion() {
    assert_eq!(
        output("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(15);"),
        ["610"]
    );
}

#[test]
fn test_counter_closure() {
    let source = "fun makeCounter() {
                      var count = 0;
                      fun counter() {
                          count = count + 1;
                          return count;
                      }
                      return counter;
                  }
                  var a = makeCounter();
                  var b = makeCounter();
                  print a();
                  print a();
                  print b();
                  print a();";
    assert_eq!(output(source), ["1", "2", "1", "3"]);
}

#[test]
fn test_closure_captures_defining_scope_not_call_site() {
    let source = "var x = \"global\";
                  fun outer() {
                      var x = \"outer\";
                      fun inner() { print x; }
                      return inner;
                  }
                  var f = outer();
                  { var x = \"block\"; f(); }";
    assert_eq!(output(source), ["outer"]);
}

#[test]
fn test_function_literals() {
    let source = "var twice = fun (f, v) { return f(f(v)); };
                  print twice(fun (n) { return n * 3; }, 2);
                  print fun () {};";
    assert_eq!(output(source), ["18", "<fn>"]);
}

#[test]
fn test_chained_calls() {
    let source = "fun adder(a) { return fun (b) { return a + b; }; } print adder(2)(5);";
    assert_eq!(output(source), ["7"]);
}

#[test]
fn test_function_display() {
    assert_eq!(output("fun hello() {} print hello; print clock;"), ["<fn hello>", "<native fn clock>"]);
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    let source = "fun show(v) { print v; return v; }
                  fun three(a, b, c) { return a + b + c; }
                  print three(show(1), show(2), show(3));";
    assert_eq!(output(source), ["1", "2", "3", "6"]);
}

#[test]
fn test_arity_mismatch() {
    let err = runtime_error("fun pair(a, b) {} pair(1);");
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
    assert!(err.message.contains("expected 2 but got 1"));
}

#[test]
fn test_calling_a_non_callable() {
    let err = runtime_error("var x = 1; x();");
    assert_eq!(err.kind, ErrorKind::NotCallable);
    let err = runtime_error("\"str\"();");
    assert_eq!(err.kind, ErrorKind::NotCallable);
}

#[test]
fn test_runaway_recursion_is_a_runtime_error() {
    let (tokens, _) = scan("fun forever(n) { return forever(n); } forever(1);");
    let (statements, _) = Parser::new(tokens).parse();
    let mut evaluator = Evaluator::new(Config::default(), Output::buffer());
    let err = evaluator.interpret(&statements).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StackOverflow);
    assert_eq!(err.message, "Stack overflow.");
}

#[test]
fn test_recursion_up_to_the_default_depth_succeeds() {
    let depth = Config::DEFAULT_MAX_CALL_DEPTH - 1;
    let source = format!("fun count(n) {{ if (n == 0) return 0; return 1 + count(n - 1); }} print count({depth});");
    assert_eq!(output(&source), [depth.to_string()]);
}

#[test]
fn test_deeply_nested_expression_evaluates() {
    let depth = 5000;
    let source = format!("print {}1{} + 1;", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(output(&source), ["2"]);
}

// ============================================
// Error reporting
// ============================================

#[test]
fn test_runtime_error_reports_line() {
    let err = runtime_error("var a = 1;\nvar b = 2;\nprint a + nil;");
    assert_eq!(err.line, 3);
    assert_eq!(err.to_string(), format!("{}\n[line 3]", err.message));
}

#[test]
fn test_runtime_error_halts_the_run() {
    let (tokens, _) = scan("print 1; print nope; print 2;");
    let (statements, _) = Parser::new(tokens).parse();
    let mut evaluator = Evaluator::buffered();
    assert!(evaluator.interpret(&statements).is_err());
    assert_eq!(evaluator.output().lines(), ["1"]);
}

#[test]
fn test_syntax_errors_are_collected_in_one_pass() {
    let (tokens, _) = scan("var 1 = 2;\nprint (;\nprint \"ok\";\nbreak;");
    let (statements, errors) = Parser::new(tokens).parse();
    let lines: Vec<_> = errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 2, 4]);
    assert_eq!(statements.len(), 1);
}

#[test]
fn test_echo_of_trailing_expression() {
    assert_eq!(output("var a = 20; a / 4"), ["5"]);
    assert_eq!(output("\"hi\""), ["hi"]);
}
