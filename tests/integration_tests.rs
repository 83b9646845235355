//! Integration tests for end-to-end compilation.
//!
//! These tests run the complete pipeline through the public `compile` entry
//! point. When a system C compiler is available, the generated C is also
//! built and executed, and the process exit status is checked.

use std::{
    io::Write,
    path::Path,
    process::{Command, Stdio},
};

use exprc::{compile, Stage};
use tempfile::TempDir;

fn compile_ok(source: &str) -> String {
    match compile(source, Some("test.lang".to_string())) {
        Ok(output) => output,
        Err(failure) => panic!("compilation failed: {:?}", failure.errors),
    }
}

fn cc_available() -> bool {
    Command::new("cc")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Builds `c_source` with `cc` and runs it, returning the exit status. Returns
/// `None` when no C compiler is installed.
fn run_c(c_source: &str, stdin: &str) -> Option<i32> {
    if !cc_available() {
        eprintln!("cc not found, skipping execution");
        return None;
    }

    let dir = TempDir::new().expect("create temp dir");
    let source_path = dir.path().join("program.c");
    let binary_path = dir.path().join("program");
    std::fs::write(&source_path, c_source).expect("write C source");

    build(&source_path, &binary_path);

    let mut child = Command::new(&binary_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .expect("run compiled program");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    let status = child.wait().expect("wait for program");
    status.code()
}

fn build(source_path: &Path, binary_path: &Path) {
    let output = Command::new("cc")
        .arg("-std=c99")
        .arg("-o")
        .arg(binary_path)
        .arg(source_path)
        .output()
        .expect("invoke cc");
    assert!(
        output.status.success(),
        "cc failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn assert_exit_code(source: &str, stdin: &str, expected: i32) {
    let c_source = compile_ok(source);
    if let Some(code) = run_c(&c_source, stdin) {
        assert_eq!(code, expected, "generated C:\n{}", c_source);
    }
}

fn failure_messages(source: &str) -> (Stage, Vec<String>) {
    match compile(source, Some("test.lang".to_string())) {
        Ok(output) => panic!("expected compilation to fail, got:\n{}", output),
        Err(failure) => (
            failure.stage,
            failure.errors.iter().map(|error| error.to_string()).collect(),
        ),
    }
}

#[test]
fn test_function_call_exit_value() {
    let source = "fn add(a: I32, b: I32): I32 => { return a + b; } add(2, 3)";
    let output = compile_ok(source);

    assert!(output.contains("static int f_add(int a, int b);"));
    assert!(output.contains("static int f_add(int a, int b) {"));
    assert!(output.contains("exit(f_add(2, 3));"));
    assert_exit_code(source, "", 5);
}

#[test]
fn test_reassigned_variable_exit_value() {
    assert_exit_code("let mut x = 5; x = x + 1; x", "", 6);
}

#[test]
fn test_declared_type_mismatch_is_one_error() {
    let (stage, messages) = failure_messages("let x: Bool = 5;");
    assert_eq!(stage, Stage::Analysis);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("type mismatch"), "{:?}", messages);
}

#[test]
fn test_read_int_helper() {
    let source = "intrinsic fn readInt(): I32; readInt() + 1";
    let output = compile_ok(source);

    assert!(output.contains("scanf(\"%d\", &value)"));
    assert!(output.contains("exit(((intrinsic_readInt()) + (1)));"));
    assert_exit_code(source, "41\n", 42);
}

#[test]
fn test_unknown_function_is_one_error() {
    let (stage, messages) = failure_messages("foo()");
    assert_eq!(stage, Stage::Analysis);
    assert_eq!(
        messages,
        vec!["unknown function or function variable \"foo\" at position 0"]
    );
}

#[test]
fn test_exit_zero_without_final_expression() {
    let output = compile_ok("let x = 3;");
    assert!(output.contains("    exit(0);\n    return 0;\n}"));
    assert_exit_code("let x = 3;", "", 0);
}

#[test]
fn test_immutable_assignment_is_rejected() {
    let (_, messages) = failure_messages("let x = 5; x = x + 1; x");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("cannot assign to immutable variable \"x\""));
}

#[test]
fn test_if_branch_mismatch_is_rejected() {
    let (stage, messages) = failure_messages("if (true) 1 else false");
    assert_eq!(stage, Stage::Analysis);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("if branches must have the same type"));
}

#[test]
fn test_non_scalar_exit_value_is_rejected() {
    let (stage, messages) = failure_messages("struct P { x: I32 } P { 1 }");
    assert_eq!(stage, Stage::Analysis);
    assert_eq!(
        messages,
        vec!["final expression must be I32 or Bool to become the exit status, found P at position 20"]
    );

    let (stage, _) = failure_messages("let x = 1; &x");
    assert_eq!(stage, Stage::Analysis);
}

#[test]
fn test_let_inference() {
    assert_exit_code("let b = 2 < 3; let n = if (b) 7 else 8; n", "", 7);
}

#[test]
fn test_shadowed_globals_stay_independent() {
    let source = "let mut x = 1; let saved = x; let mut x = 10; x += 5; fn get() => x; get() + saved";
    let output = compile_ok(source);

    assert!(output.contains("static int g_x_1;"));
    assert!(output.contains("static int g_x_3;"));
    assert_exit_code(source, "", 16);
}

#[test]
fn test_compilation_is_deterministic() {
    let source = "struct P { x: I32, y: I32 } fn sum(p: P) => p.x + p.y; let q = P { 1, 2 }; if (sum(q) < 4) { let z = sum(q); z * 2 } else 0";
    assert_eq!(compile_ok(source), compile_ok(source));
}

#[test]
fn test_loops_and_mutation() {
    let source = "
        fn triangle(n: I32) => {
            let mut total = 0;
            let mut i = 1;
            while (i < n + 1) {
                total += i;
                i++;
            }
            total
        }
        triangle(10)
    ";
    assert_exit_code(source, "", 55);
}

#[test]
fn test_recursion() {
    let source = "fn fib(n: I32) => if (n < 2) n else fib(n - 1) + fib(n - 2); fib(10)";
    assert_exit_code(source, "", 55);
}

#[test]
fn test_if_branches_run_conditionally() {
    let source = "
        let mut hits = 0;
        let r = if (false) { hits += 100; 1 } else { hits += 1; 2 };
        hits * 10 + r
    ";
    assert_exit_code(source, "", 12);
}

#[test]
fn test_while_condition_reevaluated() {
    let source = "let mut i = 0; while ({ i++; i < 5 }) { } i";
    assert_exit_code(source, "", 5);
}

#[test]
fn test_leading_block_in_expression() {
    assert_exit_code("{ 1 } + 2", "", 3);
    assert_exit_code(
        "{ let y = 4; y } == 4; if ({ let y = 4; y } == 4) 9 else 1",
        "",
        9,
    );
}

#[test]
fn test_structs_and_pointers() {
    let source = "
        struct Point { x: I32, y: I32 }
        fn shift(p: *I32, by: I32): Void => { }
        let mut value = 4;
        let p = &value;
        value += 3;
        let pt = Point { *p, 2 };
        let same = pt == Point { 7, 2 };
        if (same) pt.x * pt.y else 0
    ";
    assert_exit_code(source, "", 14);
}

#[test]
fn test_nested_struct_declarations() {
    let source = "
        fn early() : Inner => Inner { 1 };
        fn late() => { struct Inner { v: I32 } Inner { 2 }.v }
        let top = Inner { 3 };
        early().v + late() + top.v
    ";
    assert_exit_code(source, "", 6);
}

#[test]
fn test_function_values() {
    let source = "
        fn double(x: I32) => x * 2;
        fn apply(f: (I32) => I32, v: I32) => f(v);
        let g: (I32) => I32 = double;
        apply(g, 5) + apply(double, 1)
    ";
    assert_exit_code(source, "", 12);
}

#[test]
fn test_mangled_identifiers_compile() {
    let source = "fn int(static: I32) => static + 1; let main = int(2); main";
    assert_exit_code(source, "", 3);
}

#[test]
fn test_functions_named_like_libc_compile() {
    let source = "
        fn abs(x: I32): I32 => x;
        fn puts(x: I32) => x + 1;
        fn free() => { let remove = 5; remove }
        let rand = 2;
        abs(4) + puts(rand) + free()
    ";
    let output = compile_ok(source);

    assert!(output.contains("static int f_abs(int x);"));
    assert!(output.contains("static int f_free(void) {"));
    assert_exit_code(source, "", 12);
}

#[test]
fn test_lexing_failure_stops_pipeline() {
    let (stage, messages) = failure_messages("let x = 1 @ 2;");
    assert_eq!(stage, Stage::Lexing);
    assert_eq!(messages.len(), 1);
}

#[test]
fn test_parsing_failure_stops_pipeline() {
    let (stage, _) = failure_messages("let = 4;");
    assert_eq!(stage, Stage::Parsing);
}

#[test]
fn test_compile_is_usable_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|n| {
            std::thread::spawn(move || {
                compile(&format!("let x = {}; x + 1", n), None).map_err(|failure| failure.stage)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("thread panicked").is_ok());
    }
}
