//! Unit tests for C generation.
//!
//! This module contains tests for:
//! - Layout of the translation unit
//! - Lowering of expressions, statements and control flow
//! - Structs, pointers and function pointers
//! - Emitted names

use crate::{compile, type_checker::types::Type};

use super::compiler::declare;

fn generate_c(source: &str) -> String {
    match compile(source, Some("test.lang".to_string())) {
        Ok(output) => output,
        Err(failure) => panic!("compilation failed: {:?}", failure.errors),
    }
}

fn assert_contains(output: &str, expected: &str) {
    assert!(
        output.contains(expected),
        "expected {:?} in generated C:\n{}",
        expected,
        output
    );
}

#[test]
fn test_empty_program() {
    assert_eq!(
        generate_c(""),
        "#include <stdio.h>\n#include <stdlib.h>\n\nint main(void) {\n    exit(0);\n    return 0;\n}\n"
    );
}

#[test]
fn test_globals_and_exit_value() {
    let expected = [
        "#include <stdio.h>",
        "#include <stdlib.h>",
        "",
        "static int g_x_1;",
        "",
        "int main(void) {",
        "    g_x_1 = 5;",
        "    g_x_1 = ((g_x_1) + (1));",
        "    exit(g_x_1);",
        "    return 0;",
        "}",
        "",
    ]
    .join("\n");

    assert_eq!(generate_c("let mut x = 5; x = x + 1; x"), expected);
}

#[test]
fn test_functions_get_prototypes() {
    let expected = [
        "#include <stdio.h>",
        "#include <stdlib.h>",
        "",
        "static int f_add(int a, int b);",
        "",
        "static int f_add(int a, int b) {",
        "    return ((a) + (b));",
        "}",
        "",
        "int main(void) {",
        "    exit(f_add(2, 3));",
        "    return 0;",
        "}",
        "",
    ]
    .join("\n");

    assert_eq!(generate_c("fn add(a: I32, b: I32) => a + b; add(2, 3)"), expected);
}

#[test]
fn test_intrinsic_helpers() {
    let output = generate_c("intrinsic fn readInt() : I32; readInt() + 1");
    assert_contains(&output, "static int intrinsic_readInt(void) {");
    assert_contains(&output, "    if (scanf(\"%d\", &value) != 1) {");
    assert_contains(&output, "exit(((intrinsic_readInt()) + (1)));");
    assert!(!output.contains("intrinsic_printInt"));
}

#[test]
fn test_unknown_intrinsics_get_prototypes() {
    let output = generate_c("intrinsic fn tick(I32, Bool) : I32; tick(1, true)");
    assert_contains(&output, "\nint tick(int, int);\n");
    assert_contains(&output, "exit(tick(1, 1));");
}

#[test]
fn test_void_functions() {
    let output =
        generate_c("intrinsic fn printInt(I32); fn show(v: I32) : Void => { printInt(v); } show(3); 0");
    assert_contains(&output, "static void intrinsic_printInt(int value) {");
    assert_contains(&output, "static void f_show(int v);");
    assert_contains(
        &output,
        "static void f_show(int v) {\n    intrinsic_printInt(v);\n    return;\n}",
    );
    assert_contains(&output, "    f_show(3);\n    exit(0);");
}

#[test]
fn test_comparisons_are_normalised() {
    let output = generate_c("let b = 1 < 2; let e = b == true; 0");
    assert_contains(&output, "g_b_1 = (((1) < (2)) ? 1 : 0);");
    assert_contains(&output, "g_e_2 = (((g_b_1) == (1)) ? 1 : 0);");
}

#[test]
fn test_simple_if_uses_ternary() {
    let output = generate_c("if (true) 1 else 2");
    assert_contains(&output, "exit(((1) ? (1) : (2)));");
}

#[test]
fn test_if_with_block_branch_uses_native_if() {
    let output = generate_c("let c = true; if (c) { let y = 1; y } else 2");
    let expected = [
        "    int tmp__2;",
        "    if (g_c_1) {",
        "        int tmp__1;",
        "        {",
        "            int y = 1;",
        "            tmp__1 = y;",
        "        }",
        "        tmp__2 = tmp__1;",
        "    } else {",
        "        tmp__2 = 2;",
        "    }",
        "    exit(tmp__2);",
    ]
    .join("\n");
    assert_contains(&output, &expected);
}

#[test]
fn test_void_if_has_no_temporary() {
    let output = generate_c(
        "intrinsic fn printInt(I32); if (true) { printInt(1) } else { printInt(2) }; 0",
    );
    assert_contains(&output, "    if (1) {");
    assert_contains(&output, "            intrinsic_printInt(2);");
    assert!(!output.contains("tmp__"));
}

#[test]
fn test_plain_while() {
    let output = generate_c("let mut i = 0; while (i < 3) i++; i");
    assert_contains(
        &output,
        "    while ((((g_i_1) < (3)) ? 1 : 0)) {\n        g_i_1++;\n    }",
    );
}

#[test]
fn test_while_with_hoisted_condition() {
    let output = generate_c("let mut i = 0; while ({ i++; i < 3 }) { } i");
    let expected = [
        "    while (1) {",
        "        int tmp__1;",
        "        {",
        "            g_i_1++;",
        "            tmp__1 = (((g_i_1) < (3)) ? 1 : 0);",
        "        }",
        "        if (!(tmp__1)) {",
        "            break;",
        "        }",
        "    }",
    ]
    .join("\n");
    assert_contains(&output, &expected);
}

#[test]
fn test_operands_keep_left_to_right_order() {
    let output = generate_c("let mut x = 1; let y = x + { x = 5; 1 }; y");
    let saved = output.find("int tmp__2 = g_x_1;").expect("left operand saved");
    let assigned = output.find("g_x_1 = 5;").expect("assignment in block");
    assert!(saved < assigned, "{}", output);
    assert_contains(&output, "g_y_2 = ((tmp__2) + (tmp__1));");
}

#[test]
fn test_structs() {
    let output = generate_c("struct Point { x: I32, y: I32 } let p = Point { 1, 2 }; p.y");
    assert_contains(&output, "struct Point {\n    int x;\n    int y;\n};");
    assert_contains(&output, "static struct Point g_p_1;");
    assert_contains(&output, "g_p_1 = ((struct Point){ 1, 2 });");
    assert_contains(&output, "exit((g_p_1).y);");
}

#[test]
fn test_empty_struct() {
    let output = generate_c("struct Unit { } let u = Unit { }; 0");
    assert_contains(&output, "struct Unit {\n    char empty_;\n};");
    assert_contains(&output, "g_u_1 = ((struct Unit){ 0 });");
}

#[test]
fn test_struct_equality_compares_fields() {
    let output = generate_c("struct P { x: I32 } let e = P { 1 } == P { 1 }; 0");
    assert_contains(&output, "struct P tmp__1 = ((struct P){ 1 });");
    assert_contains(&output, "struct P tmp__2 = ((struct P){ 1 });");
    assert_contains(&output, "((tmp__1).x) == ((tmp__2).x)");
}

#[test]
fn test_pointers() {
    let output = generate_c("let x = 5; let p = &x; *p + 1");
    assert_contains(&output, "static int *g_p_2;");
    assert_contains(&output, "g_p_2 = (&(g_x_1));");
    assert_contains(&output, "exit(((*(g_p_2)) + (1)));");
}

#[test]
fn test_reference_to_value_is_hoisted() {
    let output = generate_c("let p = &(1 + 2); *p");
    assert_contains(&output, "    int tmp__1 = ((1) + (2));\n    g_p_1 = (&(tmp__1));");
}

#[test]
fn test_function_pointers() {
    let output = generate_c("fn inc(x: I32) => x + 1; let f: (I32) => I32 = inc; f(41)");
    assert_contains(&output, "static int (*g_f_1)(int);");
    assert_contains(&output, "g_f_1 = f_inc;");
    assert_contains(&output, "exit(g_f_1(41));");
}

#[test]
fn test_mangled_names() {
    let output = generate_c("fn int(static: I32) => static; int(4)");
    assert_contains(&output, "static int f_int(int static__) {");
    assert_contains(&output, "exit(f_int(4));");
}

#[test]
fn test_shadowed_globals_are_distinct() {
    let output = generate_c("let x = 1; let x = x + 1; x");
    assert_contains(&output, "static int g_x_1;\nstatic int g_x_2;");
    assert_contains(&output, "g_x_2 = ((g_x_1) + (1));");
    assert_contains(&output, "exit(g_x_2);");
}

#[test]
fn test_generation_is_deterministic() {
    let source = "struct P { a: I32 } fn f(p: P) => p.a; let q = P { 3 }; if (f(q) < 4) { let z = 2; z } else 0";
    assert_eq!(generate_c(source), generate_c(source));
}

#[test]
fn test_declarators() {
    assert_eq!(declare(&Type::I32, "x"), "int x");
    assert_eq!(declare(&Type::BOOL, ""), "int");
    assert_eq!(declare(&Type::pointer_to(Type::pointer_to(Type::I32)), "p"), "int **p");

    let callback = Type::Function {
        parameters: vec![Type::I32, Type::BOOL],
        return_type: Box::new(Type::pointer_to(Type::I32)),
    };
    assert_eq!(declare(&callback, "f"), "int *(*f)(int, int)");
    assert_eq!(declare(&callback, ""), "int *(*)(int, int)");

    let thunk = Type::Function {
        parameters: vec![],
        return_type: Box::new(Type::VOID),
    };
    assert_eq!(declare(&Type::pointer_to(thunk), "t"), "void (**t)(void)");
}
