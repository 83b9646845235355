//! Unit tests for the parser module.
//!
//! This module contains tests for:
//! - Declarations (intrinsics, functions, structs)
//! - Statements and the final-expression rule
//! - Operator precedence and associativity
//! - Type annotations
//! - Error recovery

use std::sync::Arc;

use crate::{
    ast::{
        ast::Program,
        expressions::{BinaryOp, Expr, ExprKind},
        statements::{AssignOp, StmtKind},
        types::TypeRefKind,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

use super::parser::parse;

fn parse_source(source: &str) -> (Program, Vec<Error>) {
    let (tokens, lex_errors) = tokenize(source, Some("test.lang".to_string()));
    assert!(lex_errors.is_empty(), "lexer errors: {:?}", lex_errors);
    parse(tokens, Arc::new("test.lang".to_string()))
}

fn parse_ok(source: &str) -> Program {
    let (program, errors) = parse_source(source);
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    program
}

fn final_expr(source: &str) -> Expr {
    parse_ok(source)
        .final_expression
        .expect("expected a final expression")
}

/// Renders an expression fully parenthesised, for precedence checks.
fn show(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::LiteralInt(value) => value.to_string(),
        ExprKind::LiteralBool(value) => value.to_string(),
        ExprKind::Identifier(name) => name.clone(),
        ExprKind::Unary { operand, .. } => format!("(-{})", show(operand)),
        ExprKind::Binary {
            operator,
            left,
            right,
        } => format!("({} {} {})", show(left), operator, show(right)),
        ExprKind::Call { callee, arguments } => format!(
            "{}({})",
            callee,
            arguments.iter().map(show).collect::<Vec<_>>().join(", ")
        ),
        ExprKind::If {
            condition,
            then_expr,
            else_expr,
        } => format!(
            "if {} {} {}",
            show(condition),
            show(then_expr),
            show(else_expr)
        ),
        ExprKind::Block(block) => format!(
            "{{{} stmts; {}}}",
            block.statements.len(),
            block.result.as_ref().map(|r| show(r)).unwrap_or_default()
        ),
        ExprKind::StructLiteral { name, values } => format!(
            "{} {{{}}}",
            name,
            values.iter().map(show).collect::<Vec<_>>().join(", ")
        ),
        ExprKind::FieldAccess { object, field } => format!("{}.{}", show(object), field),
        ExprKind::Reference(inner) => format!("(&{})", show(inner)),
        ExprKind::Dereference(inner) => format!("(*{})", show(inner)),
    }
}

#[test]
fn test_parse_empty_program() {
    let program = parse_ok("");

    assert!(program.statements.is_empty());
    assert!(program.final_expression.is_none());
    assert_eq!(program.node_count, 0);
}

#[test]
fn test_parse_precedence() {
    assert_eq!(show(&final_expr("1 + 2 * 3")), "(1 + (2 * 3))");
    assert_eq!(show(&final_expr("1 * 2 + 3")), "((1 * 2) + 3)");
    assert_eq!(show(&final_expr("a + 1 < b == c < d")), "(((a + 1) < b) == (c < d))");
    assert_eq!(show(&final_expr("-a * b")), "((-a) * b)");
    assert_eq!(show(&final_expr("(1 + 2) * 3")), "((1 + 2) * 3)");
}

#[test]
fn test_parse_left_associativity() {
    assert_eq!(show(&final_expr("10 - 3 - 2")), "((10 - 3) - 2)");
    assert_eq!(show(&final_expr("a == b == c")), "((a == b) == c)");
}

#[test]
fn test_parse_pointer_operators() {
    assert_eq!(show(&final_expr("*p + 1")), "((*p) + 1)");
    assert_eq!(show(&final_expr("&x")), "(&x)");
    assert_eq!(show(&final_expr("a * *p")), "(a * (*p))");
}

#[test]
fn test_parse_calls_and_fields() {
    assert_eq!(show(&final_expr("add(1, 2 * 3)")), "add(1, (2 * 3))");
    assert_eq!(show(&final_expr("readInt()")), "readInt()");
    assert_eq!(show(&final_expr("p.x + p.y")), "(p.x + p.y)");
    assert_eq!(show(&final_expr("make().inner.x")), "make().inner.x");
}

#[test]
fn test_parse_struct_literal() {
    assert_eq!(show(&final_expr("Point { 3, 4 }")), "Point {3, 4}");
    assert_eq!(show(&final_expr("Point { 3, 4 }.x")), "Point {3, 4}.x");
}

#[test]
fn test_parse_if_and_block_expressions() {
    assert_eq!(
        show(&final_expr("if (a < b) a else b + 1")),
        "if (a < b) a (b + 1)"
    );
    assert_eq!(show(&final_expr("{ let y = 2; y * 3 }")), "{1 stmts; (y * 3)}");
}

#[test]
fn test_parse_let_statements() {
    let program = parse_ok("let x = 5; let mut y: Bool = true; let f: (I32) => Void = g;");

    assert_eq!(program.statements.len(), 3);

    match &program.statements[0].kind {
        StmtKind::Let {
            mutable,
            name,
            annotation,
            ..
        } => {
            assert!(!mutable);
            assert_eq!(name, "x");
            assert!(annotation.is_none());
        }
        other => panic!("expected let, got {:?}", other),
    }

    match &program.statements[1].kind {
        StmtKind::Let {
            mutable,
            annotation: Some(annotation),
            ..
        } => {
            assert!(mutable);
            assert_eq!(annotation.kind, TypeRefKind::Named("Bool".to_string()));
        }
        other => panic!("expected annotated let, got {:?}", other),
    }

    match &program.statements[2].kind {
        StmtKind::Let {
            annotation: Some(annotation),
            ..
        } => {
            assert_eq!(annotation.to_string(), "(I32) => Void");
            assert!(matches!(annotation.kind, TypeRefKind::Function { .. }));
        }
        other => panic!("expected function-typed let, got {:?}", other),
    }
}

#[test]
fn test_parse_assignments_and_increment() {
    let program = parse_ok("x = 1; x += 2; x -= 3; x *= 4; x /= 5; x++;");

    let operators: Vec<AssignOp> = program
        .statements
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Assignment { operator, .. } => Some(*operator),
            _ => None,
        })
        .collect();

    assert_eq!(
        operators,
        vec![
            AssignOp::Assign,
            AssignOp::Add,
            AssignOp::Sub,
            AssignOp::Mul,
            AssignOp::Div
        ]
    );
    assert!(matches!(
        &program.statements[5].kind,
        StmtKind::Increment { name } if name == "x"
    ));
}

#[test]
fn test_parse_while_bodies() {
    let program = parse_ok("while (i < 10) { i++; } while (i < 20) i++;");

    match &program.statements[0].kind {
        StmtKind::While { body, .. } => assert!(matches!(body.kind, StmtKind::Block(_))),
        other => panic!("expected while, got {:?}", other),
    }
    match &program.statements[1].kind {
        StmtKind::While { body, .. } => {
            assert!(matches!(body.kind, StmtKind::Increment { .. }))
        }
        other => panic!("expected while, got {:?}", other),
    }
}

#[test]
fn test_parse_block_statement_without_result() {
    let program = parse_ok("{ let a = 1; } 7");

    assert!(matches!(program.statements[0].kind, StmtKind::Block(_)));
    assert_eq!(show(program.final_expression.as_ref().unwrap()), "7");
}

#[test]
fn test_parse_leading_block_continues_into_operators() {
    assert_eq!(show(&final_expr("{ 1 } + 2")), "({0 stmts; 1} + 2)");
    assert_eq!(
        show(&final_expr("{ 1 } + 2 * 3 < 9")),
        "(({0 stmts; 1} + (2 * 3)) < 9)"
    );

    let program = parse_ok("{ let y = 4; y } == 4; 0");
    match &program.statements[0].kind {
        StmtKind::Expression(expr) => assert_eq!(show(expr), "({1 stmts; y} == 4)"),
        other => panic!("expected expression statement, got {:?}", other),
    }
    assert_eq!(show(program.final_expression.as_ref().unwrap()), "0");
}

#[test]
fn test_parse_functions() {
    let program = parse_ok(
        "fn add(a: I32, b: I32) : I32 => { a + b }
         fn twice(x: I32) => x * 2;
         fn early(flag: Bool) : I32 => return 1;
         fn noop() : Void => {}",
    );

    assert_eq!(program.functions.len(), 4);

    let add = &program.functions[0];
    assert_eq!(add.name, "add");
    assert_eq!(add.parameters.len(), 2);
    assert_eq!(add.parameters[1].0, "b");
    assert_eq!(show(add.body.result.as_ref().unwrap()), "(a + b)");

    let twice = &program.functions[1];
    assert!(twice.return_type.is_none());
    assert_eq!(show(twice.body.result.as_ref().unwrap()), "(x * 2)");

    let early = &program.functions[2];
    assert!(early.body.result.is_none());
    assert!(matches!(early.body.statements[0].kind, StmtKind::Return(Some(_))));

    let noop = &program.functions[3];
    assert!(noop.body.statements.is_empty());
    assert!(noop.body.result.is_none());
}

#[test]
fn test_parse_intrinsics() {
    let program = parse_ok("intrinsic fn readInt() : I32; intrinsic fn printInt(I32); intrinsic fn put(value: I32) : Void;");

    assert_eq!(program.intrinsics.len(), 3);
    assert_eq!(program.intrinsics[0].name, "readInt");
    assert!(program.intrinsics[0].parameter_types.is_empty());
    assert!(program.intrinsics[1].return_type.is_none());
    assert_eq!(program.intrinsics[2].parameter_types[0].to_string(), "I32");
}

#[test]
fn test_parse_struct_declaration() {
    let program = parse_ok("struct Point { x : I32, y : *I32, } Point { 1, 2 }.x");

    match &program.statements[0].kind {
        StmtKind::StructDecl { name, fields } => {
            assert_eq!(name, "Point");
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[1].1.to_string(), "*I32");
        }
        other => panic!("expected struct declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_nested_function_type() {
    let program = parse_ok("fn apply(f: (I32, Bool) => *I32, x: I32) : (I32) => I32 => f;");

    let apply = &program.functions[0];
    assert_eq!(apply.parameters[0].1.to_string(), "(I32, Bool) => *I32");
    assert_eq!(
        apply.return_type.as_ref().unwrap().to_string(),
        "(I32) => I32"
    );
}

#[test]
fn test_node_ids_are_unique() {
    let program = parse_ok("let x = 1 + 2; fn f() => { x } x * 3");

    let mut ids = vec![];
    fn collect(expr: &Expr, ids: &mut Vec<usize>) {
        ids.push(expr.id);
        if let ExprKind::Binary { left, right, .. } = &expr.kind {
            collect(left, ids);
            collect(right, ids);
        }
    }
    for stmt in &program.statements {
        ids.push(stmt.id);
        if let StmtKind::Let { initializer, .. } = &stmt.kind {
            collect(initializer, &mut ids);
        }
    }
    collect(program.final_expression.as_ref().unwrap(), &mut ids);
    collect(program.functions[0].body.result.as_ref().unwrap(), &mut ids);

    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
    assert!(ids.iter().all(|id| *id < program.node_count));
}

#[test]
fn test_binary_operator_kinds() {
    match final_expr("a < b").kind {
        ExprKind::Binary { operator, .. } => assert_eq!(operator, BinaryOp::Less),
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_error_trailing_tokens_after_final_expression() {
    let (program, errors) = parse_source("1 + 2 let x = 3;");

    assert!(program.final_expression.is_some());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "TrailingTokens");
}

#[test]
fn test_error_missing_semicolon_in_block() {
    let (_, errors) = parse_source("{ 1 2 }");

    assert_eq!(errors.len(), 2);
    assert!(errors[0].to_string().contains("expected '}' to close block"));
}

#[test]
fn test_error_non_identifier_callee() {
    let (_, errors) = parse_source("f(1)(2)");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "InvalidCallee");
}

#[test]
fn test_error_integer_overflow() {
    let (program, errors) = parse_source("2147483648");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "NumberParseError");
    assert!(matches!(
        program.final_expression.unwrap().kind,
        ExprKind::LiteralInt(0)
    ));
}

#[test]
fn test_error_recovery_continues_after_bad_statement() {
    let (program, errors) = parse_source("let x = ; let y = 2; y");

    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("unexpected token in expression"));
    assert_eq!(program.statements.len(), 2);
    assert!(program.final_expression.is_some());
}

#[test]
fn test_error_if_without_else() {
    let (_, errors) = parse_source("if (true) 1");

    assert!(!errors.is_empty());
    assert!(errors[0].to_string().contains("expected 'else'"));
}
