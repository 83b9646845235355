use crate::{
    ast::{
        ast::Block,
        expressions::{Expr, ExprKind},
        statements::{AssignOp, FunctionDecl, IntrinsicDecl, Stmt, StmtKind},
    },
    lexer::tokens::TokenKind,
    parser::{
        expr::{parse_expr, parse_expr_from},
        lookups::BindingPower,
    },
};

use super::{parser::Parser, types::parse_type};

/// What a position inside a block turned out to hold.
pub enum StmtOrFinal {
    Stmt(Stmt),
    /// An expression not followed by `;`, the value of the enclosing block.
    Final(Expr),
}

/// Parses one statement, or the final expression of the enclosing block.
///
/// Statement keywords are tried first, then `name++` and `name op= value`
/// by lookahead, then a block. A block with a result value continues as
/// the left operand of an expression. Anything else is an expression,
/// which becomes an expression statement if a `;` follows it.
pub fn parse_stmt_or_final(parser: &mut Parser) -> StmtOrFinal {
    let kind = parser.current_token_kind();

    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
        return StmtOrFinal::Stmt(handler(parser));
    }

    if kind == TokenKind::Identifier {
        let next = parser.peek_kind(1);
        if next == TokenKind::PlusPlus {
            return StmtOrFinal::Stmt(parse_increment_stmt(parser));
        }
        if next.is_assignment() {
            return StmtOrFinal::Stmt(parse_assignment_stmt(parser));
        }
    }

    if kind == TokenKind::OpenCurly {
        let block = parse_block(parser);
        let span = block.span.clone();

        if block.result.is_none() {
            parser.eat(TokenKind::Semicolon);
            return StmtOrFinal::Stmt(parser.make_stmt(StmtKind::Block(block), span));
        }

        let block_expr = parser.make_expr(ExprKind::Block(block), span);
        let expr = parse_expr_from(parser, block_expr, BindingPower::Default);
        return finish_expression(parser, expr);
    }

    let expr = parse_expr(parser, BindingPower::Default);
    finish_expression(parser, expr)
}

fn finish_expression(parser: &mut Parser, expr: Expr) -> StmtOrFinal {
    if parser.eat(TokenKind::Semicolon) {
        let span = parser.span_from(&expr.span.start);
        StmtOrFinal::Stmt(parser.make_stmt(StmtKind::Expression(expr), span))
    } else {
        StmtOrFinal::Final(expr)
    }
}

/// Parses `{ statements... [final] }`.
pub fn parse_block(parser: &mut Parser) -> Block {
    let start = parser.expect_error(TokenKind::OpenCurly, "expected '{' to open block");

    let mut statements = vec![];
    let mut result = None;

    while !parser.check(TokenKind::CloseCurly) && parser.has_tokens() {
        match parse_stmt_or_final(parser) {
            StmtOrFinal::Stmt(stmt) => statements.push(stmt),
            StmtOrFinal::Final(expr) => {
                result = Some(Box::new(expr));
                break;
            }
        }
    }

    parser.expect_error(TokenKind::CloseCurly, "expected '}' to close block");

    Block {
        statements,
        result,
        span: parser.span_from(&start.span.start),
    }
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Stmt {
    let start_token = parser.advance();
    let mutable = parser.eat(TokenKind::Mut);

    let name = parser
        .expect_error(TokenKind::Identifier, "expected identifier during variable declaration")
        .value;

    let annotation = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser))
    } else {
        None
    };

    parser.expect_error(TokenKind::Assignment, "expected '=' in let statement");
    let initializer = parse_expr(parser, BindingPower::Default);
    parser.expect_error(TokenKind::Semicolon, "expected ';' after let statement");

    let span = parser.span_from(&start_token.span.start);
    parser.make_stmt(
        StmtKind::Let {
            mutable,
            name,
            annotation,
            initializer,
        },
        span,
    )
}

pub fn parse_return_stmt(parser: &mut Parser) -> Stmt {
    let start_token = parser.advance();

    let value = if parser.check(TokenKind::Semicolon) {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default))
    };

    parser.expect_error(TokenKind::Semicolon, "expected ';' after return statement");

    let span = parser.span_from(&start_token.span.start);
    parser.make_stmt(StmtKind::Return(value), span)
}

pub fn parse_while_stmt(parser: &mut Parser) -> Stmt {
    let start_token = parser.advance();

    parser.expect_error(TokenKind::OpenParen, "expected '(' after 'while'");
    let condition = parse_expr(parser, BindingPower::Default);
    parser.expect_error(TokenKind::CloseParen, "expected ')' after while condition");

    let body = Box::new(parse_loop_body(parser));

    let span = parser.span_from(&start_token.span.start);
    parser.make_stmt(StmtKind::While { condition, body }, span)
}

/// A loop body is a block or a single statement.
fn parse_loop_body(parser: &mut Parser) -> Stmt {
    if parser.check(TokenKind::OpenCurly) {
        let block = parse_block(parser);
        let span = block.span.clone();
        return parser.make_stmt(StmtKind::Block(block), span);
    }

    match parse_stmt_or_final(parser) {
        StmtOrFinal::Stmt(stmt) => stmt,
        StmtOrFinal::Final(expr) => {
            parser.expect_error(TokenKind::Semicolon, "expected ';' after loop body");
            let span = expr.span.clone();
            parser.make_stmt(StmtKind::Expression(expr), span)
        }
    }
}

pub fn parse_struct_decl_stmt(parser: &mut Parser) -> Stmt {
    let start_token = parser.advance();

    let name = parser
        .expect_error(TokenKind::Identifier, "expected struct name")
        .value;
    parser.expect_error(TokenKind::OpenCurly, "expected '{' after struct name");

    let mut fields = vec![];
    while !parser.check(TokenKind::CloseCurly) && parser.has_tokens() {
        let field = parser.expect_error(TokenKind::Identifier, "expected field name");
        parser.expect_error(TokenKind::Colon, "expected ':' after field name");
        let field_type = parse_type(parser);
        fields.push((field.value, field_type));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_error(TokenKind::CloseCurly, "expected '}' after struct fields");
    parser.eat(TokenKind::Semicolon);

    let span = parser.span_from(&start_token.span.start);
    parser.make_stmt(StmtKind::StructDecl { name, fields }, span)
}

fn parse_increment_stmt(parser: &mut Parser) -> Stmt {
    let name = parser.advance();
    parser.advance();
    parser.expect_error(TokenKind::Semicolon, "expected ';' after increment");

    let span = parser.span_from(&name.span.start);
    parser.make_stmt(StmtKind::Increment { name: name.value }, span)
}

fn parse_assignment_stmt(parser: &mut Parser) -> Stmt {
    let name = parser.advance();
    let operator = match parser.advance().kind {
        TokenKind::PlusEquals => AssignOp::Add,
        TokenKind::MinusEquals => AssignOp::Sub,
        TokenKind::StarEquals => AssignOp::Mul,
        TokenKind::SlashEquals => AssignOp::Div,
        _ => AssignOp::Assign,
    };

    let value = parse_expr(parser, BindingPower::Default);
    parser.expect_error(TokenKind::Semicolon, "expected ';' after assignment");

    let span = parser.span_from(&name.span.start);
    parser.make_stmt(
        StmtKind::Assignment {
            name: name.value,
            operator,
            value,
        },
        span,
    )
}

/// `fn name(a: T, ...) [: R] => body`
///
/// The body is a block, a single `return` statement, or an expression
/// terminated by `;` which becomes the body's value.
pub fn parse_fn_decl(parser: &mut Parser) -> FunctionDecl {
    let start_token = parser.advance();

    let name = parser
        .expect_error(TokenKind::Identifier, "expected function name")
        .value;
    parser.expect_error(TokenKind::OpenParen, "expected '(' after function name");

    let mut parameters = vec![];
    while !parser.check(TokenKind::CloseParen) && parser.has_tokens() {
        let parameter = parser.expect_error(TokenKind::Identifier, "expected parameter name");
        parser.expect_error(TokenKind::Colon, "expected ':' after parameter name");
        let parameter_type = parse_type(parser);
        parameters.push((parameter.value, parameter_type));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_error(TokenKind::CloseParen, "expected ')' after parameters");

    let return_type = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser))
    } else {
        None
    };

    parser.expect_error(TokenKind::Arrow, "expected '=>' before function body");
    let body = parse_fn_body(parser);

    FunctionDecl {
        name,
        parameters,
        return_type,
        body,
        span: parser.span_from(&start_token.span.start),
    }
}

fn parse_fn_body(parser: &mut Parser) -> Block {
    if parser.check(TokenKind::OpenCurly) {
        return parse_block(parser);
    }

    if parser.check(TokenKind::Return) {
        let stmt = parse_return_stmt(parser);
        let span = stmt.span.clone();
        return Block {
            statements: vec![stmt],
            result: None,
            span,
        };
    }

    let expr = parse_expr(parser, BindingPower::Default);
    parser.expect_error(TokenKind::Semicolon, "expected ';' after function body");

    Block {
        span: expr.span.clone(),
        statements: vec![],
        result: Some(Box::new(expr)),
    }
}

/// `intrinsic fn name(T, ...) [: R];`
///
/// Parameters are usually bare types; a `name:` prefix is accepted and
/// ignored.
pub fn parse_intrinsic_decl(parser: &mut Parser) -> IntrinsicDecl {
    let start_token = parser.advance();

    parser.expect_error(TokenKind::Fn, "expected 'fn' after 'intrinsic'");
    let name = parser
        .expect_error(TokenKind::Identifier, "expected intrinsic name")
        .value;
    parser.expect_error(TokenKind::OpenParen, "expected '(' after intrinsic name");

    let mut parameter_types = vec![];
    while !parser.check(TokenKind::CloseParen) && parser.has_tokens() {
        if parser.check(TokenKind::Identifier) && parser.peek_kind(1) == TokenKind::Colon {
            parser.advance();
            parser.advance();
        }
        parameter_types.push(parse_type(parser));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_error(TokenKind::CloseParen, "expected ')' after intrinsic parameters");

    let return_type = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser))
    } else {
        None
    };

    parser.expect_error(TokenKind::Semicolon, "expected ';' after intrinsic declaration");

    IntrinsicDecl {
        name,
        parameter_types,
        return_type,
        span: parser.span_from(&start_token.span.start),
    }
}
