use crate::{
    ast::expressions::{BinaryOp, Expr, ExprKind, UnaryOp},
    errors::errors::ErrorImpl,
    lexer::tokens::{Token, TokenKind},
};

use super::{lookups::BindingPower, parser::Parser, stmt::parse_block};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Expr {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return parse_unexpected_expr(parser),
    };

    let left = nud(parser);
    parse_expr_from(parser, left, bp)
}

/// Folds infix operators onto an already parsed `left` operand.
pub fn parse_expr_from(parser: &mut Parser, mut left: Expr, bp: BindingPower) -> Expr {
    // Keep folding operators that bind tighter than the caller's binding power
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = parser
            .get_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);

        if next_bp <= bp {
            break;
        }

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => break,
        };

        left = led(parser, left, next_bp);
    }

    left
}

/// Reports a token that cannot start an expression and yields a placeholder.
fn parse_unexpected_expr(parser: &mut Parser) -> Expr {
    let token = parser.current_token().clone();
    parser.error(
        ErrorImpl::UnexpectedToken {
            token: token.value.clone(),
            message: String::from("unexpected token in expression"),
        },
        token.span.start.clone(),
    );
    parser.recover_past_unexpected();

    parser.make_expr(ExprKind::LiteralInt(0), token.span)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Expr {
    let token = parser.advance();

    match token.kind {
        TokenKind::Number => {
            let value = match token.value.parse::<i32>() {
                Ok(value) => value,
                Err(_) => {
                    parser.error(
                        ErrorImpl::NumberParseError {
                            token: token.value.clone(),
                        },
                        token.span.start.clone(),
                    );
                    0
                }
            };
            parser.make_expr(ExprKind::LiteralInt(value), token.span)
        }
        TokenKind::True => parser.make_expr(ExprKind::LiteralBool(true), token.span),
        TokenKind::False => parser.make_expr(ExprKind::LiteralBool(false), token.span),
        TokenKind::Identifier if parser.check(TokenKind::OpenCurly) => {
            parse_struct_literal_expr(parser, token)
        }
        _ => parser.make_expr(ExprKind::Identifier(token.value), token.span),
    }
}

/// `Name { a, b }`, entered with the name already consumed.
fn parse_struct_literal_expr(parser: &mut Parser, name: Token) -> Expr {
    parser.advance();

    let mut values = vec![];
    while !parser.check(TokenKind::CloseCurly) && parser.has_tokens() {
        values.push(parse_expr(parser, BindingPower::Default));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_error(TokenKind::CloseCurly, "expected '}' after struct values");

    let span = parser.span_from(&name.span.start);
    parser.make_expr(
        ExprKind::StructLiteral {
            name: name.value,
            values,
        },
        span,
    )
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Expr {
    let operator_token = parser.advance();
    let operator = match operator_token.kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Equals => BinaryOp::Equals,
        _ => BinaryOp::Less,
    };

    let right = parse_expr(parser, bp);
    let span = left.span.to(&right.span);

    parser.make_expr(
        ExprKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

/// Unary minus, dereference `*` and reference `&`.
pub fn parse_prefix_expr(parser: &mut Parser) -> Expr {
    let operator_token = parser.advance();
    let operand = Box::new(parse_expr(parser, BindingPower::Unary));
    let span = operator_token.span.to(&operand.span);

    let kind = match operator_token.kind {
        TokenKind::Star => ExprKind::Dereference(operand),
        TokenKind::Ampersand => ExprKind::Reference(operand),
        _ => ExprKind::Unary {
            operator: UnaryOp::Negate,
            operand,
        },
    };

    parser.make_expr(kind, span)
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Expr {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default);
    parser.expect_error(TokenKind::CloseParen, "expected ')' after expression");

    expr
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Expr {
    parser.advance();

    let mut arguments = vec![];
    while !parser.check(TokenKind::CloseParen) && parser.has_tokens() {
        arguments.push(parse_expr(parser, BindingPower::Default));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_error(TokenKind::CloseParen, "expected ')' after arguments");

    let callee = match &left.kind {
        ExprKind::Identifier(name) => name.clone(),
        _ => {
            parser.error(ErrorImpl::InvalidCallee, left.span.start.clone());
            return left;
        }
    };

    let span = parser.span_from(&left.span.start);
    parser.make_expr(ExprKind::Call { callee, arguments }, span)
}

pub fn parse_field_access_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Expr {
    parser.advance();
    let field = parser.expect_error(TokenKind::Identifier, "expected field name after '.'");

    let span = parser.span_from(&left.span.start);
    parser.make_expr(
        ExprKind::FieldAccess {
            object: Box::new(left),
            field: field.value,
        },
        span,
    )
}

/// `if (condition) then else otherwise`, both branches are mandatory.
pub fn parse_if_expr(parser: &mut Parser) -> Expr {
    let start = parser.advance();

    parser.expect_error(TokenKind::OpenParen, "expected '(' after 'if'");
    let condition = parse_expr(parser, BindingPower::Default);
    parser.expect_error(TokenKind::CloseParen, "expected ')' after if condition");

    let then_expr = parse_expr(parser, BindingPower::Default);
    parser.expect_error(
        TokenKind::Else,
        "expected 'else', if expressions need both branches",
    );
    let else_expr = parse_expr(parser, BindingPower::Default);

    let span = parser.span_from(&start.span.start);
    parser.make_expr(
        ExprKind::If {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        },
        span,
    )
}

pub fn parse_block_expr(parser: &mut Parser) -> Expr {
    let block = parse_block(parser);
    let span = block.span.clone();

    parser.make_expr(ExprKind::Block(block), span)
}
