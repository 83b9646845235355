//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Primitive types (`I32`, `Bool`, `Void`)
//! - Struct types (identifiers)
//! - Pointer types (`*T`)
//! - Function types (`(T, ...) => R`)
//!
//! Similar to expression parsing, it dispatches on the leading token through
//! a NUD lookup table. Types are built as structured `TypeRef` trees.

use std::collections::HashMap;

use crate::{
    ast::types::{TypeRef, TypeRefKind},
    errors::errors::ErrorImpl,
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> TypeRef;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
///
/// # Arguments
///
/// * `parser` - Mutable reference to the parser to initialize
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::I32, parse_symbol_type);
    parser.type_nud(TokenKind::Bool, parse_symbol_type);
    parser.type_nud(TokenKind::Void, parse_symbol_type);
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::Star, parse_pointer_type);
    parser.type_nud(TokenKind::OpenParen, parse_function_type);
}

pub fn parse_type(parser: &mut Parser) -> TypeRef {
    let token_kind = parser.current_token_kind();

    match parser.get_type_nud_lookup().get(&token_kind).copied() {
        Some(handler) => handler(parser),
        None => {
            let token = parser.current_token().clone();
            parser.error(
                ErrorImpl::UnexpectedToken {
                    token: token.value,
                    message: String::from("expected type"),
                },
                token.span.start.clone(),
            );
            parser.recover_past_unexpected();

            TypeRef::named("I32", token.span)
        }
    }
}

pub fn parse_symbol_type(parser: &mut Parser) -> TypeRef {
    let token = parser.advance();
    TypeRef::named(&token.value, token.span)
}

pub fn parse_pointer_type(parser: &mut Parser) -> TypeRef {
    let start = parser.advance();
    let pointee = parse_type(parser);

    TypeRef {
        span: start.span.to(&pointee.span),
        kind: TypeRefKind::Pointer(Box::new(pointee)),
    }
}

pub fn parse_function_type(parser: &mut Parser) -> TypeRef {
    let start = parser.advance();

    let mut parameters = vec![];
    while !parser.check(TokenKind::CloseParen) && parser.has_tokens() {
        parameters.push(parse_type(parser));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_error(TokenKind::CloseParen, "expected ')' after parameter types");
    parser.expect_error(TokenKind::Arrow, "expected '=>' in function type");
    let return_type = parse_type(parser);

    TypeRef {
        span: start.span.to(&return_type.span),
        kind: TypeRefKind::Function {
            parameters,
            return_type: Box::new(return_type),
        },
    }
}
