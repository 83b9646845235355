//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statement parsing.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix and postfix expressions
//! - Binding powers for operator precedence
//! - Type parsing handlers
//!
//! Parsing never stops at the first problem. Errors are recorded on the
//! parser and a synthetic token or placeholder node stands in, so one run
//! reports as many errors as it can.

use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    ast::{
        ast::Program,
        expressions::{Expr, ExprKind},
        statements::{Stmt, StmtKind},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::{parse_fn_decl, parse_intrinsic_decl, parse_stmt_or_final, StmtOrFinal},
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// The main parser structure that maintains parsing state.
///
/// This struct holds the token stream and maintains lookup tables for
/// parsing statements, expressions, and types. It tracks the current
/// position in the token stream and provides methods for token consumption.
pub struct Parser {
    /// The list of tokens to parse, always terminated by `EOF`
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Lookup table for type null denotation handlers
    type_nud_lookup: TypeNUDLookup,
    /// Counter for generating node ids
    current_id: usize,
    /// End of the most recently consumed token
    previous_end: Position,
    /// Errors recorded so far
    errors: Vec<Error>,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Vector of tokens to parse
    /// * `file` - Shared string containing the source file name
    ///
    /// # Returns
    ///
    /// A new Parser instance ready to parse the token stream.
    pub fn new(mut tokens: Vec<Token>, file: Arc<String>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|t| t.span.end.clone())
                .unwrap_or_else(|| Position(0, Arc::clone(&file)));
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span {
                    start: end.clone(),
                    end,
                },
            });
        }

        Parser {
            tokens,
            pos: 0,
            previous_end: Position(0, file),
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
            current_id: 0,
            errors: vec![],
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the kind of the token `offset` places ahead, clamped to `EOF`.
    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        self.tokens[index].kind
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// The cursor never moves past `EOF`.
    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::EOF {
            self.pos += 1;
        }
        self.previous_end = token.span.end.clone();
        token
    }

    /// Returns true if the current token has the given kind.
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_token_kind() == kind
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a token of the specified kind, reporting `message` otherwise.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    /// * `message` - What the parser was looking for, used in the error
    ///
    /// # Returns
    ///
    /// The consumed token, or a synthetic token of the expected kind placed
    /// at the current position when the expectation fails. The cursor does
    /// not move in the failing case.
    pub fn expect_error(&mut self, expected_kind: TokenKind, message: &str) -> Token {
        if self.check(expected_kind) {
            return self.advance();
        }

        let token = self.current_token().clone();
        self.error(
            ErrorImpl::UnexpectedToken {
                token: token.value.clone(),
                message: message.to_string(),
            },
            token.span.start.clone(),
        );

        Token {
            kind: expected_kind,
            value: String::new(),
            span: Span {
                start: token.span.start.clone(),
                end: token.span.start,
            },
        }
    }

    /// Skips the current token after a failed expression or type, unless it
    /// is a token an enclosing construct is waiting for.
    pub fn recover_past_unexpected(&mut self) {
        let stop = matches!(
            self.current_token_kind(),
            TokenKind::EOF | TokenKind::CloseCurly | TokenKind::CloseParen | TokenKind::Semicolon
        );
        if !stop {
            self.advance();
        }
    }

    /// Checks if there are more tokens to parse.
    ///
    /// # Returns
    ///
    /// Returns true if the current token is not EOF.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Returns a reference to the type NUD lookup table.
    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `binding_power` - The precedence/binding power for this operator
    /// * `led_fn` - The handler function for this infix operator
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// A token may have both a NUD and a LED (`-`, `*`, `(`), so this leaves
    /// the binding power table alone.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers a type null denotation handler.
    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Advances the internal ID counter and returns the previous value.
    ///
    /// # Returns
    ///
    /// The current ID value before incrementing.
    pub fn advance_id(&mut self) -> usize {
        let id = self.current_id;
        self.current_id += 1;
        id
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: &Position) -> Span {
        Span {
            start: start.clone(),
            end: self.previous_end.clone(),
        }
    }

    pub fn error(&mut self, error: ErrorImpl, position: Position) {
        self.errors.push(Error::new(error, position));
    }

    pub fn make_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr {
            id: self.advance_id(),
            kind,
            span,
        }
    }

    pub fn make_stmt(&mut self, kind: StmtKind, span: Span) -> Stmt {
        Stmt {
            id: self.advance_id(),
            kind,
            span,
        }
    }
}

/// Parses a stream of tokens into a `Program`.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses declarations and statements
/// until EOF or the top-level final expression.
///
/// # Arguments
///
/// * `tokens` - Vector of tokens to parse
/// * `file` - Shared string containing the source file name
///
/// # Returns
///
/// The program (complete even when errors occurred, with placeholders where
/// input was malformed) and every parse error found.
pub fn parse(tokens: Vec<Token>, file: Arc<String>) -> (Program, Vec<Error>) {
    let mut parser = Parser::new(tokens, file);
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let mut intrinsics = vec![];
    let mut functions = vec![];
    let mut statements = vec![];
    let mut final_expression = None;

    while parser.has_tokens() {
        match parser.current_token_kind() {
            TokenKind::Intrinsic => intrinsics.push(parse_intrinsic_decl(&mut parser)),
            TokenKind::Fn => functions.push(parse_fn_decl(&mut parser)),
            _ => match parse_stmt_or_final(&mut parser) {
                StmtOrFinal::Stmt(stmt) => statements.push(stmt),
                StmtOrFinal::Final(expr) => {
                    final_expression = Some(expr);
                    break;
                }
            },
        }
    }

    if parser.has_tokens() {
        let token = parser.current_token().clone();
        parser.error(
            ErrorImpl::TrailingTokens { token: token.value },
            token.span.start,
        );
    }

    let program = Program {
        intrinsics,
        functions,
        statements,
        final_expression,
        node_count: parser.current_id,
    };

    debug!(
        nodes = program.node_count,
        functions = program.functions.len(),
        errors = parser.errors.len(),
        "parsed program"
    );

    (program, parser.errors)
}
