//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a flat stream of tokens for parsing. It handles:
//!
//! - Single-character punctuation through a dispatch table
//! - Operators that may extend (`+`, `+=`, `++`, ...) through ordered regex patterns
//! - Recognition of keywords, identifiers and integer literals
//! - Token position tracking for error reporting
//! - Line comments and whitespace

pub mod lexer;
pub mod tokens;
