//! Error types and error handling for the compiler.
//!
//! This module defines the error types shared by every compilation stage.
//! It includes:
//!
//! - Error structures with source position information
//! - One error variant per diagnostic the lexer, parser and analyzer emit
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions
//!
//! Stages never abort on an error. They push it onto their own list and keep
//! going, so a single run reports everything it can find.

pub mod errors;

#[cfg(test)]
mod tests;
