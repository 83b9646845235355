//! Code generation module for the compiler.
//!
//! This module turns an analysed program into a single C translation unit.
//! It handles:
//!
//! - Lowering expressions into a value plus the statements it depends on
//! - Statements, control flow and function bodies
//! - C declarators for pointer, struct and function-pointer types
//! - Runtime helpers for intrinsics
//!
//! Generation trusts the analysis result and must only run on a program
//! that analysed without errors.

pub mod compiler;
pub mod expr;
pub mod stdlib;
pub mod stmt;

#[cfg(test)]
mod tests;
