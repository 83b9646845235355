//! Semantic analysis.
//!
//! Analysis walks the parsed program once, without rewriting it, and records
//! what it learns in an [`analysis::AnalysisResult`]:
//!
//! - the type of every expression
//! - which variable or function each name refers to
//! - the C names that declarations will be emitted under
//!
//! Structs and function signatures are registered up front so they can be
//! used before their declaration. Top-level statements are checked next, in
//! the global scope, followed by every function body. Errors are collected
//! rather than returned, so one run reports as many as it can.

pub mod analysis;
pub mod symbols;
pub mod type_checker;
pub mod types;
