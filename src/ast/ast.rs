use crate::Span;

use super::{
    expressions::Expr,
    statements::{FunctionDecl, IntrinsicDecl, Stmt},
};

/// Stable index of an expression or statement node.
///
/// Ids are handed out by the parser in construction order, starting at zero,
/// so analysis results can be stored in plain vectors indexed by id.
pub type NodeId = usize;

/// The root of a parsed source file.
#[derive(Debug, Clone)]
pub struct Program {
    pub intrinsics: Vec<IntrinsicDecl>,
    pub functions: Vec<FunctionDecl>,
    /// Top-level statements, executed in order by `main`.
    pub statements: Vec<Stmt>,
    /// Its value becomes the process exit status.
    pub final_expression: Option<Expr>,
    /// One past the largest id handed out while parsing.
    pub node_count: usize,
}

/// A braced sequence of statements with an optional trailing value.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub result: Option<Box<Expr>>,
    pub span: Span,
}
