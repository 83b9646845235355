use std::fmt::Display;

use crate::Span;

use super::{
    ast::{Block, NodeId},
    expressions::Expr,
    types::TypeRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        }
    }
}

impl Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Let {
        mutable: bool,
        name: String,
        annotation: Option<TypeRef>,
        initializer: Expr,
    },
    Assignment {
        name: String,
        operator: AssignOp,
        value: Expr,
    },
    Increment {
        name: String,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Block(Block),
    Expression(Expr),
    Return(Option<Expr>),
    StructDecl {
        name: String,
        fields: Vec<(String, TypeRef)>,
    },
}

/// `fn name(a: T, ...) : R => body`
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub parameters: Vec<(String, TypeRef)>,
    /// `I32` when omitted.
    pub return_type: Option<TypeRef>,
    pub body: Block,
    pub span: Span,
}

/// `intrinsic fn name(T, ...) : R;`, a signature whose body the runtime supplies.
#[derive(Debug, Clone)]
pub struct IntrinsicDecl {
    pub name: String,
    pub parameter_types: Vec<TypeRef>,
    /// `Void` when omitted.
    pub return_type: Option<TypeRef>,
    pub span: Span,
}
