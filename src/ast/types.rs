//! Type annotations as written in source.
//!
//! The parser builds these directly from the grammar, including pointer and
//! function types, so nothing downstream has to re-read type text. The type
//! checker later resolves them into concrete `Type`s.

use std::fmt::Display;

use crate::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRefKind {
    /// `I32`, `Bool`, `Void` or a struct name.
    Named(String),
    /// `*T`
    Pointer(Box<TypeRef>),
    /// `(T, ...) => R`
    Function {
        parameters: Vec<TypeRef>,
        return_type: Box<TypeRef>,
    },
}

impl TypeRef {
    pub fn named(name: &str, span: Span) -> Self {
        TypeRef {
            kind: TypeRefKind::Named(name.to_string()),
            span,
        }
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeRefKind::Named(name) => write!(f, "{}", name),
            TypeRefKind::Pointer(pointee) => write!(f, "*{}", pointee),
            TypeRefKind::Function {
                parameters,
                return_type,
            } => {
                let parameters = parameters
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({}) => {}", parameters, return_type)
            }
        }
    }
}
