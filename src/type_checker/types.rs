//! Resolved types.
//!
//! Equality is structural for primitives, pointers and function types, and
//! nominal for structs: two struct types are equal when their names are.

use std::{fmt::Display, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    I32,
    Bool,
    Void,
}

#[derive(Debug)]
pub struct StructType {
    pub name: String,
    /// Fields in declaration order, which is also the literal value order.
    pub fields: Vec<(String, Type)>,
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }
}

#[derive(Debug, Clone)]
pub enum Type {
    Primitive(Primitive),
    Pointer(Box<Type>),
    Function {
        parameters: Vec<Type>,
        return_type: Box<Type>,
    },
    Struct(Arc<StructType>),
}

impl Type {
    pub const I32: Type = Type::Primitive(Primitive::I32);
    pub const BOOL: Type = Type::Primitive(Primitive::Bool);
    pub const VOID: Type = Type::Primitive(Primitive::Void);

    pub fn pointer_to(pointee: Type) -> Type {
        Type::Pointer(Box::new(pointee))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::I32))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Bool))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Void))
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Pointer(a), Type::Pointer(b)) => a == b,
            (
                Type::Function {
                    parameters: a_params,
                    return_type: a_ret,
                },
                Type::Function {
                    parameters: b_params,
                    return_type: b_ret,
                },
            ) => a_params == b_params && a_ret == b_ret,
            (Type::Struct(a), Type::Struct(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive(Primitive::I32) => write!(f, "I32"),
            Type::Primitive(Primitive::Bool) => write!(f, "Bool"),
            Type::Primitive(Primitive::Void) => write!(f, "Void"),
            Type::Pointer(pointee) => write!(f, "*{}", pointee),
            Type::Function {
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
            Type::Struct(structure) => write!(f, "{}", structure.name),
        }
    }
}
