use std::sync::Arc;

use crate::{
    ast::{expressions::Expr, statements::Stmt},
    errors::errors::Error,
};

use super::{
    symbols::{FunctionId, FunctionSymbol, VariableId, VariableSymbol},
    types::{StructType, Type},
};

/// Everything semantic analysis learned about a program.
///
/// The per-node tables are indexed by `NodeId`. Symbols live in arenas and
/// are referred to by index, so the tables stay plain `Copy` data.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub expression_types: Vec<Option<Type>>,
    /// Identifier expressions, and calls through function-typed variables.
    pub identifier_bindings: Vec<Option<VariableId>>,
    pub let_bindings: Vec<Option<VariableId>>,
    /// Targets of assignment and increment statements.
    pub target_bindings: Vec<Option<VariableId>>,
    /// Identifier expressions naming a function, and direct calls.
    pub function_references: Vec<Option<FunctionId>>,
    pub variables: Vec<VariableSymbol>,
    /// Global variables in declaration order.
    pub globals: Vec<VariableId>,
    /// Intrinsics first, then functions, each in declaration order.
    pub functions: Vec<FunctionSymbol>,
    pub structs: Vec<Arc<StructType>>,
    /// Type of the top-level final expression, if there is one.
    pub final_type: Option<Type>,
    pub errors: Vec<Error>,
}

impl AnalysisResult {
    pub fn new(node_count: usize) -> Self {
        AnalysisResult {
            expression_types: vec![None; node_count],
            identifier_bindings: vec![None; node_count],
            let_bindings: vec![None; node_count],
            target_bindings: vec![None; node_count],
            function_references: vec![None; node_count],
            variables: vec![],
            globals: vec![],
            functions: vec![],
            structs: vec![],
            final_type: None,
            errors: vec![],
        }
    }

    /// The recorded type of `expr`, `I32` if analysis never reached it.
    pub fn type_of(&self, expr: &Expr) -> Type {
        self.expression_types
            .get(expr.id)
            .cloned()
            .flatten()
            .unwrap_or(Type::I32)
    }

    pub fn variable_for(&self, expr: &Expr) -> Option<&VariableSymbol> {
        self.identifier_bindings
            .get(expr.id)
            .copied()
            .flatten()
            .map(|id| &self.variables[id])
    }

    pub fn function_for(&self, expr: &Expr) -> Option<&FunctionSymbol> {
        self.function_references
            .get(expr.id)
            .copied()
            .flatten()
            .map(|id| &self.functions[id])
    }

    pub fn let_variable(&self, stmt: &Stmt) -> Option<&VariableSymbol> {
        self.let_bindings
            .get(stmt.id)
            .copied()
            .flatten()
            .map(|id| &self.variables[id])
    }

    pub fn target_variable(&self, stmt: &Stmt) -> Option<&VariableSymbol> {
        self.target_bindings
            .get(stmt.id)
            .copied()
            .flatten()
            .map(|id| &self.variables[id])
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSymbol> {
        self.functions.iter().find(|function| function.name == name)
    }

    pub fn global_variables(&self) -> impl Iterator<Item = &VariableSymbol> {
        self.globals.iter().map(|id| &self.variables[*id])
    }

    pub fn struct_type(&self, name: &str) -> Option<&Arc<StructType>> {
        self.structs.iter().find(|structure| structure.name == name)
    }
}
