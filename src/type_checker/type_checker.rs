use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{Block, NodeId, Program},
        expressions::{BinaryOp, Expr, ExprKind, UnaryOp},
        statements::{AssignOp, Stmt, StmtKind},
        types::{TypeRef, TypeRefKind},
    },
    compiler::stdlib::lookup_intrinsic,
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    analysis::AnalysisResult,
    symbols::{
        c_safe_name, emits_function_name, function_emitted_name, FunctionId, FunctionSymbol,
        VariableId, VariableSymbol,
    },
    types::{StructType, Type},
};

/// The function whose body is being checked.
#[derive(Debug)]
struct FunctionContext {
    name: String,
    return_type: Type,
    saw_return: bool,
}

pub struct TypeChecker<'a> {
    program: &'a Program,
    pub result: AnalysisResult,
    /// Innermost scope last. Empty only between passes.
    scopes: Vec<HashMap<String, VariableId>>,
    function_lookup: HashMap<String, FunctionId>,
    struct_lookup: HashMap<String, usize>,
    /// Latest declaration of each global, so later top-level lets shadow
    /// earlier ones while function bodies see whichever was declared last.
    global_lookup: HashMap<String, VariableId>,
    current_function: Option<FunctionContext>,
    global_counter: usize,
    rename_counter: usize,
}

impl<'a> TypeChecker<'a> {
    pub fn new(program: &'a Program) -> Self {
        TypeChecker {
            program,
            result: AnalysisResult::new(program.node_count),
            scopes: vec![],
            function_lookup: HashMap::new(),
            struct_lookup: HashMap::new(),
            global_lookup: HashMap::new(),
            current_function: None,
            global_counter: 0,
            rename_counter: 0,
        }
    }

    pub fn error(&mut self, error: ErrorImpl, position: &Position) {
        self.result.errors.push(Error::new(error, position.clone()));
    }

    /// Runs `f` inside a fresh innermost scope.
    pub fn in_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push(HashMap::new());
        trace!(depth = self.scopes.len(), "entered scope");
        let value = f(self);
        self.scopes.pop();
        trace!(depth = self.scopes.len(), "left scope");
        value
    }

    fn is_global_scope(&self) -> bool {
        self.current_function.is_none() && self.scopes.len() == 1
    }

    fn declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map(|scope| scope.contains_key(name))
            .unwrap_or(false)
    }

    pub fn lookup_variable(&self, name: &str) -> Option<VariableId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
            .or_else(|| self.global_lookup.get(name).copied())
    }

    fn rename(&mut self, name: &str) -> String {
        self.rename_counter += 1;
        format!("{}__s{}", c_safe_name(name), self.rename_counter)
    }

    /// C name for a new local. Locals that would hide another local, or an
    /// emitted function name, get a fresh name so C scoping never has to
    /// agree with ours.
    fn local_emitted_name(&mut self, name: &str) -> String {
        let hides_local = self.scopes.iter().any(|scope| {
            scope
                .get(name)
                .map(|id| !self.result.variables[*id].is_global)
                .unwrap_or(false)
        });

        let safe = c_safe_name(name);
        if hides_local || emits_function_name(&self.result.functions, &safe) {
            self.rename(name)
        } else {
            safe
        }
    }

    fn bind(&mut self, name: &str, symbol: VariableSymbol) -> VariableId {
        let id = self.result.variables.len();
        let is_global = symbol.is_global;
        trace!(name, emitted = %symbol.emitted_name, ty = %symbol.ty, "declared variable");
        self.result.variables.push(symbol);

        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), id);
        }
        if is_global {
            self.result.globals.push(id);
            self.global_lookup.insert(name.to_string(), id);
        }
        id
    }

    pub fn declare_variable(&mut self, name: &str, ty: Type, mutable: bool) -> VariableId {
        let is_global = self.is_global_scope();
        let emitted_name = if is_global {
            self.global_counter += 1;
            format!("g_{}_{}", name, self.global_counter)
        } else {
            self.local_emitted_name(name)
        };

        self.bind(
            name,
            VariableSymbol {
                name: name.to_string(),
                ty,
                mutable,
                is_global,
                emitted_name,
            },
        )
    }

    fn bind_parameter(&mut self, name: &str, ty: Type, emitted_name: String) -> VariableId {
        self.bind(
            name,
            VariableSymbol {
                name: name.to_string(),
                ty,
                mutable: false,
                is_global: false,
                emitted_name,
            },
        )
    }

    /// Resolves a written type. `Void` is only accepted where `allow_void`
    /// says so, which is return positions.
    pub fn resolve_type(&mut self, type_ref: &TypeRef, allow_void: bool) -> Type {
        match &type_ref.kind {
            TypeRefKind::Named(name) => match name.as_str() {
                "I32" => Type::I32,
                "Bool" => Type::BOOL,
                "Void" if allow_void => Type::VOID,
                "Void" => {
                    self.error(
                        ErrorImpl::VoidNotAllowed {
                            context: String::from("here, only as a return type"),
                        },
                        &type_ref.span.start,
                    );
                    Type::I32
                }
                _ => match self.struct_lookup.get(name) {
                    Some(index) => Type::Struct(Arc::clone(&self.result.structs[*index])),
                    None => {
                        self.error(
                            ErrorImpl::UnknownType {
                                type_: name.clone(),
                            },
                            &type_ref.span.start,
                        );
                        Type::I32
                    }
                },
            },
            TypeRefKind::Pointer(pointee) => Type::pointer_to(self.resolve_type(pointee, false)),
            TypeRefKind::Function {
                parameters,
                return_type,
            } => Type::Function {
                parameters: parameters
                    .iter()
                    .map(|parameter| self.resolve_type(parameter, false))
                    .collect(),
                return_type: Box::new(self.resolve_type(return_type, true)),
            },
        }
    }

    pub fn register_struct(&mut self, name: &str, fields: &[(String, TypeRef)], position: &Position) {
        if self.struct_lookup.contains_key(name) {
            self.error(
                ErrorImpl::StructAlreadyDeclared {
                    name: name.to_string(),
                },
                position,
            );
            return;
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(fields.len());
        for (field, type_ref) in fields {
            if !seen.insert(field.as_str()) {
                self.error(
                    ErrorImpl::DuplicateField {
                        name: name.to_string(),
                        field: field.clone(),
                    },
                    &type_ref.span.start,
                );
                continue;
            }
            resolved.push((field.clone(), self.resolve_type(type_ref, false)));
        }

        trace!(name, fields = resolved.len(), "registered struct");
        self.struct_lookup
            .insert(name.to_string(), self.result.structs.len());
        self.result.structs.push(Arc::new(StructType {
            name: name.to_string(),
            fields: resolved,
        }));
    }

    /// Struct names are program-global. Every declaration, however deeply
    /// nested, is registered in source order before anything else is looked at.
    fn register_structs(&mut self) {
        let program = self.program;
        let mut declarations = vec![];
        for function in &program.functions {
            collect_struct_decls_block(&function.body, &mut declarations);
        }
        for stmt in &program.statements {
            collect_struct_decls_stmt(stmt, &mut declarations);
        }
        if let Some(expr) = &program.final_expression {
            collect_struct_decls_expr(expr, &mut declarations);
        }
        declarations.sort_by_key(|stmt| stmt.span.start.0);

        for stmt in declarations {
            if let StmtKind::StructDecl { name, fields } = &stmt.kind {
                self.register_struct(name, fields, &stmt.span.start);
            }
        }
    }

    fn register_intrinsics(&mut self) {
        let program = self.program;
        for decl in &program.intrinsics {
            if self.function_lookup.contains_key(&decl.name) {
                self.error(
                    ErrorImpl::IntrinsicAlreadyDeclared {
                        function: decl.name.clone(),
                    },
                    &decl.span.start,
                );
                continue;
            }

            let parameter_types: Vec<Type> = decl
                .parameter_types
                .iter()
                .map(|parameter| self.resolve_type(parameter, false))
                .collect();
            let return_type = decl
                .return_type
                .as_ref()
                .map(|return_type| self.resolve_type(return_type, true))
                .unwrap_or(Type::VOID);

            let emitted_name = match lookup_intrinsic(&decl.name) {
                Some(known) => {
                    if (known.parameters)() != parameter_types || (known.return_type)() != return_type
                    {
                        self.error(
                            ErrorImpl::IntrinsicSignatureMismatch {
                                function: decl.name.clone(),
                                expected: known.signature(),
                            },
                            &decl.span.start,
                        );
                    }
                    known.emitted_name.to_string()
                }
                None => c_safe_name(&decl.name),
            };

            let parameter_names: Vec<String> = (0..parameter_types.len())
                .map(|index| format!("arg{}", index))
                .collect();

            self.function_lookup
                .insert(decl.name.clone(), self.result.functions.len());
            self.result.functions.push(FunctionSymbol {
                name: decl.name.clone(),
                emitted_parameter_names: parameter_names.clone(),
                parameter_names,
                parameter_types,
                return_type,
                is_intrinsic: true,
                declaration: None,
                emitted_name,
            });
        }
    }

    fn register_function_signatures(&mut self) {
        let program = self.program;
        for (index, decl) in program.functions.iter().enumerate() {
            if self.function_lookup.contains_key(&decl.name) {
                self.error(
                    ErrorImpl::FunctionAlreadyDeclared {
                        function: decl.name.clone(),
                    },
                    &decl.span.start,
                );
                continue;
            }

            let mut seen = HashSet::new();
            for (parameter, type_ref) in &decl.parameters {
                if !seen.insert(parameter.as_str()) {
                    self.error(
                        ErrorImpl::DuplicateParameter {
                            parameter: parameter.clone(),
                            function: decl.name.clone(),
                        },
                        &type_ref.span.start,
                    );
                }
            }

            let parameter_types = decl
                .parameters
                .iter()
                .map(|(_, type_ref)| self.resolve_type(type_ref, false))
                .collect();
            let return_type = decl
                .return_type
                .as_ref()
                .map(|return_type| self.resolve_type(return_type, true))
                .unwrap_or(Type::I32);

            self.function_lookup
                .insert(decl.name.clone(), self.result.functions.len());
            self.result.functions.push(FunctionSymbol {
                name: decl.name.clone(),
                parameter_names: decl.parameters.iter().map(|(name, _)| name.clone()).collect(),
                emitted_parameter_names: vec![],
                parameter_types,
                return_type,
                is_intrinsic: false,
                declaration: Some(index),
                emitted_name: function_emitted_name(&decl.name),
            });
        }

        // Parameters can only be named once every function name is known.
        for function_id in 0..self.result.functions.len() {
            if self.result.functions[function_id].is_intrinsic {
                continue;
            }
            let mut emitted = vec![];
            for parameter in &self.result.functions[function_id].parameter_names {
                let safe = c_safe_name(parameter);
                if emits_function_name(&self.result.functions, &safe) {
                    self.rename_counter += 1;
                    emitted.push(format!("{}__s{}", safe, self.rename_counter));
                } else {
                    emitted.push(safe);
                }
            }
            self.result.functions[function_id].emitted_parameter_names = emitted;
        }
    }

    fn check_top_level(&mut self) {
        let program = self.program;
        self.in_scope(|checker| {
            for stmt in &program.statements {
                type_check_stmt(checker, stmt);
            }

            if let Some(final_expression) = &program.final_expression {
                let mut final_type = type_check_expr(checker, final_expression);
                if final_type.is_void() {
                    checker.error(ErrorImpl::VoidFinalExpression, &final_expression.span.start);
                    final_type = Type::I32;
                } else if !final_type.is_numeric() && !final_type.is_bool() {
                    // Only scalars can be handed to exit()
                    checker.error(
                        ErrorImpl::InvalidExitValue {
                            received: final_type.to_string(),
                        },
                        &final_expression.span.start,
                    );
                    final_type = Type::I32;
                }
                checker.result.final_type = Some(final_type);
            }
        });
    }

    fn check_function_bodies(&mut self) {
        let program = self.program;
        for function_id in 0..self.result.functions.len() {
            let function = self.result.functions[function_id].clone();
            let Some(index) = function.declaration else {
                continue;
            };
            let decl = &program.functions[index];
            debug!(function = %function.name, "checking function body");

            // Function bodies see globals through `global_lookup` only.
            let saved_scopes = std::mem::take(&mut self.scopes);
            self.current_function = Some(FunctionContext {
                name: function.name.clone(),
                return_type: function.return_type.clone(),
                saw_return: false,
            });

            // Parameters share the outermost frame of the body.
            let result_type = self.in_scope(|checker| {
                for ((name, ty), emitted) in function
                    .parameter_names
                    .iter()
                    .zip(&function.parameter_types)
                    .zip(&function.emitted_parameter_names)
                {
                    checker.bind_parameter(name, ty.clone(), emitted.clone());
                }
                type_check_block(checker, &decl.body)
            });

            let saw_return = self
                .current_function
                .take()
                .map(|context| context.saw_return)
                .unwrap_or(false);
            self.scopes = saved_scopes;

            if function.return_type.is_void() {
                if let Some(result) = &decl.body.result {
                    self.error(
                        ErrorImpl::VoidFunctionResult {
                            function: function.name.clone(),
                        },
                        &result.span.start,
                    );
                }
                continue;
            }

            match (result_type, &decl.body.result) {
                (Some(result_type), Some(result)) if result_type != function.return_type => {
                    self.error(
                        ErrorImpl::ReturnTypeMismatch {
                            function: function.name.clone(),
                            expected: function.return_type.to_string(),
                            received: result_type.to_string(),
                        },
                        &result.span.start,
                    );
                }
                (None, _) if !saw_return => {
                    self.error(
                        ErrorImpl::MissingReturn {
                            function: function.name.clone(),
                        },
                        &decl.span.start,
                    );
                }
                _ => {}
            }
        }
    }
}

fn collect_struct_decls_block<'p>(block: &'p Block, out: &mut Vec<&'p Stmt>) {
    for stmt in &block.statements {
        collect_struct_decls_stmt(stmt, out);
    }
    if let Some(result) = &block.result {
        collect_struct_decls_expr(result, out);
    }
}

fn collect_struct_decls_stmt<'p>(stmt: &'p Stmt, out: &mut Vec<&'p Stmt>) {
    match &stmt.kind {
        StmtKind::StructDecl { .. } => out.push(stmt),
        StmtKind::Let { initializer: expr, .. }
        | StmtKind::Assignment { value: expr, .. }
        | StmtKind::Expression(expr)
        | StmtKind::Return(Some(expr)) => collect_struct_decls_expr(expr, out),
        StmtKind::While { condition, body } => {
            collect_struct_decls_expr(condition, out);
            collect_struct_decls_stmt(body, out);
        }
        StmtKind::Block(block) => collect_struct_decls_block(block, out),
        StmtKind::Increment { .. } | StmtKind::Return(None) => {}
    }
}

fn collect_struct_decls_expr<'p>(expr: &'p Expr, out: &mut Vec<&'p Stmt>) {
    match &expr.kind {
        ExprKind::Block(block) => collect_struct_decls_block(block, out),
        ExprKind::Unary { operand: inner, .. }
        | ExprKind::FieldAccess { object: inner, .. }
        | ExprKind::Reference(inner)
        | ExprKind::Dereference(inner) => collect_struct_decls_expr(inner, out),
        ExprKind::Binary { left, right, .. } => {
            collect_struct_decls_expr(left, out);
            collect_struct_decls_expr(right, out);
        }
        ExprKind::If {
            condition,
            then_expr,
            else_expr,
        } => {
            collect_struct_decls_expr(condition, out);
            collect_struct_decls_expr(then_expr, out);
            collect_struct_decls_expr(else_expr, out);
        }
        ExprKind::Call {
            arguments: values, ..
        }
        | ExprKind::StructLiteral { values, .. } => {
            for value in values {
                collect_struct_decls_expr(value, out);
            }
        }
        ExprKind::LiteralInt(_) | ExprKind::LiteralBool(_) | ExprKind::Identifier(_) => {}
    }
}

fn record<T>(table: &mut Vec<Option<T>>, id: NodeId, value: T) {
    if table.len() <= id {
        table.resize_with(id + 1, || None);
    }
    table[id] = Some(value);
}

/// Checks a block's statements and result in the current scope.
pub fn type_check_block(type_checker: &mut TypeChecker, block: &Block) -> Option<Type> {
    for stmt in &block.statements {
        type_check_stmt(type_checker, stmt);
    }

    block
        .result
        .as_ref()
        .map(|result| type_check_expr(type_checker, result))
}

pub fn type_check_stmt(type_checker: &mut TypeChecker, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Let {
            mutable,
            name,
            annotation,
            initializer,
        } => {
            // The initializer cannot see the variable it initialises.
            let initializer_type = type_check_expr(type_checker, initializer);

            let ty = match annotation {
                Some(annotation) => {
                    let declared = type_checker.resolve_type(annotation, false);
                    if initializer_type != declared {
                        type_checker.error(
                            ErrorImpl::TypeMatchError {
                                expected: declared.to_string(),
                                received: initializer_type.to_string(),
                            },
                            &initializer.span.start,
                        );
                    }
                    declared
                }
                None if initializer_type.is_void() => {
                    type_checker.error(
                        ErrorImpl::VoidNotAllowed {
                            context: format!("as the type of variable {:?}", name),
                        },
                        &initializer.span.start,
                    );
                    Type::I32
                }
                None => initializer_type,
            };

            if !type_checker.is_global_scope() && type_checker.declared_in_current_scope(name) {
                type_checker.error(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: name.clone(),
                    },
                    &stmt.span.start,
                );
            }

            let id = type_checker.declare_variable(name, ty, *mutable);
            record(&mut type_checker.result.let_bindings, stmt.id, id);
        }
        StmtKind::Assignment {
            name,
            operator,
            value,
        } => {
            let value_type = type_check_expr(type_checker, value);
            let Some(id) = type_checker.lookup_variable(name) else {
                type_checker.error(
                    ErrorImpl::VariableNotDeclared {
                        variable: name.clone(),
                    },
                    &stmt.span.start,
                );
                return;
            };
            record(&mut type_checker.result.target_bindings, stmt.id, id);

            let variable = type_checker.result.variables[id].clone();
            if !variable.mutable {
                type_checker.error(
                    ErrorImpl::ImmutableAssignment {
                        variable: name.clone(),
                    },
                    &stmt.span.start,
                );
            }

            match operator {
                AssignOp::Assign => {
                    if value_type != variable.ty {
                        type_checker.error(
                            ErrorImpl::AssignmentTypeMismatch {
                                variable: name.clone(),
                                expected: variable.ty.to_string(),
                                received: value_type.to_string(),
                            },
                            &value.span.start,
                        );
                    }
                }
                _ if !variable.ty.is_numeric() => {
                    type_checker.error(
                        ErrorImpl::NonNumericVariable {
                            variable: name.clone(),
                            operation: format!("apply {} to", operator.symbol()),
                            type_: variable.ty.to_string(),
                        },
                        &stmt.span.start,
                    );
                }
                _ if !value_type.is_numeric() => {
                    type_checker.error(
                        ErrorImpl::NonNumericOperand {
                            operator: operator.symbol().to_string(),
                            received: value_type.to_string(),
                        },
                        &value.span.start,
                    );
                }
                _ => {}
            }
        }
        StmtKind::Increment { name } => {
            let Some(id) = type_checker.lookup_variable(name) else {
                type_checker.error(
                    ErrorImpl::VariableNotDeclared {
                        variable: name.clone(),
                    },
                    &stmt.span.start,
                );
                return;
            };
            record(&mut type_checker.result.target_bindings, stmt.id, id);

            let variable = type_checker.result.variables[id].clone();
            if !variable.mutable {
                type_checker.error(
                    ErrorImpl::ImmutableIncrement {
                        variable: name.clone(),
                    },
                    &stmt.span.start,
                );
            }
            if !variable.ty.is_numeric() {
                type_checker.error(
                    ErrorImpl::NonNumericVariable {
                        variable: name.clone(),
                        operation: String::from("increment"),
                        type_: variable.ty.to_string(),
                    },
                    &stmt.span.start,
                );
            }
        }
        StmtKind::While { condition, body } => {
            let condition_type = type_check_expr(type_checker, condition);
            if !condition_type.is_bool() {
                type_checker.error(
                    ErrorImpl::NonBooleanCondition {
                        construct: String::from("while"),
                        received: condition_type.to_string(),
                    },
                    &condition.span.start,
                );
            }

            type_checker.in_scope(|checker| match &body.kind {
                StmtKind::Block(block) => {
                    type_check_block(checker, block);
                }
                _ => type_check_stmt(checker, body),
            });
        }
        StmtKind::Block(block) => {
            type_checker.in_scope(|checker| type_check_block(checker, block));
        }
        StmtKind::Expression(expr) => {
            type_check_expr(type_checker, expr);
        }
        StmtKind::Return(value) => {
            let value_type = value
                .as_ref()
                .map(|value| (type_check_expr(type_checker, value), value.span.start.clone()));

            let Some(context) = type_checker.current_function.as_mut() else {
                type_checker.error(ErrorImpl::ReturnOutsideFunction, &stmt.span.start);
                return;
            };
            context.saw_return = true;
            let function = context.name.clone();
            let return_type = context.return_type.clone();

            match value_type {
                Some((_, position)) if return_type.is_void() => {
                    type_checker.error(ErrorImpl::VoidReturnValue { function }, &position);
                }
                Some((value_type, position)) if value_type != return_type => {
                    type_checker.error(
                        ErrorImpl::ReturnTypeMismatch {
                            function,
                            expected: return_type.to_string(),
                            received: value_type.to_string(),
                        },
                        &position,
                    );
                }
                None if !return_type.is_void() => {
                    type_checker.error(ErrorImpl::MissingReturnValue { function }, &stmt.span.start);
                }
                _ => {}
            }
        }
        // Registered before any body is checked
        StmtKind::StructDecl { .. } => {}
    }
}

fn type_check_arguments(
    type_checker: &mut TypeChecker,
    function: &str,
    parameters: &[Type],
    arguments: &[Expr],
    position: &Position,
) {
    if parameters.len() != arguments.len() {
        type_checker.error(
            ErrorImpl::ArgumentCount {
                function: function.to_string(),
                expected: parameters.len(),
                received: arguments.len(),
            },
            position,
        );
    }

    for (index, argument) in arguments.iter().enumerate() {
        let argument_type = type_check_expr(type_checker, argument);
        if let Some(expected) = parameters.get(index) {
            if argument_type != *expected {
                type_checker.error(
                    ErrorImpl::ArgumentTypeMatchError {
                        function: function.to_string(),
                        index: index + 1,
                        expected: expected.to_string(),
                        received: argument_type.to_string(),
                    },
                    &argument.span.start,
                );
            }
        }
    }
}

pub fn type_check_expr(type_checker: &mut TypeChecker, expr: &Expr) -> Type {
    let ty = match &expr.kind {
        ExprKind::LiteralInt(_) => Type::I32,
        ExprKind::LiteralBool(_) => Type::BOOL,
        ExprKind::Identifier(name) => {
            if let Some(id) = type_checker.lookup_variable(name) {
                record(&mut type_checker.result.identifier_bindings, expr.id, id);
                type_checker.result.variables[id].ty.clone()
            } else if let Some(&function) = type_checker.function_lookup.get(name) {
                record(&mut type_checker.result.function_references, expr.id, function);
                type_checker.result.functions[function].as_type()
            } else {
                type_checker.error(
                    ErrorImpl::UnknownIdentifier { name: name.clone() },
                    &expr.span.start,
                );
                Type::I32
            }
        }
        ExprKind::Unary { operator, operand } => {
            let operand_type = type_check_expr(type_checker, operand);
            match operator {
                UnaryOp::Negate => {
                    if !operand_type.is_numeric() {
                        type_checker.error(
                            ErrorImpl::NonNumericOperand {
                                operator: String::from("-"),
                                received: operand_type.to_string(),
                            },
                            &operand.span.start,
                        );
                    }
                    Type::I32
                }
            }
        }
        ExprKind::Binary {
            operator,
            left,
            right,
        } => {
            let left_type = type_check_expr(type_checker, left);
            let right_type = type_check_expr(type_checker, right);

            match operator {
                BinaryOp::Equals => {
                    if left_type != right_type {
                        type_checker.error(
                            ErrorImpl::EqualityTypeMismatch {
                                left: left_type.to_string(),
                                right: right_type.to_string(),
                            },
                            &expr.span.start,
                        );
                    } else if left_type.is_void() {
                        type_checker.error(ErrorImpl::VoidComparison, &expr.span.start);
                    }
                    Type::BOOL
                }
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Less => {
                    for (operand, operand_type) in [(left, &left_type), (right, &right_type)] {
                        if !operand_type.is_numeric() {
                            type_checker.error(
                                ErrorImpl::NonNumericOperand {
                                    operator: operator.symbol().to_string(),
                                    received: operand_type.to_string(),
                                },
                                &operand.span.start,
                            );
                        }
                    }

                    if *operator == BinaryOp::Less {
                        Type::BOOL
                    } else {
                        Type::I32
                    }
                }
            }
        }
        ExprKind::Call { callee, arguments } => {
            if let Some(&function_id) = type_checker.function_lookup.get(callee) {
                record(&mut type_checker.result.function_references, expr.id, function_id);
                let function = type_checker.result.functions[function_id].clone();
                type_check_arguments(
                    type_checker,
                    callee,
                    &function.parameter_types,
                    arguments,
                    &expr.span.start,
                );
                function.return_type
            } else if let Some(id) = type_checker.lookup_variable(callee) {
                match type_checker.result.variables[id].ty.clone() {
                    Type::Function {
                        parameters,
                        return_type,
                    } => {
                        record(&mut type_checker.result.identifier_bindings, expr.id, id);
                        type_check_arguments(
                            type_checker,
                            callee,
                            &parameters,
                            arguments,
                            &expr.span.start,
                        );
                        *return_type
                    }
                    other => {
                        type_checker.error(
                            ErrorImpl::NotCallable {
                                name: callee.clone(),
                                type_: other.to_string(),
                            },
                            &expr.span.start,
                        );
                        for argument in arguments {
                            type_check_expr(type_checker, argument);
                        }
                        Type::I32
                    }
                }
            } else {
                type_checker.error(
                    ErrorImpl::UnknownFunction {
                        function: callee.clone(),
                    },
                    &expr.span.start,
                );
                for argument in arguments {
                    type_check_expr(type_checker, argument);
                }
                Type::I32
            }
        }
        ExprKind::If {
            condition,
            then_expr,
            else_expr,
        } => {
            let condition_type = type_check_expr(type_checker, condition);
            if !condition_type.is_bool() {
                type_checker.error(
                    ErrorImpl::NonBooleanCondition {
                        construct: String::from("if"),
                        received: condition_type.to_string(),
                    },
                    &condition.span.start,
                );
            }

            let then_type = type_check_expr(type_checker, then_expr);
            let else_type = type_check_expr(type_checker, else_expr);
            if then_type != else_type {
                type_checker.error(
                    ErrorImpl::IfBranchMismatch {
                        then_type: then_type.to_string(),
                        else_type: else_type.to_string(),
                    },
                    &else_expr.span.start,
                );
            }
            then_type
        }
        ExprKind::Block(block) => {
            match type_checker.in_scope(|checker| type_check_block(checker, block)) {
                Some(ty) => ty,
                None => {
                    type_checker.error(ErrorImpl::MissingBlockResult, &block.span.start);
                    Type::VOID
                }
            }
        }
        ExprKind::StructLiteral { name, values } => {
            let value_types: Vec<Type> = values
                .iter()
                .map(|value| type_check_expr(type_checker, value))
                .collect();

            match type_checker.struct_lookup.get(name).copied() {
                Some(index) => {
                    let structure = Arc::clone(&type_checker.result.structs[index]);
                    if structure.fields.len() != values.len() {
                        type_checker.error(
                            ErrorImpl::StructFieldCount {
                                name: name.clone(),
                                expected: structure.fields.len(),
                                received: values.len(),
                            },
                            &expr.span.start,
                        );
                    }

                    for ((field, expected), (value, received)) in structure
                        .fields
                        .iter()
                        .zip(values.iter().zip(&value_types))
                    {
                        if received != expected {
                            type_checker.error(
                                ErrorImpl::FieldTypeMatchError {
                                    name: name.clone(),
                                    field: field.clone(),
                                    expected: expected.to_string(),
                                    received: received.to_string(),
                                },
                                &value.span.start,
                            );
                        }
                    }
                    Type::Struct(structure)
                }
                None => {
                    type_checker.error(
                        ErrorImpl::UnknownStruct { name: name.clone() },
                        &expr.span.start,
                    );
                    Type::I32
                }
            }
        }
        ExprKind::FieldAccess { object, field } => {
            let object_type = type_check_expr(type_checker, object);
            match &object_type {
                Type::Struct(structure) => match structure.field(field) {
                    Some(ty) => ty.clone(),
                    None => {
                        type_checker.error(
                            ErrorImpl::UnknownField {
                                name: structure.name.clone(),
                                field: field.clone(),
                            },
                            &expr.span.end,
                        );
                        Type::I32
                    }
                },
                other => {
                    type_checker.error(
                        ErrorImpl::NotAStruct {
                            field: field.clone(),
                            type_: other.to_string(),
                        },
                        &expr.span.end,
                    );
                    Type::I32
                }
            }
        }
        ExprKind::Reference(operand) => {
            let operand_type = type_check_expr(type_checker, operand);
            if operand_type.is_void() {
                type_checker.error(ErrorImpl::VoidReference, &expr.span.start);
            }
            Type::pointer_to(operand_type)
        }
        ExprKind::Dereference(operand) => match type_check_expr(type_checker, operand) {
            Type::Pointer(pointee) => *pointee,
            other => {
                type_checker.error(
                    ErrorImpl::DereferenceNonPointer {
                        type_: other.to_string(),
                    },
                    &expr.span.start,
                );
                Type::I32
            }
        },
    };

    record(&mut type_checker.result.expression_types, expr.id, ty.clone());
    ty
}

/// Analyses a whole program. Errors are collected in the result rather than
/// returned, so a single run reports everything it can find.
pub fn analyze(program: &Program) -> AnalysisResult {
    let mut type_checker = TypeChecker::new(program);

    type_checker.register_structs();
    type_checker.register_intrinsics();
    type_checker.register_function_signatures();
    type_checker.check_top_level();
    type_checker.check_function_bodies();

    debug!(
        functions = type_checker.result.functions.len(),
        globals = type_checker.result.globals.len(),
        errors = type_checker.result.errors.len(),
        "analysis finished"
    );
    type_checker.result
}
