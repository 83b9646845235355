use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::TrailingTokens { .. } => "TrailingTokens",
            ErrorImpl::InvalidCallee => "InvalidCallee",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::VoidNotAllowed { .. } => "VoidNotAllowed",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::IntrinsicAlreadyDeclared { .. } => "IntrinsicAlreadyDeclared",
            ErrorImpl::IntrinsicSignatureMismatch { .. } => "IntrinsicSignatureMismatch",
            ErrorImpl::DuplicateParameter { .. } => "DuplicateParameter",
            ErrorImpl::StructAlreadyDeclared { .. } => "StructAlreadyDeclared",
            ErrorImpl::DuplicateField { .. } => "DuplicateField",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::UnknownIdentifier { .. } => "UnknownIdentifier",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::ArgumentCount { .. } => "ArgumentCount",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::AssignmentTypeMismatch { .. } => "AssignmentTypeMismatch",
            ErrorImpl::ImmutableAssignment { .. } => "ImmutableAssignment",
            ErrorImpl::ImmutableIncrement { .. } => "ImmutableIncrement",
            ErrorImpl::NonNumericOperand { .. } => "NonNumericOperand",
            ErrorImpl::NonNumericVariable { .. } => "NonNumericVariable",
            ErrorImpl::EqualityTypeMismatch { .. } => "EqualityTypeMismatch",
            ErrorImpl::VoidComparison => "VoidComparison",
            ErrorImpl::NonBooleanCondition { .. } => "NonBooleanCondition",
            ErrorImpl::IfBranchMismatch { .. } => "IfBranchMismatch",
            ErrorImpl::UnknownStruct { .. } => "UnknownStruct",
            ErrorImpl::StructFieldCount { .. } => "StructFieldCount",
            ErrorImpl::FieldTypeMatchError { .. } => "FieldTypeMatchError",
            ErrorImpl::NotAStruct { .. } => "NotAStruct",
            ErrorImpl::UnknownField { .. } => "UnknownField",
            ErrorImpl::DereferenceNonPointer { .. } => "DereferenceNonPointer",
            ErrorImpl::VoidReference => "VoidReference",
            ErrorImpl::MissingBlockResult => "MissingBlockResult",
            ErrorImpl::VoidFinalExpression => "VoidFinalExpression",
            ErrorImpl::InvalidExitValue { .. } => "InvalidExitValue",
            ErrorImpl::VoidFunctionResult { .. } => "VoidFunctionResult",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::VoidReturnValue { .. } => "VoidReturnValue",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedToken { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::TrailingTokens { .. } => ErrorTip::Suggestion(String::from(
                "The final expression must be the last thing in its block, did you miss a semicolon?",
            )),
            ErrorImpl::InvalidCallee => ErrorTip::Suggestion(String::from(
                "Bind the value to a variable of function type and call it by name",
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::VariableAlreadyDeclared { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` already declared, use a nested block to shadow it",
                variable
            )),
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::ImmutableAssignment { variable }
            | ErrorImpl::ImmutableIncrement { variable } => ErrorTip::Suggestion(format!(
                "Declare it with `let mut {}`",
                variable
            )),
            ErrorImpl::ArgumentCount { expected, received, .. } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::ArgumentTypeMatchError { expected, received, .. }
            | ErrorImpl::FieldTypeMatchError { expected, received, .. }
            | ErrorImpl::TypeMatchError { expected, received }
            | ErrorImpl::AssignmentTypeMismatch { expected, received, .. }
            | ErrorImpl::ReturnTypeMismatch { expected, received, .. } => {
                ErrorTip::Suggestion(format!(
                    "Expected type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::NonBooleanCondition { .. } => ErrorTip::Suggestion(String::from(
                "Compare the value explicitly, e.g. `x == 0`",
            )),
            ErrorImpl::InvalidExitValue { .. } => ErrorTip::Suggestion(String::from(
                "Exit with a field or a computed integer instead, e.g. `p.x`",
            )),
            ErrorImpl::MissingReturn { .. } => ErrorTip::Suggestion(String::from(
                "End the body with a final expression or add a `return` statement",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at position {}", self.internal_error, self.position.0)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorImpl {
    // Lexing
    #[error("unrecognised character {token:?}")]
    UnrecognisedToken { token: String },

    // Parsing
    #[error("{message}, found {token:?}")]
    UnexpectedToken { token: String, message: String },
    #[error("invalid integer literal {token:?}")]
    NumberParseError { token: String },
    #[error("unexpected tokens after final expression, found {token:?}")]
    TrailingTokens { token: String },
    #[error("only function names can be called")]
    InvalidCallee,

    // Declarations
    #[error("unknown type {type_}")]
    UnknownType { type_: String },
    #[error("Void is not allowed {context}")]
    VoidNotAllowed { context: String },
    #[error("function {function:?} is already defined")]
    FunctionAlreadyDeclared { function: String },
    #[error("intrinsic {function:?} is already declared")]
    IntrinsicAlreadyDeclared { function: String },
    #[error("intrinsic {function:?} must have signature {expected}")]
    IntrinsicSignatureMismatch { function: String, expected: String },
    #[error("duplicate parameter {parameter:?} in function {function:?}")]
    DuplicateParameter { parameter: String, function: String },
    #[error("struct {name:?} is already defined")]
    StructAlreadyDeclared { name: String },
    #[error("duplicate field {field:?} in struct {name:?}")]
    DuplicateField { name: String, field: String },
    #[error("variable {variable:?} is already defined in this scope")]
    VariableAlreadyDeclared { variable: String },

    // Name resolution
    #[error("unknown variable {variable:?}")]
    VariableNotDeclared { variable: String },
    #[error("unknown variable or function {name:?}")]
    UnknownIdentifier { name: String },
    #[error("unknown function or function variable {function:?}")]
    UnknownFunction { function: String },
    #[error("{name:?} is not a function, it has type {type_}")]
    NotCallable { name: String, type_: String },

    // Typing
    #[error("function {function:?} expects {expected} argument(s) but received {received}")]
    ArgumentCount {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("argument {index} of {function:?} has the wrong type: expected {expected}, received {received}")]
    ArgumentTypeMatchError {
        function: String,
        index: usize,
        expected: String,
        received: String,
    },
    #[error("type mismatch: cannot assign {received} to a variable of type {expected}")]
    TypeMatchError { expected: String, received: String },
    #[error("type mismatch: cannot assign {received} to {variable:?} of type {expected}")]
    AssignmentTypeMismatch {
        variable: String,
        expected: String,
        received: String,
    },
    #[error("cannot assign to immutable variable {variable:?}")]
    ImmutableAssignment { variable: String },
    #[error("cannot increment immutable variable {variable:?}")]
    ImmutableIncrement { variable: String },
    #[error("operator {operator} requires I32 operands, received {received}")]
    NonNumericOperand { operator: String, received: String },
    #[error("cannot {operation} {variable:?} of type {type_}, it must be I32")]
    NonNumericVariable {
        variable: String,
        operation: String,
        type_: String,
    },
    #[error("cannot compare {left} with {right}")]
    EqualityTypeMismatch { left: String, right: String },
    #[error("cannot compare Void values")]
    VoidComparison,
    #[error("{construct} condition must be Bool, received {received}")]
    NonBooleanCondition { construct: String, received: String },
    #[error("if branches must have the same type: {then_type} and {else_type}")]
    IfBranchMismatch { then_type: String, else_type: String },
    #[error("unknown struct {name:?}")]
    UnknownStruct { name: String },
    #[error("struct {name:?} has {expected} field(s) but {received} value(s) were given")]
    StructFieldCount {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("field {field:?} of {name:?} has the wrong type: expected {expected}, received {received}")]
    FieldTypeMatchError {
        name: String,
        field: String,
        expected: String,
        received: String,
    },
    #[error("cannot access field {field:?} on non-struct type {type_}")]
    NotAStruct { field: String, type_: String },
    #[error("struct {name:?} has no field {field:?}")]
    UnknownField { name: String, field: String },
    #[error("cannot dereference non-pointer type {type_}")]
    DereferenceNonPointer { type_: String },
    #[error("cannot take a reference to a Void value")]
    VoidReference,
    #[error("block expression requires a final expression")]
    MissingBlockResult,

    // Control flow
    #[error("final expression cannot be Void")]
    VoidFinalExpression,
    #[error("final expression must be I32 or Bool to become the exit status, found {received}")]
    InvalidExitValue { received: String },
    #[error("Void function {function:?} cannot end with a final expression")]
    VoidFunctionResult { function: String },
    #[error("function {function:?} returns {expected} but the value has type {received}")]
    ReturnTypeMismatch {
        function: String,
        expected: String,
        received: String,
    },
    #[error("function {function:?} must return a value")]
    MissingReturn { function: String },
    #[error("return statement not allowed at top level")]
    ReturnOutsideFunction,
    #[error("Void function {function:?} cannot return a value")]
    VoidReturnValue { function: String },
    #[error("non-Void function {function:?} must return a value")]
    MissingReturnValue { function: String },
}
