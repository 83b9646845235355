//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;
use std::sync::Arc;

fn position(offset: u32) -> Position {
    Position(offset, Arc::new("test.lang".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
            message: "expected ';'".to_string(),
        },
        position(42),
    );

    assert_eq!(error.get_position().0, 42);
}

#[test]
fn test_error_display_includes_position() {
    let error = Error::new(
        ErrorImpl::UnknownFunction {
            function: "foo".to_string(),
        },
        position(7),
    );

    assert_eq!(
        error.to_string(),
        "unknown function or function variable \"foo\" at position 7"
    );
}

#[test]
fn test_unexpected_token_error() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
            message: "expected ';' after let statement".to_string(),
        },
        position(0),
    );

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert!(error.to_string().starts_with("expected ';' after let statement"));

    match error.get_tip() {
        ErrorTip::Suggestion(msg) => assert!(msg.contains("}")),
        ErrorTip::None => panic!("Expected suggestion"),
    }
}

#[test]
fn test_immutable_assignment_tip() {
    let error = Error::new(
        ErrorImpl::ImmutableAssignment {
            variable: "x".to_string(),
        },
        position(3),
    );

    assert!(error.to_string().contains("cannot assign to immutable variable"));
    assert_eq!(error.get_tip().to_string(), "Declare it with `let mut x`");
}

#[test]
fn test_type_mismatch_tip() {
    let error = Error::new(
        ErrorImpl::TypeMatchError {
            expected: "Bool".to_string(),
            received: "I32".to_string(),
        },
        position(0),
    );

    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert_eq!(
        error.get_tip().to_string(),
        "Expected type `Bool`, received `I32`"
    );
}

#[test]
fn test_errors_without_tip() {
    let error = Error::new(ErrorImpl::VoidComparison, position(0));

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.get_tip().to_string(), "");
}
