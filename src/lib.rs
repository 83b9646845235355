#![allow(clippy::module_inception)]

use std::{fmt::Display, sync::Arc};

use thiserror::Error as ThisError;
use tracing::debug;

use crate::{
    compiler::compiler::generate,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::analyze,
};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position(pub u32, pub Arc<String>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Joins two spans, keeping the start of `self` and the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }
}

/// The pipeline stage that rejected a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexing,
    Parsing,
    Analysis,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lexing => write!(f, "lexing"),
            Stage::Parsing => write!(f, "parsing"),
            Stage::Analysis => write!(f, "semantic analysis"),
        }
    }
}

#[derive(Debug, Clone, ThisError)]
#[error("{stage} failed with {} error(s)", .errors.len())]
pub struct CompileFailure {
    pub stage: Stage,
    pub errors: Vec<Error>,
}

/// Runs the whole pipeline over `source` and returns the generated C text.
///
/// Every stage runs to completion and accumulates its errors. The next stage
/// only runs when the previous one reported none.
pub fn compile(source: &str, file: Option<String>) -> Result<String, CompileFailure> {
    let (tokens, errors) = tokenize(source, file.clone());
    if !errors.is_empty() {
        return Err(CompileFailure {
            stage: Stage::Lexing,
            errors,
        });
    }

    let file_name = Arc::new(file.unwrap_or_else(|| String::from("shell")));
    let (program, errors) = parse(tokens, file_name);
    if !errors.is_empty() {
        return Err(CompileFailure {
            stage: Stage::Parsing,
            errors,
        });
    }

    let analysis = analyze(&program);
    if !analysis.errors.is_empty() {
        return Err(CompileFailure {
            stage: Stage::Analysis,
            errors: analysis.errors,
        });
    }

    let output = generate(&program, &analysis);
    debug!(bytes = output.len(), "compilation finished");
    Ok(output)
}

/// Finds the line containing the byte offset `position`.
///
/// # Returns
///
/// A tuple of the 1-based line number, the line's text and the offset of
/// `position` within that line. Offsets past the end map onto the last line.
pub fn get_line_at_position(source: &str, position: u32) -> (usize, String, usize) {
    let pos = position as usize;

    let mut start = 0;
    let mut line_number = 1;
    let mut last = (1, String::new(), 0);

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return (line_number, line.to_string(), pos - start);
        }

        last = (line_number, line.to_string(), line.trim_end_matches('\n').len());
        start = end;
        line_number += 1;
    }

    last
}

pub fn render_error(error: &Error, source: &str) -> String {
    /*
        Error: name (tip)
        -> final.lang
           |
        20 | let a = #;
           | --------^
    */

    let position = error.get_position();
    let (line, line_text, line_pos) = get_line_at_position(source, position.0);

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    let mut rendered = String::new();
    if let ErrorTip::None = error.get_tip() {
        rendered.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        rendered.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    rendered.push_str(&format!("-> {}\n", position.1));
    rendered.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    rendered.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    rendered.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    rendered.push_str(&format!("{}\n", error));

    rendered
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ').count();
    (String::from(&string[start..]), start)
}
