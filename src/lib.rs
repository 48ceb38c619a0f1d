#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::{
    ast::ast::Program,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
    semantic::analyzer::{analyze, Analysis},
};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod semantic;

extern crate regex;

/// A location in a source file.
///
/// `offset` is a byte offset into the source, `line` and `column` are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(offset: u32, line: u32, column: u32, file: Rc<String>) -> Self {
        Position {
            offset,
            line,
            column,
            file,
        }
    }

    pub fn null() -> Self {
        Position::new(0, 0, 0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Runs the whole front end over a piece of source text.
///
/// # Arguments
///
/// * `source` - The program text
/// * `file` - The name used in positions, `shell` when absent
///
/// # Returns
///
/// The parsed program and the analyzer's side table, or the first diagnostic.
pub fn check_source(source: String, file: Option<String>) -> Result<(Program, Analysis), Error> {
    let file_name = Rc::new(file.clone().unwrap_or_else(|| String::from("shell")));
    let tokens = tokenize(source, file)?;
    let (_, program) = parse(tokens, file_name);
    let program = program?;
    let analysis = analyze(&program)?;

    Ok((program, analysis))
}

/// Returns the 1-based line `line` of `source`, or an empty string past the end.
pub fn get_line(source: &str, line: u32) -> String {
    source
        .lines()
        .nth(line.saturating_sub(1) as usize)
        .unwrap_or("")
        .to_string()
}

/// Renders a diagnostic against the source it was produced from.
///
/// ```text
/// Error: BinaryTypeMismatch (Both operands must have the same type)
///    Type mismatch in binary expression: `int` != `str`
/// -> main.crs:3:1
///   |
/// 3 | int y = x + "a";
///   | ^
/// ```
pub fn render_error(error: &Error, source: &str) -> String {
    let position = error.get_position();
    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    out.push_str(&format!("   {}\n", error.get_internal_error()));
    out.push_str(&format!("-> {}\n", position));

    if position.line == 0 {
        return out;
    }

    out.push_str(&format!("{:>padding$}\n", "|"));

    let line_text = get_line(source, position.line);
    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = (position.column as usize)
        .saturating_sub(removed_whitespace)
        .max(1);

    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

/// Prints a diagnostic to stderr.
pub fn display_error(error: &Error, source: &str) {
    eprint!("{}", render_error(error, source));
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (String::from(&string[start..]), start)
}
