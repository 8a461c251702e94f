// ABOUTME: Error values for parse and evaluation failures in the Logo interpreter

use crate::node::{Node, Pos};
use std::fmt;
use thiserror::Error;

/// The stable set of failure kinds the interpreter can report.
///
/// Messages follow the wording of classic Logo ("I don't know how to
/// FOO.", "You don't say what to do with 3") rather than conventional
/// compiler diagnostics; the REPL prints them verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("Keyword {0} expected.")]
    KeywordExpected(String),
    #[error("Word expected.")]
    WordExpected,
    #[error("List expected.")]
    ListExpected,
    #[error("I don't know how to {0}.")]
    ProcedureNotFound(String),
    #[error("Procedure expected.")]
    ProcedureExpected,
    #[error("Not enough inputs to {0}.")]
    NotEnoughInputs(String),
    #[error("Number expected.")]
    NumberExpected,
    #[error("Boolean expected.")]
    BooleanExpected,
    #[error("Positive integer expected.")]
    PositiveIntegerExpected,
    #[error("Positive number expected.")]
    PositiveNumberExpected,
    #[error("No current test value.")]
    NoCurrentTestValue,
    #[error("{0} has no value.")]
    VariableNotFound(String),
    #[error("You don't say what to do with {0}")]
    ReturnValueUnused(String),
    #[error("I don't like {0} as an input.")]
    BadInput(String),
    #[error("File {0} is not open.")]
    FileNotOpen(String),
    #[error("Expected list of {0} items.")]
    ListOfNItemsExpected(usize),
    #[error("I don't know the color {0}.")]
    UnknownColor(String),
    #[error("Expected a number between {low} and {high}.")]
    NumberNotInRange { low: i64, high: i64 },
    #[error("{0} is not a directory.")]
    NotDir(String),
    #[error("{0} is not a file.")]
    NotFile(String),
    #[error("Can only use {0} inside a procedure.")]
    NoInterpretedFrame(String),
    #[error("I don't know the label {0}.")]
    UnknownLabel(String),
    #[error("Stopped.")]
    UserStopped,
    #[error("Attempt to divide by zero.")]
    AttemptToDivideByZero,
    #[error("Unexpected end of input inside a list.")]
    UnexpectedEof,
    #[error("Can't find catch tag for {0}.")]
    UserError(String),
    #[error("{0}")]
    Io(String),
}

/// An error kind plus the source position it was raised at, when known.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub pos: Option<Pos>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Error { kind, pos: None }
    }

    /// Attach the position of the node the error refers to.
    pub fn at(kind: ErrorKind, node: &Node) -> Self {
        Error {
            kind,
            pos: Some(node.pos()).filter(Pos::is_known),
        }
    }

    pub fn at_pos(kind: ErrorKind, pos: Pos) -> Self {
        Error {
            kind,
            pos: Some(pos).filter(Pos::is_known),
        }
    }

    // Constructors for the kinds raised all over the evaluator; the rarer
    // kinds are built at their single call site instead.

    pub fn word_expected(node: &Node) -> Self {
        Error::at(ErrorKind::WordExpected, node)
    }

    pub fn list_expected(node: &Node) -> Self {
        Error::at(ErrorKind::ListExpected, node)
    }

    pub fn number_expected(node: &Node) -> Self {
        Error::at(ErrorKind::NumberExpected, node)
    }

    pub fn bad_input(node: &Node) -> Self {
        Error::at(ErrorKind::BadInput(node.to_string()), node)
    }

    pub fn not_enough_inputs(name: &str, pos: Pos) -> Self {
        Error::at_pos(ErrorKind::NotEnoughInputs(name.to_string()), pos)
    }

    pub fn return_value_unused(node: &Node) -> Self {
        Error::at(ErrorKind::ReturnValueUnused(node.to_string()), node)
    }

    pub fn io(err: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(err.to_string()))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(pos) = self.pos {
            write!(f, " (line {}, col {})", pos.line, pos.col)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wording() {
        let e = Error::new(ErrorKind::ProcedureNotFound("SPIRAL".to_string()));
        assert_eq!(e.to_string(), "I don't know how to SPIRAL.");

        let e = Error::new(ErrorKind::NotEnoughInputs("SUM".to_string()));
        assert_eq!(e.to_string(), "Not enough inputs to SUM.");

        let e = Error::new(ErrorKind::VariableNotFound("X".to_string()));
        assert_eq!(e.to_string(), "X has no value.");
    }

    #[test]
    fn test_position_is_appended_when_known() {
        let e = Error::at_pos(ErrorKind::NumberExpected, Pos::new(3, 7));
        assert_eq!(e.to_string(), "Number expected. (line 3, col 7)");
    }

    #[test]
    fn test_synthetic_position_is_dropped() {
        let e = Error::at_pos(ErrorKind::NumberExpected, Pos::SYNTHETIC);
        assert_eq!(e.pos, None);
        assert_eq!(e.to_string(), "Number expected.");
    }
}
