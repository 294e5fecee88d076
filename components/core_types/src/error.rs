//! Front-end error types.
//!
//! Every failure from the scanner, lexer, or parser carries a source
//! location and one of three kinds. There is no local recovery: the first
//! error aborts the parse and surfaces to the caller.

use std::fmt;

use crate::Location;

/// The kind of a front-end error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The character source yielded a decoding failure
    Encoding,
    /// The lexer or parser rejected the input
    Syntax,
    /// Internal scanning-structure failure; unreachable in a correct build
    Parser,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Encoding => write!(f, "encoding error"),
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Parser => write!(f, "parser error"),
        }
    }
}

/// An error produced while parsing ECMAScript source text.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, Location, ParseError};
///
/// let err = ParseError {
///     kind: ErrorKind::Syntax,
///     message: "unterminated string".to_string(),
///     location: Location { uri: None, row: 2, column: 7 },
/// };
/// assert_eq!(err.to_string(), "<input>:2:7: syntax error: unterminated string");
/// ```
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The class of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Where the error occurred
    pub location: Location,
}

impl ParseError {
    /// Create a syntax error at the given location.
    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            location,
        }
    }

    /// Create an encoding error at the given location.
    pub fn encoding(message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: ErrorKind::Encoding,
            message: message.into(),
            location,
        }
    }

    /// Create an internal parser error at the given location.
    pub fn internal(message: impl Into<String>, location: Location) -> Self {
        Self {
            kind: ErrorKind::Parser,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}
