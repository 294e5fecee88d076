//! Core types for the ECMAScript front-end.
//!
//! This crate provides the foundational types shared by the lexer, parser,
//! and CLI: source locations and the error type every layer reports.
//!
//! # Overview
//!
//! - [`Location`] - A position in source text (URI, 1-based row and column)
//! - [`Span`] - A range between two locations
//! - [`ParseError`] - Errors from the scanner, lexer, or parser
//! - [`ErrorKind`] - The three classes of front-end error
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, Location, ParseError};
//!
//! let err = ParseError {
//!     kind: ErrorKind::Syntax,
//!     message: "unexpected token".to_string(),
//!     location: Location::start(None),
//! };
//!
//! assert_eq!(err.to_string(), "<input>:1:1: syntax error: unexpected token");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;

pub use error::{ErrorKind, ParseError};
pub use source::{Location, Span};
