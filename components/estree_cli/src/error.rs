//! Error types for the CLI.

use std::fmt;

use core_types::ParseError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// File I/O error
    Io(std::io::Error),

    /// Front-end parse error
    Parse(ParseError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "file error: {}", e),
            CliError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<ParseError> for CliError {
    fn from(err: ParseError) -> Self {
        CliError::Parse(err)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ErrorKind, Location};

    #[test]
    fn test_parse_error_display_passthrough() {
        let err = CliError::from(ParseError {
            kind: ErrorKind::Syntax,
            message: "unexpected token".to_string(),
            location: Location::start(None),
        });
        assert_eq!(err.to_string(), "<input>:1:1: syntax error: unexpected token");
    }

    #[test]
    fn test_io_error_display() {
        let err = CliError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert!(err.to_string().contains("file error"));
    }
}
