//! Source location types for error reporting and AST spans.

use std::fmt;
use std::sync::Arc;

/// A position in source text.
///
/// Rows and columns are 1-based. The URI identifies the source the position
/// refers to; anonymous sources (strings, stdin) have no URI.
///
/// # Examples
///
/// ```
/// use core_types::Location;
///
/// let loc = Location { uri: None, row: 10, column: 5 };
/// assert_eq!(loc.to_string(), "<input>:10:5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// URI of the source, or None for anonymous input
    pub uri: Option<Arc<str>>,
    /// 1-based row number
    pub row: u32,
    /// 1-based column number
    pub column: u32,
}

impl Location {
    /// Create a location pointing at the first character of a source.
    pub fn start(uri: Option<Arc<str>>) -> Self {
        Self { uri, row: 1, column: 1 }
    }

    /// Create a span consisting of only this location.
    pub fn span(&self) -> Span {
        Span {
            start: self.clone(),
            end: self.clone(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uri {
            Some(uri) => write!(f, "{}:{}:{}", uri, self.row, self.column),
            None => write!(f, "<input>:{}:{}", self.row, self.column),
        }
    }
}

/// A range from one location in source to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Start of the range (inclusive)
    pub start: Location,
    /// End of the range
    pub end: Location,
}

impl Span {
    /// An empty span with no useful position information.
    pub fn empty() -> Self {
        Location::start(None).span()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = (&self.start, &self.end);
        if a.uri != b.uri {
            return write!(f, "{}-{}", a, b);
        }
        if a.row != b.row {
            return write!(f, "{}-{}-{}", a, b.row, b.column);
        }
        if a.column != b.column {
            return write!(f, "{}-{}", a, b.column);
        }
        write!(f, "{}", a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location {
            uri: Some("file:///main.js".into()),
            row: 3,
            column: 14,
        };
        assert_eq!(loc.to_string(), "file:///main.js:3:14");
    }

    #[test]
    fn test_location_display_anonymous() {
        assert_eq!(Location::start(None).to_string(), "<input>:1:1");
    }

    #[test]
    fn test_span_display_same_row() {
        let span = Span {
            start: Location { uri: None, row: 2, column: 4 },
            end: Location { uri: None, row: 2, column: 9 },
        };
        assert_eq!(span.to_string(), "<input>:2:4-9");
    }

    #[test]
    fn test_span_display_multi_row() {
        let span = Span {
            start: Location { uri: None, row: 2, column: 4 },
            end: Location { uri: None, row: 5, column: 1 },
        };
        assert_eq!(span.to_string(), "<input>:2:4-5-1");
    }
}
