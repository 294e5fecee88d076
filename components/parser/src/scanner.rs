//! Positioned rune reader with one rune of pushback.

use std::sync::Arc;

use core_types::Location;

/// Scanner provides positioned reads over decoded source text.
///
/// `read` returns the next code point or `None` at end of input; `unread`
/// restores exactly the last code point (calling it twice in a row is not
/// supported). Row and column tracking survives unreading a line terminator:
/// on a line-terminator read the column flips sign to remember its
/// pre-newline value, so `unread` can restore it and decrement the row.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    uri: Option<Arc<str>>,
    col: i32,
    row: u32,
    eof: bool,
}

impl Scanner {
    /// Create a new scanner for the given source text and optional URI.
    pub fn new(source: &str, uri: Option<Arc<str>>) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            uri,
            col: 1,
            row: 1,
            eof: false,
        }
    }

    /// Current source location: the position `read` would consume next.
    pub fn location(&self) -> Location {
        let column = if self.col < 0 { 1 } else { self.col as u32 };
        Location {
            uri: self.uri.clone(),
            row: self.row,
            column,
        }
    }

    /// Read the next code point, or `None` at end of input.
    pub fn read(&mut self) -> Option<char> {
        if self.pos >= self.chars.len() {
            self.eof = true;
            return None;
        }

        let r = self.chars[self.pos];
        self.pos += 1;

        // On newline, col is set to -col. A negative column therefore means
        // the last read was a line terminator, which tells unread what to
        // restore without additional state.
        if is_line_terminator(r) {
            self.row += 1;
            if self.col > 0 {
                self.col = -self.col;
            } else if self.col < 0 {
                // Last read was also a newline; treat it as column 1.
                self.col = -1;
            }
        } else {
            if self.col < 0 {
                self.col = 1;
            }
            self.col += 1;
        }

        Some(r)
    }

    /// Restore the last code point read. A no-op if the last read hit end of
    /// input, so it is always safe to unread after a failed read.
    pub fn unread(&mut self) {
        if self.eof {
            self.eof = false;
            return;
        }

        debug_assert!(self.pos > 0, "unread before any read");
        self.pos -= 1;

        if self.col < 0 {
            self.col = -self.col;
            self.row -= 1;
        } else {
            self.col -= 1;
        }
    }
}

/// ECMAScript LineTerminator set (LF, CR, LS, PS).
pub fn is_line_terminator(r: char) -> bool {
    matches!(r, '\u{000a}' | '\u{000d}' | '\u{2028}' | '\u{2029}')
}

/// ECMAScript WhiteSpace set: TAB, VT, FF, SP, NBSP, the Zs category
/// members, and ZWNBSP (BOM).
pub fn is_whitespace(r: char) -> bool {
    matches!(
        r,
        '\u{0009}'
            | '\u{000b}'
            | '\u{000c}'
            | '\u{0020}'
            | '\u{00a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_tracks_columns() {
        let mut s = Scanner::new("ab", None);
        assert_eq!(s.location().column, 1);
        assert_eq!(s.read(), Some('a'));
        assert_eq!(s.location().column, 2);
        assert_eq!(s.read(), Some('b'));
        assert_eq!(s.location().column, 3);
        assert_eq!(s.read(), None);
    }

    #[test]
    fn test_newline_increments_row() {
        let mut s = Scanner::new("a\nb", None);
        s.read();
        s.read();
        let loc = s.location();
        assert_eq!(loc.row, 2);
        assert_eq!(loc.column, 1);
        s.read();
        assert_eq!(s.location().column, 2);
    }

    #[test]
    fn test_unread_restores_position() {
        let mut s = Scanner::new("xy", None);
        s.read();
        s.read();
        s.unread();
        assert_eq!(s.location().column, 2);
        assert_eq!(s.read(), Some('y'));
    }

    #[test]
    fn test_unread_over_newline() {
        let mut s = Scanner::new("ab\ncd", None);
        s.read();
        s.read();
        s.read(); // newline
        assert_eq!(s.location().row, 2);
        s.unread();
        let loc = s.location();
        assert_eq!(loc.row, 1);
        assert_eq!(loc.column, 3);
        assert_eq!(s.read(), Some('\n'));
        assert_eq!(s.location().row, 2);
    }

    #[test]
    fn test_unread_at_eof_is_noop() {
        let mut s = Scanner::new("a", None);
        s.read();
        assert_eq!(s.read(), None);
        s.unread();
        assert_eq!(s.read(), None);
        assert_eq!(s.location().column, 2);
    }

    #[test]
    fn test_consecutive_newlines() {
        let mut s = Scanner::new("\n\n", None);
        s.read();
        s.read();
        let loc = s.location();
        assert_eq!(loc.row, 3);
        assert_eq!(loc.column, 1);
    }

    #[test]
    fn test_whitespace_classes() {
        assert!(is_whitespace('\t'));
        assert!(is_whitespace('\u{00a0}'));
        assert!(is_whitespace('\u{feff}'));
        assert!(!is_whitespace('\n'));
        assert!(is_line_terminator('\u{2028}'));
        assert!(!is_line_terminator(' '));
    }
}
