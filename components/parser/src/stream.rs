//! Token lookahead buffer between the lexer and the parser.

use std::collections::VecDeque;

use core_types::{Location, ParseError};

use crate::lexer::{Lexer, RegExpToken, Token, TokenKind};

/// TokenStream provides unbounded lookahead for scanning tokens while
/// preserving the lexer's notion of "the last token" for relexing.
pub struct TokenStream {
    l: Lexer,
    last: VecDeque<Token>,
    loc: VecDeque<Location>,
}

impl TokenStream {
    /// Create a new token stream over the given lexer.
    pub fn new(l: Lexer) -> Self {
        Self {
            l,
            last: VecDeque::new(),
            loc: VecDeque::new(),
        }
    }

    /// The current source location: the position of the front-of-queue token,
    /// or the lexer position when nothing is buffered.
    pub fn location(&self) -> Location {
        match self.loc.front() {
            Some(loc) => loc.clone(),
            None => self.l.location(),
        }
    }

    /// Peek into the future of the lexer. Lexes up to `i + 1` tokens ahead
    /// and returns the i-th.
    pub fn peek_at(&mut self, i: usize) -> Result<Token, ParseError> {
        while self.last.len() <= i {
            self.loc.push_back(self.location());
            let t = self.l.lex()?;
            self.last.push_back(t);
        }
        Ok(self.last[i].clone())
    }

    /// Return the next lexical token.
    pub fn scan(&mut self) -> Result<Token, ParseError> {
        if let Some(t) = self.last.pop_front() {
            self.loc.pop_front();
            return Ok(t);
        }
        self.l.lex()
    }

    /// Relex the last token as a regular expression.
    ///
    /// Fails with an internal error if tokens are buffered, since relexing
    /// changes the character stream past a point the buffer has already
    /// copied over.
    pub fn rescan(&mut self) -> Result<RegExpToken, ParseError> {
        if !self.last.is_empty() {
            return Err(ParseError::internal("internal error", self.location()));
        }
        self.l.relex()
    }

    /// Scan and fail with a syntax error if the token is not of the expected
    /// kind.
    pub fn scan_expect(&mut self, kind: TokenKind, err: &str) -> Result<Token, ParseError> {
        let t = self.scan()?;
        if t.kind != kind {
            if t.kind == TokenKind::None {
                return Err(self.syntax_error(format!("expected {:?}, got eof: {}", kind, err)));
            }
            return Err(self.syntax_error(format!(
                "expected {:?}, got `{}`: {}",
                kind,
                t.source(),
                err
            )));
        }
        Ok(t)
    }

    /// Build a syntax error at the current location.
    pub fn syntax_error(&self, err: impl Into<String>) -> ParseError {
        ParseError::syntax(err, self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(s: &str) -> TokenStream {
        TokenStream::new(Lexer::new(s, None))
    }

    #[test]
    fn test_scan_order() {
        let mut s = stream("a b c");
        assert_eq!(s.scan().unwrap().literal, "a");
        assert_eq!(s.scan().unwrap().literal, "b");
        assert_eq!(s.scan().unwrap().literal, "c");
        assert_eq!(s.scan().unwrap().kind, TokenKind::None);
    }

    #[test]
    fn test_peek_preserves_order() {
        let mut s = stream("a b c");
        assert_eq!(s.peek_at(2).unwrap().literal, "c");
        assert_eq!(s.peek_at(0).unwrap().literal, "a");
        assert_eq!(s.scan().unwrap().literal, "a");
        assert_eq!(s.peek_at(0).unwrap().literal, "b");
        assert_eq!(s.scan().unwrap().literal, "b");
        assert_eq!(s.scan().unwrap().literal, "c");
    }

    #[test]
    fn test_rescan_requires_empty_queue() {
        let mut s = stream("/a/ b");
        s.scan().unwrap();
        s.peek_at(0).unwrap();
        let err = s.rescan().unwrap_err();
        assert_eq!(err.kind, core_types::ErrorKind::Parser);
    }

    #[test]
    fn test_rescan_after_scan() {
        let mut s = stream("/a/g");
        assert_eq!(s.scan().unwrap().kind, TokenKind::PunctuatorDiv);
        let re = s.rescan().unwrap();
        assert_eq!(re.pattern, "a");
        assert_eq!(re.flags, "g");
    }

    #[test]
    fn test_location_tracks_front_of_queue() {
        let mut s = stream("aa bb");
        s.peek_at(0).unwrap();
        let before = s.location();
        s.peek_at(1).unwrap();
        // Peeking further must not move the reported location.
        assert_eq!(s.location(), before);
    }

    #[test]
    fn test_scan_expect_message() {
        let mut s = stream("a");
        let err = s
            .scan_expect(TokenKind::PunctuatorSemicolon, "did you forget a semicolon?")
            .unwrap_err();
        assert!(err.message.contains("did you forget a semicolon?"));
    }
}
