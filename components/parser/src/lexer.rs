//! ECMAScript lexer - turns source runes into tokens.
//!
//! The lexer does most of the dirty work of turning text into meaningful
//! lexical tokens to be parsed. It requires some additional state to be
//! passed from the parser to resolve unfortunate ambiguities in ECMA262's
//! grammar: division versus regular expression is handled by the [`Lexer::relex`]
//! entry point, which re-reads the most recently produced token as a regular
//! expression literal. Note that keywords, even ones which may be
//! identifiers, are always lexed as keywords; the parser demotes them to
//! identifiers as the context permits.

use std::sync::Arc;

use core_types::{Location, ParseError};

use crate::scanner::{is_line_terminator, is_whitespace, Scanner};

/// An enumeration of possible token types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TokenKind {
    /// End of input
    None,

    Identifier,
    PrivateIdentifier,

    // Keywords
    KeywordAs,
    KeywordAsync,
    KeywordAwait,
    KeywordBreak,
    KeywordCase,
    KeywordCatch,
    KeywordClass,
    KeywordConst,
    KeywordContinue,
    KeywordDebugger,
    KeywordDefault,
    KeywordDelete,
    KeywordDo,
    KeywordElse,
    KeywordEnum,
    KeywordExport,
    KeywordExtends,
    KeywordFalse,
    KeywordFinally,
    KeywordFor,
    KeywordFrom,
    KeywordFunction,
    KeywordGet,
    KeywordIf,
    KeywordImplements,
    KeywordImport,
    KeywordIn,
    KeywordInstanceOf,
    KeywordInterface,
    KeywordLet,
    KeywordMeta,
    KeywordNew,
    KeywordNull,
    KeywordOf,
    KeywordPackage,
    KeywordPrivate,
    KeywordProtected,
    KeywordPublic,
    KeywordReturn,
    KeywordSet,
    KeywordStatic,
    KeywordSuper,
    KeywordSwitch,
    KeywordTarget,
    KeywordThis,
    KeywordThrow,
    KeywordTrue,
    KeywordTry,
    KeywordTypeOf,
    KeywordVar,
    KeywordVoid,
    KeywordWhile,
    KeywordWith,
    KeywordYield,

    // Punctuators
    PunctuatorOptionalChain,
    PunctuatorOpenBrace,
    PunctuatorOpenParen,
    PunctuatorOpenBracket,
    PunctuatorCloseBracket,
    PunctuatorCloseParen,
    PunctuatorCloseBrace,
    PunctuatorDot,
    PunctuatorEllipsis,
    PunctuatorSemicolon,
    PunctuatorComma,
    PunctuatorLessThan,
    PunctuatorGreaterThan,
    PunctuatorLessThanEqual,
    PunctuatorGreaterThanEqual,
    PunctuatorEqual,
    PunctuatorNotEqual,
    PunctuatorStrictEqual,
    PunctuatorStrictNotEqual,
    PunctuatorPlus,
    PunctuatorMinus,
    PunctuatorMult,
    PunctuatorDiv,
    PunctuatorMod,
    PunctuatorExponent,
    PunctuatorIncrement,
    PunctuatorDecrement,
    PunctuatorLShift,
    PunctuatorRShift,
    PunctuatorUnsignedRShift,
    PunctuatorBitAnd,
    PunctuatorBitOr,
    PunctuatorBitXor,
    PunctuatorNot,
    PunctuatorBitNot,
    PunctuatorLogicalAnd,
    PunctuatorLogicalOr,
    PunctuatorNullCoalesce,
    PunctuatorQuestionMark,
    PunctuatorColon,
    PunctuatorAssign,
    PunctuatorPlusAssign,
    PunctuatorMinusAssign,
    PunctuatorMultAssign,
    PunctuatorDivAssign,
    PunctuatorModAssign,
    PunctuatorExponentAssign,
    PunctuatorLShiftAssign,
    PunctuatorRShiftAssign,
    PunctuatorUnsignedRShiftAssign,
    PunctuatorBitAndAssign,
    PunctuatorBitOrAssign,
    PunctuatorBitXorAssign,
    PunctuatorLogicalAndAssign,
    PunctuatorLogicalOrAssign,
    PunctuatorNullCoalesceAssign,
    PunctuatorFatArrow,

    // Literals
    LiteralNumber,
    LiteralString,
    LiteralRegExp,
    LiteralTemplate,
}

/// Look up the keyword token kind for an identifier spelling, if any.
fn keyword_kind(s: &str) -> Option<TokenKind> {
    let kind = match s {
        "as" => TokenKind::KeywordAs,
        "async" => TokenKind::KeywordAsync,
        "await" => TokenKind::KeywordAwait,
        "break" => TokenKind::KeywordBreak,
        "case" => TokenKind::KeywordCase,
        "catch" => TokenKind::KeywordCatch,
        "class" => TokenKind::KeywordClass,
        "const" => TokenKind::KeywordConst,
        "continue" => TokenKind::KeywordContinue,
        "debugger" => TokenKind::KeywordDebugger,
        "default" => TokenKind::KeywordDefault,
        "delete" => TokenKind::KeywordDelete,
        "do" => TokenKind::KeywordDo,
        "else" => TokenKind::KeywordElse,
        "enum" => TokenKind::KeywordEnum,
        "export" => TokenKind::KeywordExport,
        "extends" => TokenKind::KeywordExtends,
        "false" => TokenKind::KeywordFalse,
        "finally" => TokenKind::KeywordFinally,
        "for" => TokenKind::KeywordFor,
        "from" => TokenKind::KeywordFrom,
        "function" => TokenKind::KeywordFunction,
        "get" => TokenKind::KeywordGet,
        "if" => TokenKind::KeywordIf,
        "implements" => TokenKind::KeywordImplements,
        "import" => TokenKind::KeywordImport,
        "in" => TokenKind::KeywordIn,
        "instanceof" => TokenKind::KeywordInstanceOf,
        "interface" => TokenKind::KeywordInterface,
        "let" => TokenKind::KeywordLet,
        "meta" => TokenKind::KeywordMeta,
        "new" => TokenKind::KeywordNew,
        "null" => TokenKind::KeywordNull,
        "of" => TokenKind::KeywordOf,
        "package" => TokenKind::KeywordPackage,
        "private" => TokenKind::KeywordPrivate,
        "protected" => TokenKind::KeywordProtected,
        "public" => TokenKind::KeywordPublic,
        "return" => TokenKind::KeywordReturn,
        "set" => TokenKind::KeywordSet,
        "static" => TokenKind::KeywordStatic,
        "super" => TokenKind::KeywordSuper,
        "switch" => TokenKind::KeywordSwitch,
        "target" => TokenKind::KeywordTarget,
        "this" => TokenKind::KeywordThis,
        "throw" => TokenKind::KeywordThrow,
        "true" => TokenKind::KeywordTrue,
        "try" => TokenKind::KeywordTry,
        "typeof" => TokenKind::KeywordTypeOf,
        "var" => TokenKind::KeywordVar,
        "void" => TokenKind::KeywordVoid,
        "while" => TokenKind::KeywordWhile,
        "with" => TokenKind::KeywordWith,
        "yield" => TokenKind::KeywordYield,
        _ => return None,
    };
    Some(kind)
}

/// An ECMAScript lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token type
    pub kind: TokenKind,
    /// Raw literal text; empty for punctuators
    pub literal: String,
    /// Whether a line terminator occurred since the previous token
    pub newline: bool,
}

impl Token {
    /// The end-of-input token.
    pub fn eof() -> Self {
        Self {
            kind: TokenKind::None,
            literal: String::new(),
            newline: false,
        }
    }

    fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            literal: String::new(),
            newline: false,
        }
    }

    fn with_literal(kind: TokenKind, literal: String) -> Self {
        Self {
            kind,
            literal,
            newline: false,
        }
    }

    /// The corresponding source text for the token.
    pub fn source(&self) -> String {
        match self.kind {
            TokenKind::PrivateIdentifier => format!("#{}", self.literal),
            TokenKind::PunctuatorOptionalChain => "?.".to_string(),
            TokenKind::PunctuatorOpenBrace => "{".to_string(),
            TokenKind::PunctuatorOpenParen => "(".to_string(),
            TokenKind::PunctuatorOpenBracket => "[".to_string(),
            TokenKind::PunctuatorCloseBracket => "]".to_string(),
            TokenKind::PunctuatorCloseParen => ")".to_string(),
            TokenKind::PunctuatorCloseBrace => "}".to_string(),
            TokenKind::PunctuatorDot => ".".to_string(),
            TokenKind::PunctuatorEllipsis => "...".to_string(),
            TokenKind::PunctuatorSemicolon => ";".to_string(),
            TokenKind::PunctuatorComma => ",".to_string(),
            TokenKind::PunctuatorLessThan => "<".to_string(),
            TokenKind::PunctuatorGreaterThan => ">".to_string(),
            TokenKind::PunctuatorLessThanEqual => "<=".to_string(),
            TokenKind::PunctuatorGreaterThanEqual => ">=".to_string(),
            TokenKind::PunctuatorEqual => "==".to_string(),
            TokenKind::PunctuatorNotEqual => "!=".to_string(),
            TokenKind::PunctuatorStrictEqual => "===".to_string(),
            TokenKind::PunctuatorStrictNotEqual => "!==".to_string(),
            TokenKind::PunctuatorPlus => "+".to_string(),
            TokenKind::PunctuatorMinus => "-".to_string(),
            TokenKind::PunctuatorMult => "*".to_string(),
            TokenKind::PunctuatorDiv => "/".to_string(),
            TokenKind::PunctuatorMod => "%".to_string(),
            TokenKind::PunctuatorExponent => "**".to_string(),
            TokenKind::PunctuatorIncrement => "++".to_string(),
            TokenKind::PunctuatorDecrement => "--".to_string(),
            TokenKind::PunctuatorLShift => "<<".to_string(),
            TokenKind::PunctuatorRShift => ">>".to_string(),
            TokenKind::PunctuatorUnsignedRShift => ">>>".to_string(),
            TokenKind::PunctuatorBitAnd => "&".to_string(),
            TokenKind::PunctuatorBitOr => "|".to_string(),
            TokenKind::PunctuatorBitXor => "^".to_string(),
            TokenKind::PunctuatorNot => "!".to_string(),
            TokenKind::PunctuatorBitNot => "~".to_string(),
            TokenKind::PunctuatorLogicalAnd => "&&".to_string(),
            TokenKind::PunctuatorLogicalOr => "||".to_string(),
            TokenKind::PunctuatorNullCoalesce => "??".to_string(),
            TokenKind::PunctuatorQuestionMark => "?".to_string(),
            TokenKind::PunctuatorColon => ":".to_string(),
            TokenKind::PunctuatorAssign => "=".to_string(),
            TokenKind::PunctuatorPlusAssign => "+=".to_string(),
            TokenKind::PunctuatorMinusAssign => "-=".to_string(),
            TokenKind::PunctuatorMultAssign => "*=".to_string(),
            TokenKind::PunctuatorDivAssign => "/=".to_string(),
            TokenKind::PunctuatorModAssign => "%=".to_string(),
            TokenKind::PunctuatorExponentAssign => "**=".to_string(),
            TokenKind::PunctuatorLShiftAssign => "<<=".to_string(),
            TokenKind::PunctuatorRShiftAssign => ">>=".to_string(),
            TokenKind::PunctuatorUnsignedRShiftAssign => ">>>=".to_string(),
            TokenKind::PunctuatorBitAndAssign => "&=".to_string(),
            TokenKind::PunctuatorBitOrAssign => "|=".to_string(),
            TokenKind::PunctuatorBitXorAssign => "^=".to_string(),
            TokenKind::PunctuatorLogicalAndAssign => "&&=".to_string(),
            TokenKind::PunctuatorLogicalOrAssign => "||=".to_string(),
            TokenKind::PunctuatorNullCoalesceAssign => "??=".to_string(),
            TokenKind::PunctuatorFatArrow => "=>".to_string(),
            TokenKind::None => "end of input".to_string(),
            _ => self.literal.clone(),
        }
    }

    /// The decoded value of a string literal token.
    ///
    /// Escape sequences are resolved; line continuations are removed; an
    /// escape that does not form a recognised sequence keeps the escaped
    /// rune.
    pub fn string_value(&self) -> String {
        decode_string_literal(&self.literal)
    }

    /// The numeric value of a number literal token.
    ///
    /// Handles binary/octal/hex prefixes, numeric separators, exponents, and
    /// the BigInt `n` suffix (the suffix is stripped; the digits convert as
    /// an integer).
    pub fn number_value(&self) -> f64 {
        let lit = self.literal.strip_suffix('n').unwrap_or(&self.literal);
        let digits: String = lit.chars().filter(|c| *c != '_').collect();

        let radix = match digits.get(..2) {
            Some("0b") | Some("0B") => Some(2),
            Some("0o") | Some("0O") => Some(8),
            Some("0x") | Some("0X") => Some(16),
            _ => None,
        };

        match radix {
            Some(base) => digits[2..]
                .chars()
                .filter_map(|c| c.to_digit(base))
                .fold(0f64, |acc, d| acc * f64::from(base) + f64::from(d)),
            None => digits.parse::<f64>().unwrap_or(f64::NAN),
        }
    }
}

/// An ECMAScript regular expression token.
#[derive(Debug, Clone, PartialEq)]
pub struct RegExpToken {
    /// The underlying token; its literal is the full source text including
    /// delimiters and flags
    pub token: Token,
    /// The pattern body, without delimiters
    pub pattern: String,
    /// The flag characters following the closing delimiter
    pub flags: String,
}

/// Decode the contents of a raw string literal (quotes included).
fn decode_string_literal(raw: &str) -> String {
    let inner: Vec<char> = raw.chars().collect();
    if inner.len() < 2 {
        return String::new();
    }
    let inner = &inner[1..inner.len() - 1];

    let mut out = String::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let c = inner[i];
        i += 1;
        if c != '\\' || i >= inner.len() {
            if c != '\\' {
                out.push(c);
            }
            continue;
        }

        let e = inner[i];
        i += 1;
        match e {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000c}'),
            'v' => out.push('\u{000b}'),
            '0' => out.push('\0'),
            '\r' => {
                // Line continuation; CRLF counts as one terminator.
                if i < inner.len() && inner[i] == '\n' {
                    i += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let hex: String = inner[i..].iter().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) if hex.len() == 2 => {
                        out.push(ch);
                        i += 2;
                    }
                    _ => out.push('x'),
                }
            }
            'u' => {
                if i < inner.len() && inner[i] == '{' {
                    let close = inner[i..].iter().position(|c| *c == '}');
                    let decoded = close.and_then(|end| {
                        let hex: String = inner[i + 1..i + end].iter().collect();
                        u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                    });
                    match (decoded, close) {
                        (Some(ch), Some(end)) => {
                            out.push(ch);
                            i += end + 1;
                        }
                        _ => out.push('u'),
                    }
                } else {
                    let hex: String = inner[i..].iter().take(4).collect();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(ch) if hex.len() == 4 => {
                            out.push(ch);
                            i += 4;
                        }
                        _ => out.push('u'),
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Lexer for ECMAScript source, per ECMA262 section 12.
pub struct Lexer {
    s: Scanner,
    last_token: Token,
    newline: bool,
}

impl Lexer {
    /// Create a new lexer over the given source text.
    pub fn new(source: &str, uri: Option<Arc<str>>) -> Self {
        Self {
            s: Scanner::new(source, uri),
            last_token: Token::eof(),
            newline: false,
        }
    }

    /// The current source location of the lexer.
    pub fn location(&self) -> Location {
        self.s.location()
    }

    /// Return the next token by scanning the input stream.
    pub fn lex(&mut self) -> Result<Token, ParseError> {
        let mut t = self.consume_next_token()?;
        if self.newline {
            t.newline = true;
            self.newline = false;
        }
        self.last_token = t.clone();
        Ok(t)
    }

    /// Relex the last token as a regular expression.
    ///
    /// Only meaningful when the previous token was `/` or `/=`; the parser
    /// calls this when a primary expression is expected at that token.
    pub fn relex(&mut self) -> Result<RegExpToken, ParseError> {
        let seed = self.last_token.clone();
        let t = self.consume_regex(&seed)?;
        self.last_token = t.token.clone();
        Ok(t)
    }

    fn syntax_error(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(message, self.s.location())
    }

    /// Consume the next rune if it matches, leaving the stream untouched
    /// otherwise.
    fn match_char(&mut self, expected: char) -> bool {
        match self.s.read() {
            Some(c) if c == expected => true,
            _ => {
                self.s.unread();
                false
            }
        }
    }

    /// Lex a regex, using the passed token as initial state.
    fn consume_regex(&mut self, seed: &Token) -> Result<RegExpToken, ParseError> {
        let mut lit = seed.source();
        let mut pat: String = lit.chars().skip(1).collect();
        let mut flg = String::new();

        loop {
            let r = match self.s.read() {
                Some(r) => r,
                None => return Err(self.syntax_error("unexpected EOF")),
            };
            lit.push(r);

            match r {
                '/' => break,
                '[' => {
                    // Consume the character class; a `/` inside it does not
                    // end the pattern.
                    pat.push(r);
                    loop {
                        let r = match self.s.read() {
                            Some(r) => r,
                            None => return Err(self.syntax_error("unexpected EOF")),
                        };
                        lit.push(r);
                        pat.push(r);

                        if r == '\\' {
                            let r = match self.s.read() {
                                Some(r) => r,
                                None => return Err(self.syntax_error("unexpected EOF")),
                            };
                            lit.push(r);
                            pat.push(r);
                        } else if r == ']' {
                            break;
                        }
                    }
                }
                '\\' => {
                    let r = match self.s.read() {
                        Some(r) => r,
                        None => return Err(self.syntax_error("unexpected EOF")),
                    };
                    lit.push(r);
                    if r == '/' || r == '\\' {
                        pat.push(r);
                    } else {
                        pat.push('\\');
                        pat.push(r);
                    }
                }
                _ => pat.push(r),
            }
        }

        loop {
            match self.s.read() {
                Some(r) if is_identifier_continue(r) => {
                    flg.push(r);
                    lit.push(r);
                }
                _ => {
                    self.s.unread();
                    break;
                }
            }
        }

        Ok(RegExpToken {
            token: Token::with_literal(TokenKind::LiteralRegExp, lit),
            pattern: pat,
            flags: flg,
        })
    }

    /// Consume a multi-line comment, eating until after the next `*/`.
    fn consume_multi_line_comment(&mut self) -> Result<(), ParseError> {
        loop {
            match self.s.read() {
                Some('*') => {
                    if self.match_char('/') {
                        return Ok(());
                    }
                }
                Some(r) if is_line_terminator(r) => self.newline = true,
                Some(_) => {}
                None => return Err(self.syntax_error("unexpected EOF")),
            }
        }
    }

    /// Consume a single-line comment, eating until after the next line
    /// terminator.
    fn consume_single_line_comment(&mut self) {
        loop {
            match self.s.read() {
                Some(r) if is_line_terminator(r) => {
                    self.newline = true;
                    return;
                }
                Some(_) => {}
                None => return,
            }
        }
    }

    /// Consume an identifier.
    fn consume_identifier(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let r = match self.s.read() {
            Some(r) if is_identifier_start(r) => r,
            Some(r) => {
                return Err(self.syntax_error(format!("expected IdentifierStart, got '{}'", r)))
            }
            None => return Err(self.syntax_error("expected IdentifierStart, got EOF")),
        };

        let mut lit = String::new();
        lit.push(r);
        loop {
            match self.s.read() {
                Some(r) if is_identifier_continue(r) => lit.push(r),
                _ => {
                    self.s.unread();
                    break;
                }
            }
        }

        if kind == TokenKind::Identifier {
            if let Some(kw) = keyword_kind(&lit) {
                return Ok(Token::with_literal(kw, lit));
            }
        }
        Ok(Token::with_literal(kind, lit))
    }

    /// Consume digits of the given radix, with numeric separator validation
    /// and an optional BigInt suffix. At least one digit is required.
    fn consume_radix_part(
        &mut self,
        mut lit: String,
        is_digit: fn(char) -> bool,
        expected: &str,
    ) -> Result<String, ParseError> {
        match self.s.read() {
            Some(r) if is_digit(r) => lit.push(r),
            Some(r) => return Err(self.syntax_error(format!("expected {}, got '{}'", expected, r))),
            None => return Err(self.syntax_error(format!("expected {}, got EOF", expected))),
        }

        loop {
            match self.s.read() {
                Some(r) if is_digit(r) => lit.push(r),
                Some('_') => match self.s.read() {
                    Some(r) if is_digit(r) => lit.push(r),
                    Some(r) => {
                        return Err(self.syntax_error(format!("expected {}, got '{}'", expected, r)))
                    }
                    None => {
                        return Err(self.syntax_error(format!("expected {}, got EOF", expected)))
                    }
                },
                Some('n') => {
                    lit.push('n');
                    break;
                }
                _ => {
                    self.s.unread();
                    break;
                }
            }
        }

        Ok(lit)
    }

    fn consume_binary_part(&mut self, lit: String) -> Result<String, ParseError> {
        self.consume_radix_part(lit, |r| r == '0' || r == '1', "BinaryDigit")
    }

    fn consume_octal_part(&mut self, lit: String) -> Result<String, ParseError> {
        self.consume_radix_part(lit, |r| ('0'..='7').contains(&r), "OctalDigit")
    }

    fn consume_hex_part(&mut self, lit: String) -> Result<String, ParseError> {
        self.consume_radix_part(lit, |r| r.is_ascii_hexdigit(), "HexDigit")
    }

    /// Consume a decimal literal: integer digits, then an optional fraction,
    /// exponent, or BigInt suffix.
    fn consume_decimal_part(&mut self, mut lit: String) -> Result<String, ParseError> {
        match self.s.read() {
            Some(r) if r.is_ascii_digit() => lit.push(r),
            Some(r) => return Err(self.syntax_error(format!("expected DecimalDigit, got '{}'", r))),
            None => return Err(self.syntax_error("expected DecimalDigit, got EOF")),
        }

        loop {
            match self.s.read() {
                Some(r) if r.is_ascii_digit() => lit.push(r),
                Some('_') => match self.s.read() {
                    Some(r) if r.is_ascii_digit() => lit.push(r),
                    Some(r) => {
                        return Err(self.syntax_error(format!("expected DecimalDigit, got '{}'", r)))
                    }
                    None => return Err(self.syntax_error("expected DecimalDigit, got EOF")),
                },
                Some('.') => {
                    lit.push('.');
                    return self.consume_fractional_part(lit);
                }
                Some(r) if is_exponent_indicator(r) => {
                    lit.push(r);
                    return self.consume_exponent_part(lit);
                }
                Some('n') => {
                    lit.push('n');
                    break;
                }
                _ => {
                    self.s.unread();
                    break;
                }
            }
        }

        Ok(lit)
    }

    /// Consume the digits after a decimal point, plus an optional exponent.
    fn consume_fractional_part(&mut self, mut lit: String) -> Result<String, ParseError> {
        match self.s.read() {
            Some(r) if r.is_ascii_digit() => lit.push(r),
            Some(r) => return Err(self.syntax_error(format!("expected DecimalDigit, got '{}'", r))),
            None => return Err(self.syntax_error("expected DecimalDigit, got EOF")),
        }

        loop {
            match self.s.read() {
                Some(r) if r.is_ascii_digit() => lit.push(r),
                Some('_') => match self.s.read() {
                    Some(r) if r.is_ascii_digit() => lit.push(r),
                    Some(r) => {
                        return Err(self.syntax_error(format!("expected DecimalDigit, got '{}'", r)))
                    }
                    None => return Err(self.syntax_error("expected DecimalDigit, got EOF")),
                },
                _ => {
                    self.s.unread();
                    break;
                }
            }
        }

        match self.s.read() {
            Some(r) if is_exponent_indicator(r) => {
                lit.push(r);
                self.consume_exponent_part(lit)
            }
            _ => {
                self.s.unread();
                Ok(lit)
            }
        }
    }

    /// Consume the sign and digits of an exponent. The indicator has already
    /// been appended to the literal.
    fn consume_exponent_part(&mut self, mut lit: String) -> Result<String, ParseError> {
        match self.s.read() {
            Some(r) if r == '+' || r == '-' => {
                lit.push(r);
                match self.s.read() {
                    Some(r) if r.is_ascii_digit() => lit.push(r),
                    Some(r) => {
                        return Err(self.syntax_error(format!("expected DecimalDigit, got '{}'", r)))
                    }
                    None => return Err(self.syntax_error("expected DecimalDigit, got EOF")),
                }
            }
            Some(r) if r.is_ascii_digit() => lit.push(r),
            Some(r) => {
                return Err(
                    self.syntax_error(format!("expected DecimalDigit, +, or -, got '{}'", r))
                )
            }
            None => return Err(self.syntax_error("expected DecimalDigit, +, or -, got EOF")),
        }

        loop {
            match self.s.read() {
                Some(r) if r.is_ascii_digit() => lit.push(r),
                Some('_') => match self.s.read() {
                    Some(r) if r.is_ascii_digit() => lit.push(r),
                    Some(r) => {
                        return Err(self.syntax_error(format!("expected DecimalDigit, got '{}'", r)))
                    }
                    None => return Err(self.syntax_error("expected DecimalDigit, got EOF")),
                },
                _ => {
                    self.s.unread();
                    break;
                }
            }
        }

        Ok(lit)
    }

    fn consume_string_literal(&mut self, quote: char) -> Result<Token, ParseError> {
        let mut c = String::new();
        c.push(quote);
        loop {
            let r = match self.s.read() {
                Some(r) => r,
                None => return Err(self.syntax_error("unexpected EOF")),
            };
            c.push(r);
            if r == quote {
                break;
            }
            if r == '\\' {
                match self.s.read() {
                    Some(r) => c.push(r),
                    None => return Err(self.syntax_error("unexpected EOF")),
                }
            }
        }

        Ok(Token::with_literal(TokenKind::LiteralString, c))
    }

    fn consume_next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            let r = match self.s.read() {
                Some(r) => r,
                None => return Ok(Token::eof()),
            };
            if is_line_terminator(r) {
                self.newline = true;
                continue;
            }
            if is_whitespace(r) {
                continue;
            }

            return match r {
                '{' => Ok(Token::new(TokenKind::PunctuatorOpenBrace)),
                '(' => Ok(Token::new(TokenKind::PunctuatorOpenParen)),
                '[' => Ok(Token::new(TokenKind::PunctuatorOpenBracket)),
                ']' => Ok(Token::new(TokenKind::PunctuatorCloseBracket)),
                ')' => Ok(Token::new(TokenKind::PunctuatorCloseParen)),
                '}' => Ok(Token::new(TokenKind::PunctuatorCloseBrace)),
                ';' => Ok(Token::new(TokenKind::PunctuatorSemicolon)),
                ',' => Ok(Token::new(TokenKind::PunctuatorComma)),
                ':' => Ok(Token::new(TokenKind::PunctuatorColon)),
                '~' => Ok(Token::new(TokenKind::PunctuatorBitNot)),

                '.' => {
                    if self.match_char('.') {
                        if self.match_char('.') {
                            Ok(Token::new(TokenKind::PunctuatorEllipsis))
                        } else {
                            Err(self.syntax_error("expected `.`"))
                        }
                    } else {
                        match self.s.read() {
                            Some(d) if d.is_ascii_digit() => {
                                self.s.unread();
                                let lit = self.consume_fractional_part(".".to_string())?;
                                Ok(Token::with_literal(TokenKind::LiteralNumber, lit))
                            }
                            _ => {
                                self.s.unread();
                                Ok(Token::new(TokenKind::PunctuatorDot))
                            }
                        }
                    }
                }

                '0' => {
                    let mut lit = String::from("0");
                    match self.s.read() {
                        Some('n') => Ok(Token::with_literal(
                            TokenKind::LiteralNumber,
                            "0n".to_string(),
                        )),
                        Some(b @ ('b' | 'B')) => {
                            lit.push(b);
                            let lit = self.consume_binary_part(lit)?;
                            Ok(Token::with_literal(TokenKind::LiteralNumber, lit))
                        }
                        Some(o @ ('o' | 'O')) => {
                            lit.push(o);
                            let lit = self.consume_octal_part(lit)?;
                            Ok(Token::with_literal(TokenKind::LiteralNumber, lit))
                        }
                        Some(x @ ('x' | 'X')) => {
                            lit.push(x);
                            let lit = self.consume_hex_part(lit)?;
                            Ok(Token::with_literal(TokenKind::LiteralNumber, lit))
                        }
                        Some('_') => {
                            Err(self.syntax_error("numeric separator can not be used after leading 0"))
                        }
                        Some(d) if d.is_ascii_digit() => {
                            self.s.unread();
                            let lit = self.consume_decimal_part(lit)?;
                            Ok(Token::with_literal(TokenKind::LiteralNumber, lit))
                        }
                        Some('.') => {
                            lit.push('.');
                            let lit = self.consume_fractional_part(lit)?;
                            Ok(Token::with_literal(TokenKind::LiteralNumber, lit))
                        }
                        _ => {
                            self.s.unread();
                            Ok(Token::with_literal(TokenKind::LiteralNumber, lit))
                        }
                    }
                }

                '1'..='9' => {
                    self.s.unread();
                    let lit = self.consume_decimal_part(String::new())?;
                    Ok(Token::with_literal(TokenKind::LiteralNumber, lit))
                }

                '<' => {
                    if self.match_char('<') {
                        if self.match_char('=') {
                            Ok(Token::new(TokenKind::PunctuatorLShiftAssign))
                        } else {
                            Ok(Token::new(TokenKind::PunctuatorLShift))
                        }
                    } else if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorLessThanEqual))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorLessThan))
                    }
                }

                '>' => {
                    if self.match_char('>') {
                        if self.match_char('>') {
                            if self.match_char('=') {
                                Ok(Token::new(TokenKind::PunctuatorUnsignedRShiftAssign))
                            } else {
                                Ok(Token::new(TokenKind::PunctuatorUnsignedRShift))
                            }
                        } else if self.match_char('=') {
                            Ok(Token::new(TokenKind::PunctuatorRShiftAssign))
                        } else {
                            Ok(Token::new(TokenKind::PunctuatorRShift))
                        }
                    } else if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorGreaterThanEqual))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorGreaterThan))
                    }
                }

                '=' => {
                    if self.match_char('=') {
                        if self.match_char('=') {
                            Ok(Token::new(TokenKind::PunctuatorStrictEqual))
                        } else {
                            Ok(Token::new(TokenKind::PunctuatorEqual))
                        }
                    } else if self.match_char('>') {
                        Ok(Token::new(TokenKind::PunctuatorFatArrow))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorAssign))
                    }
                }

                '!' => {
                    if self.match_char('=') {
                        if self.match_char('=') {
                            Ok(Token::new(TokenKind::PunctuatorStrictNotEqual))
                        } else {
                            Ok(Token::new(TokenKind::PunctuatorNotEqual))
                        }
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorNot))
                    }
                }

                '+' => {
                    if self.match_char('+') {
                        Ok(Token::new(TokenKind::PunctuatorIncrement))
                    } else if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorPlusAssign))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorPlus))
                    }
                }

                '-' => {
                    if self.match_char('-') {
                        Ok(Token::new(TokenKind::PunctuatorDecrement))
                    } else if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorMinusAssign))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorMinus))
                    }
                }

                '&' => {
                    if self.match_char('&') {
                        if self.match_char('=') {
                            Ok(Token::new(TokenKind::PunctuatorLogicalAndAssign))
                        } else {
                            Ok(Token::new(TokenKind::PunctuatorLogicalAnd))
                        }
                    } else if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorBitAndAssign))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorBitAnd))
                    }
                }

                '|' => {
                    if self.match_char('|') {
                        if self.match_char('=') {
                            Ok(Token::new(TokenKind::PunctuatorLogicalOrAssign))
                        } else {
                            Ok(Token::new(TokenKind::PunctuatorLogicalOr))
                        }
                    } else if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorBitOrAssign))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorBitOr))
                    }
                }

                '^' => {
                    if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorBitXorAssign))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorBitXor))
                    }
                }

                '?' => {
                    if self.match_char('?') {
                        if self.match_char('=') {
                            Ok(Token::new(TokenKind::PunctuatorNullCoalesceAssign))
                        } else {
                            Ok(Token::new(TokenKind::PunctuatorNullCoalesce))
                        }
                    } else if self.match_char('.') {
                        Ok(Token::new(TokenKind::PunctuatorOptionalChain))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorQuestionMark))
                    }
                }

                '*' => {
                    if self.match_char('*') {
                        if self.match_char('=') {
                            Ok(Token::new(TokenKind::PunctuatorExponentAssign))
                        } else {
                            Ok(Token::new(TokenKind::PunctuatorExponent))
                        }
                    } else if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorMultAssign))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorMult))
                    }
                }

                '%' => {
                    if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorModAssign))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorMod))
                    }
                }

                '/' => {
                    if self.match_char('/') {
                        self.consume_single_line_comment();
                        continue;
                    } else if self.match_char('*') {
                        self.consume_multi_line_comment()?;
                        continue;
                    } else if self.match_char('=') {
                        Ok(Token::new(TokenKind::PunctuatorDivAssign))
                    } else {
                        Ok(Token::new(TokenKind::PunctuatorDiv))
                    }
                }

                '"' | '\'' => self.consume_string_literal(r),

                '`' => Err(self.syntax_error("template literals are not supported")),

                '#' => self.consume_identifier(TokenKind::PrivateIdentifier),

                _ => {
                    if is_identifier_start(r) {
                        self.s.unread();
                        return self.consume_identifier(TokenKind::Identifier);
                    }
                    Err(self.syntax_error(format!("unexpected rune '{}'", r)))
                }
            };
        }
    }
}

/// IdentifierStart: `$`, `_`, or ID_Start.
pub fn is_identifier_start(r: char) -> bool {
    r == '$' || r == '_' || unicode_ident::is_xid_start(r)
}

/// IdentifierPart: `$`, `_`, ZWNJ, ZWJ, or ID_Continue.
pub fn is_identifier_continue(r: char) -> bool {
    r == '$' || r == '_' || r == '\u{200c}' || r == '\u{200d}' || unicode_ident::is_xid_continue(r)
}

fn is_exponent_indicator(r: char) -> bool {
    r == 'e' || r == 'E'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(s: &str) -> Vec<Token> {
        let mut l = Lexer::new(s, None);
        let mut out = Vec::new();
        loop {
            let t = l.lex().expect("lex error");
            if t.kind == TokenKind::None {
                return out;
            }
            out.push(t);
        }
    }

    fn kinds(s: &str) -> Vec<TokenKind> {
        lex_all(s).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_empty() {
        assert!(lex_all("").is_empty());
    }

    #[test]
    fn test_lex_expression() {
        assert_eq!(
            kinds("(1 + 1) / 2"),
            vec![
                TokenKind::PunctuatorOpenParen,
                TokenKind::LiteralNumber,
                TokenKind::PunctuatorPlus,
                TokenKind::LiteralNumber,
                TokenKind::PunctuatorCloseParen,
                TokenKind::PunctuatorDiv,
                TokenKind::LiteralNumber,
            ]
        );
    }

    #[test]
    fn test_lex_keywords_and_identifiers() {
        let tokens = lex_all("async function* f(x) { yield x; }");
        assert_eq!(tokens[0].kind, TokenKind::KeywordAsync);
        assert_eq!(tokens[0].literal, "async");
        assert_eq!(tokens[1].kind, TokenKind::KeywordFunction);
        assert_eq!(tokens[2].kind, TokenKind::PunctuatorMult);
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].literal, "f");
    }

    #[test]
    fn test_lex_private_identifier() {
        let tokens = lex_all("#field");
        assert_eq!(tokens[0].kind, TokenKind::PrivateIdentifier);
        assert_eq!(tokens[0].literal, "field");
        assert_eq!(tokens[0].source(), "#field");
    }

    #[test]
    fn test_newline_flag() {
        let tokens = lex_all("a\nb c");
        assert!(!tokens[0].newline);
        assert!(tokens[1].newline);
        assert!(!tokens[2].newline);
    }

    #[test]
    fn test_newline_flag_from_comments() {
        let tokens = lex_all("a // comment\nb /* c\nd */ e");
        assert!(tokens[1].newline, "single-line comment swallowed terminator");
        assert!(tokens[2].newline, "multi-line comment swallowed terminator");
    }

    #[test]
    fn test_compound_punctuators() {
        assert_eq!(
            kinds(">>>= ?. ?? ??= ** &&= ||= => !== <<="),
            vec![
                TokenKind::PunctuatorUnsignedRShiftAssign,
                TokenKind::PunctuatorOptionalChain,
                TokenKind::PunctuatorNullCoalesce,
                TokenKind::PunctuatorNullCoalesceAssign,
                TokenKind::PunctuatorExponent,
                TokenKind::PunctuatorLogicalAndAssign,
                TokenKind::PunctuatorLogicalOrAssign,
                TokenKind::PunctuatorFatArrow,
                TokenKind::PunctuatorStrictNotEqual,
                TokenKind::PunctuatorLShiftAssign,
            ]
        );
    }

    #[test]
    fn test_punctuator_source_renders() {
        assert_eq!(Token::new(TokenKind::PunctuatorNotEqual).source(), "!=");
        assert_eq!(Token::new(TokenKind::PunctuatorModAssign).source(), "%=");
        assert_eq!(Token::new(TokenKind::PunctuatorOptionalChain).source(), "?.");
    }

    #[test]
    fn test_numbers() {
        let tokens = lex_all("0 7 123 1.5 .25 1e5 1e+5 2.5e-3 0x1f 0b101 0o77 1_000 0x1_f");
        let lits: Vec<&str> = tokens.iter().map(|t| t.literal.as_str()).collect();
        assert_eq!(
            lits,
            vec![
                "0", "7", "123", "1.5", ".25", "1e5", "1e+5", "2.5e-3", "0x1f", "0b101", "0o77",
                "1_000", "0x1_f"
            ]
        );
        assert!(tokens.iter().all(|t| t.kind == TokenKind::LiteralNumber));
    }

    #[test]
    fn test_number_values() {
        let tokens = lex_all("0x1f 0b101 0o77 1_000 2.5e-3 123n");
        let values: Vec<f64> = tokens.iter().map(|t| t.number_value()).collect();
        assert_eq!(values, vec![31.0, 5.0, 63.0, 1000.0, 0.0025, 123.0]);
    }

    #[test]
    fn test_bigint_literals() {
        let tokens = lex_all("0n 123n 0x1fn");
        let lits: Vec<&str> = tokens.iter().map(|t| t.literal.as_str()).collect();
        assert_eq!(lits, vec!["0n", "123n", "0x1fn"]);
    }

    #[test]
    fn test_bad_separators() {
        assert!(Lexer::new("1__0", None).lex().is_err());
        assert!(Lexer::new("1_", None).lex().is_err());
        assert!(Lexer::new("0_1", None).lex().is_err());
        assert!(Lexer::new("0x_1", None).lex().is_err());
    }

    #[test]
    fn test_string_literals() {
        let tokens = lex_all(r#"'a' "b\n" "q\"r""#);
        assert_eq!(tokens[0].literal, "'a'");
        assert_eq!(tokens[0].string_value(), "a");
        assert_eq!(tokens[1].literal, "\"b\\n\"");
        assert_eq!(tokens[1].string_value(), "b\n");
        assert_eq!(tokens[2].string_value(), "q\"r");
    }

    #[test]
    fn test_string_unicode_escapes() {
        let tokens = lex_all(r#""A\u{1F600}\x41""#);
        assert_eq!(tokens[0].string_value(), "A\u{1F600}A");
    }

    #[test]
    fn test_unterminated_string() {
        let mut l = Lexer::new("'oops", None);
        assert!(l.lex().is_err());
    }

    #[test]
    fn test_unterminated_comment() {
        let mut l = Lexer::new("/* no end", None);
        assert!(l.lex().is_err());
    }

    #[test]
    fn test_template_rejected() {
        let mut l = Lexer::new("`tpl`", None);
        let err = l.lex().unwrap_err();
        assert!(err.message.contains("template"));
    }

    #[test]
    fn test_relex_simple() {
        let mut l = Lexer::new("/a/g", None);
        let t = l.lex().unwrap();
        assert_eq!(t.kind, TokenKind::PunctuatorDiv);
        let re = l.relex().unwrap();
        assert_eq!(re.pattern, "a");
        assert_eq!(re.flags, "g");
        assert_eq!(re.token.literal, "/a/g");
    }

    #[test]
    fn test_relex_character_class() {
        let mut l = Lexer::new(r"/[\]/]/", None);
        l.lex().unwrap();
        let re = l.relex().unwrap();
        assert_eq!(re.pattern, r"[\]/]");
        assert_eq!(re.token.literal, r"/[\]/]/");
    }

    #[test]
    fn test_relex_div_assign_seed() {
        // `/=` relexes with `=` as the first pattern rune.
        let mut l = Lexer::new("/=a/", None);
        let t = l.lex().unwrap();
        assert_eq!(t.kind, TokenKind::PunctuatorDivAssign);
        let re = l.relex().unwrap();
        assert_eq!(re.pattern, "=a");
    }

    #[test]
    fn test_relex_unterminated() {
        let mut l = Lexer::new("/abc", None);
        l.lex().unwrap();
        assert!(l.relex().is_err());
    }

    #[test]
    fn test_deterministic_tokenisation() {
        let src = "let x = /re/g; // c\nx += 1_0;";
        assert_eq!(lex_all(src), lex_all(src));
    }

    #[test]
    fn test_unicode_identifiers() {
        let tokens = lex_all("déjà $x _y π");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Identifier));
        assert_eq!(tokens[3].literal, "π");
    }
}
