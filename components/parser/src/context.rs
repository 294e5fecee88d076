//! Context-specific parsing state and keyword demotion.

use crate::lexer::{Token, TokenKind};

/// What contexts a keyword could also be a valid identifier in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reservation {
    /// Not reserved; can always be an identifier
    Never,
    /// Reserved in async contexts only
    Async,
    /// Reserved in generators only
    Generator,
    /// Reserved in strict contexts only
    Strict,
    /// Reserved in all contexts; can never be an identifier
    Always,
}

/// The reservation class for keyword tokens. Non-keyword tokens have none.
fn reservation(kind: TokenKind) -> Option<Reservation> {
    use TokenKind::*;
    let r = match kind {
        KeywordAs | KeywordAsync | KeywordFrom | KeywordGet | KeywordMeta | KeywordOf
        | KeywordSet | KeywordTarget => Reservation::Never,

        KeywordAwait => Reservation::Async,
        KeywordYield => Reservation::Generator,

        KeywordImplements | KeywordInterface | KeywordLet | KeywordPackage | KeywordPrivate
        | KeywordProtected | KeywordPublic | KeywordStatic => Reservation::Strict,

        KeywordBreak | KeywordCase | KeywordCatch | KeywordClass | KeywordConst
        | KeywordContinue | KeywordDebugger | KeywordDefault | KeywordDelete | KeywordDo
        | KeywordElse | KeywordEnum | KeywordExport | KeywordExtends | KeywordFalse
        | KeywordFinally | KeywordFor | KeywordFunction | KeywordIf | KeywordImport
        | KeywordIn | KeywordInstanceOf | KeywordNew | KeywordNull | KeywordReturn
        | KeywordSuper | KeywordSwitch | KeywordThis | KeywordThrow | KeywordTrue
        | KeywordTry | KeywordTypeOf | KeywordVar | KeywordVoid | KeywordWhile
        | KeywordWith => Reservation::Always,

        _ => return Option::None,
    };
    Some(r)
}

/// Mutable parsing context: strict-mode, async, and generator flags.
///
/// The parser snapshots this value at scope boundaries (block prologues for
/// strict-mode directives, function and method bodies for async/generator)
/// and assigns the snapshot back on exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseContext {
    /// Strict-mode code ("use strict" directive or module mode)
    pub strict_mode: bool,
    /// Inside an async function body
    pub in_async: bool,
    /// Inside a generator function body
    pub in_generator: bool,
}

impl ParseContext {
    /// Convert a keyword token to an identifier, if permissible in the
    /// context. Non-keyword tokens are returned unchanged. With `force`,
    /// reservation is ignored entirely.
    pub fn keyword_to_identifier(&self, token: Token, force: bool) -> Token {
        let Some(reservation) = reservation(token.kind) else {
            return token;
        };

        if !force {
            match reservation {
                Reservation::Always => return token,
                Reservation::Async if self.in_async => return token,
                Reservation::Generator if self.in_generator => return token,
                Reservation::Strict if self.strict_mode => return token,
                _ => {}
            }
        }

        Token {
            kind: TokenKind::Identifier,
            literal: token.literal,
            newline: token.newline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(kind: TokenKind, literal: &str) -> Token {
        Token {
            kind,
            literal: literal.to_string(),
            newline: false,
        }
    }

    #[test]
    fn test_never_reserved_demotes() {
        let ctx = ParseContext {
            strict_mode: true,
            in_async: true,
            in_generator: true,
        };
        let t = ctx.keyword_to_identifier(kw(TokenKind::KeywordAs, "as"), false);
        assert_eq!(t.kind, TokenKind::Identifier);
        assert_eq!(t.literal, "as");
    }

    #[test]
    fn test_always_reserved_survives_demotion() {
        let ctx = ParseContext::default();
        let t = ctx.keyword_to_identifier(kw(TokenKind::KeywordReturn, "return"), false);
        assert_eq!(t.kind, TokenKind::KeywordReturn);
    }

    #[test]
    fn test_strict_reservation() {
        let mut ctx = ParseContext::default();
        let t = ctx.keyword_to_identifier(kw(TokenKind::KeywordLet, "let"), false);
        assert_eq!(t.kind, TokenKind::Identifier);

        ctx.strict_mode = true;
        let t = ctx.keyword_to_identifier(kw(TokenKind::KeywordLet, "let"), false);
        assert_eq!(t.kind, TokenKind::KeywordLet);
    }

    #[test]
    fn test_async_generator_reservations() {
        let mut ctx = ParseContext::default();
        assert_eq!(
            ctx.keyword_to_identifier(kw(TokenKind::KeywordAwait, "await"), false).kind,
            TokenKind::Identifier
        );
        assert_eq!(
            ctx.keyword_to_identifier(kw(TokenKind::KeywordYield, "yield"), false).kind,
            TokenKind::Identifier
        );

        ctx.in_async = true;
        ctx.in_generator = true;
        assert_eq!(
            ctx.keyword_to_identifier(kw(TokenKind::KeywordAwait, "await"), false).kind,
            TokenKind::KeywordAwait
        );
        assert_eq!(
            ctx.keyword_to_identifier(kw(TokenKind::KeywordYield, "yield"), false).kind,
            TokenKind::KeywordYield
        );
    }

    #[test]
    fn test_force_overrides_reservation() {
        let ctx = ParseContext {
            strict_mode: true,
            ..Default::default()
        };
        let t = ctx.keyword_to_identifier(kw(TokenKind::KeywordDefault, "default"), true);
        assert_eq!(t.kind, TokenKind::Identifier);
        assert_eq!(t.literal, "default");
    }

    #[test]
    fn test_non_keyword_unchanged() {
        let ctx = ParseContext::default();
        let t = ctx.keyword_to_identifier(kw(TokenKind::Identifier, "x"), false);
        assert_eq!(t.kind, TokenKind::Identifier);
    }
}
