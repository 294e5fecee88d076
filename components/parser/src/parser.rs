//! Recursive descent parser for ECMAScript.
//!
//! A single precedence-climbing routine handles all expressions; the
//! parenthesised-expression production is parsed with a cover grammar that
//! over-generates and is reinterpreted as an arrow-function parameter list
//! when a `=>` follows.

use std::sync::Arc;

use core_types::{Location, ParseError, Span};

use crate::ast::*;
use crate::context::ParseContext;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::stream::TokenStream;

/// What mode to use when parsing the ECMAScript code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Parse the code as a script
    #[default]
    Script,
    /// Parse the code as a module; the whole body is strict
    Module,
    /// Parse the code as a single expression
    Expression,
}

/// Options that adjust how ECMAScript code should be parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// The parse mode
    pub mode: ParseMode,
}

/// Operator precedence levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ExprOrder {
    Comma,
    Assign,
    Conditional,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Exponent,
    Unary,
    Lhs,
    Call,
    Member,
    Primary,
}

/// Context-specific expression parsing behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ExprFlags {
    /// Suppress the `in` relational operator (for `for (… in …)` heads)
    disallow_in: bool,
    /// Parsing inside a possible arrow-function head; permits temporal
    /// productions
    maybe_arrow: bool,
}

impl ExprFlags {
    fn empty() -> Self {
        Self::default()
    }

    fn maybe_arrow() -> Self {
        Self {
            maybe_arrow: true,
            ..Self::default()
        }
    }

    fn disallow_in() -> Self {
        Self {
            disallow_in: true,
            ..Self::default()
        }
    }
}

/// Parser for ECMAScript code, per ECMA262.
pub struct Parser {
    s: TokenStream,
    ctx: ParseContext,
}

impl Parser {
    /// Create a new parser for the given source text.
    pub fn new(source: &str) -> Self {
        Self {
            s: TokenStream::new(Lexer::new(source, None)),
            ctx: ParseContext::default(),
        }
    }

    /// Create a new parser with a source URI for locations and errors.
    pub fn with_uri(source: &str, uri: Arc<str>) -> Self {
        Self {
            s: TokenStream::new(Lexer::new(source, Some(uri))),
            ctx: ParseContext::default(),
        }
    }

    /// Parse the source in the given mode. The first error from any layer
    /// aborts the parse; partial trees are never returned.
    pub fn parse(&mut self, opt: ParseOptions) -> Result<Program, ParseError> {
        match opt.mode {
            ParseMode::Script => self.parse_script(),
            ParseMode::Module => self.parse_module(),
            ParseMode::Expression => {
                let e = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
                Ok(Program::Expression(e))
            }
        }
    }

    // ---- identifier helpers ----

    /// Scan a token and expect an identifier after contextual demotion.
    fn scan_ident(&mut self, err: &str) -> Result<String, ParseError> {
        let t = self.s.scan()?;
        self.expect_ident(t, err)
    }

    /// Scan a token and expect an identifier, demoting even reserved
    /// keywords.
    fn force_scan_ident(&mut self, err: &str) -> Result<String, ParseError> {
        let t = self.s.scan()?;
        self.force_ident(t, err)
    }

    fn expect_ident(&mut self, t: Token, err: &str) -> Result<String, ParseError> {
        let t = self.ctx.keyword_to_identifier(t, false);
        if t.kind != TokenKind::Identifier {
            return Err(self
                .s
                .syntax_error(format!("expected identifier, got {}: {}", t.source(), err)));
        }
        Ok(t.literal)
    }

    fn force_ident(&mut self, t: Token, err: &str) -> Result<String, ParseError> {
        let t = self.ctx.keyword_to_identifier(t, true);
        if t.kind != TokenKind::Identifier {
            return Err(self
                .s
                .syntax_error(format!("expected identifier, got {}: {}", t.source(), err)));
        }
        Ok(t.literal)
    }

    /// In strict code, `arguments` and `eval` cannot be bound or assigned.
    fn check_restricted_name(&self, name: &str) -> Result<(), ParseError> {
        if self.ctx.strict_mode && (name == "arguments" || name == "eval") {
            return Err(self
                .s
                .syntax_error(format!("`{}` is restricted in strict mode", name)));
        }
        Ok(())
    }

    /// Expect either a semicolon, or an eligible newline for semicolon
    /// insertion.
    fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        let t = self.s.peek_at(0)?;

        if t.kind != TokenKind::PunctuatorSemicolon {
            // Part of the automatic semicolon insertion algorithm.
            if t.newline || t.kind == TokenKind::PunctuatorCloseBrace || t.kind == TokenKind::None {
                return Ok(());
            }
        }

        self.s
            .scan_expect(TokenKind::PunctuatorSemicolon, "did you forget a semicolon?")?;
        Ok(())
    }

    fn span_from(&self, start: &Location) -> Span {
        Span {
            start: start.clone(),
            end: self.s.location(),
        }
    }

    // ---- roots ----

    fn parse_script(&mut self) -> Result<Program, ParseError> {
        let start = self.s.location();
        let mut body = Vec::new();

        while self.s.peek_at(0)?.kind != TokenKind::None {
            let mut stmt = self.parse_statement_item()?;
            if body.is_empty() {
                self.apply_directive(&mut stmt);
            }
            body.push(stmt);
        }

        Ok(Program::Script {
            body,
            span: self.span_from(&start),
        })
    }

    fn parse_module(&mut self) -> Result<Program, ParseError> {
        // Modules are always strict.
        self.ctx.strict_mode = true;

        let start = self.s.location();
        let mut body = Vec::new();

        while self.s.peek_at(0)?.kind != TokenKind::None {
            let mut item = self.parse_module_item()?;
            if body.is_empty() {
                self.apply_directive(&mut item);
            }
            body.push(item);
        }

        Ok(Program::Module {
            body,
            span: self.span_from(&start),
        })
    }

    fn parse_module_item(&mut self) -> Result<Statement, ParseError> {
        match self.s.peek_at(0)?.kind {
            TokenKind::KeywordImport => Ok(Statement::Import(self.parse_import_decl()?)),
            TokenKind::KeywordExport => {
                Err(self.s.syntax_error("export declarations are not supported"))
            }
            _ => self.parse_statement_item(),
        }
    }

    /// If the statement is a "use strict" string-literal expression
    /// statement, enable strict mode for the rest of the scope and mark the
    /// statement as a directive.
    fn apply_directive(&mut self, stmt: &mut Statement) {
        if let Statement::Expression(es) = stmt {
            if let Expression::String { value, .. } = &es.expression {
                if value == "use strict" {
                    self.ctx.strict_mode = true;
                    es.directive = Some("use strict".to_string());
                }
            }
        }
    }

    // ---- statements ----

    fn parse_statement_item(&mut self) -> Result<Statement, ParseError> {
        if let Some(n) = self.parse_statement()? {
            return Ok(n);
        }
        if let Some(n) = self.parse_declaration()? {
            return Ok(n);
        }
        Err(self.s.syntax_error("expected declaration or statement"))
    }

    /// Parse a statement in a context that requires one.
    fn parse_statement_required(&mut self) -> Result<Statement, ParseError> {
        match self.parse_statement()? {
            Some(n) => Ok(n),
            None => Err(self.s.syntax_error("expected statement")),
        }
    }

    fn parse_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        use TokenKind::*;
        match self.s.peek_at(0)?.kind {
            PunctuatorOpenBrace => Ok(Some(Statement::Block(self.parse_block()?))),
            KeywordVar => Ok(Some(Statement::Variable(self.parse_variable_statement()?))),
            PunctuatorSemicolon => Ok(Some(self.parse_empty_statement()?)),
            KeywordIf => Ok(Some(self.parse_if_statement()?)),
            // Unary operators
            PunctuatorIncrement | PunctuatorDecrement | KeywordDelete | KeywordVoid
            | KeywordTypeOf | PunctuatorPlus | PunctuatorMinus | PunctuatorBitNot
            | PunctuatorNot
            // Primary expressions. Note the absence of `{`, `function`, and
            // `class`. `async` is allowed if not followed by `function` with
            // no newline. `let` is allowed if not followed by `[`, `{`, or an
            // identifier. Expressions starting with other identifiers are
            // handled further down.
            | KeywordThis | KeywordNull | KeywordTrue | KeywordFalse | KeywordNew
            | LiteralNumber | LiteralString | LiteralTemplate | PunctuatorOpenBracket
            | KeywordAsync | KeywordLet | PunctuatorOpenParen
            // These get relexed as a regexp, so they can begin an expression.
            | PunctuatorDiv | PunctuatorDivAssign => {
                if self.s.peek_at(0)?.kind == KeywordAsync {
                    let next = self.s.peek_at(1)?;
                    if next.kind == KeywordFunction && !next.newline {
                        // Async function declaration.
                        return Ok(Option::None);
                    }
                }
                if self.s.peek_at(0)?.kind == KeywordLet {
                    let next = self.s.peek_at(1)?;
                    if next.kind == PunctuatorOpenBracket
                        || next.kind == PunctuatorOpenBrace
                        || self.ctx.keyword_to_identifier(next, true).kind == Identifier
                    {
                        // Lexical declaration.
                        return Ok(Option::None);
                    }
                }
                Ok(Some(self.parse_expression_statement()?))
            }
            KeywordDo => Ok(Some(self.parse_do_while_statement()?)),
            KeywordWhile => Ok(Some(self.parse_while_statement()?)),
            KeywordFor => Ok(Some(self.parse_for_statement()?)),
            KeywordSwitch => Ok(Some(self.parse_switch_statement()?)),
            KeywordContinue => Ok(Some(self.parse_continue_statement()?)),
            KeywordBreak => Ok(Some(self.parse_break_statement()?)),
            KeywordReturn => Ok(Some(self.parse_return_statement()?)),
            KeywordThrow => Ok(Some(self.parse_throw_statement()?)),
            KeywordTry => Ok(Some(self.parse_try_statement()?)),
            KeywordWith => Err(self.s.syntax_error("with statements are not supported")),
            KeywordDebugger => Err(self.s.syntax_error("debugger statements are not supported")),
            _ => {
                let t = self.s.peek_at(0)?;
                if self.ctx.keyword_to_identifier(t, false).kind == Identifier {
                    if self.s.peek_at(1)?.kind == PunctuatorColon {
                        return Ok(Some(self.parse_labeled_statement()?));
                    }
                    return Ok(Some(self.parse_expression_statement()?));
                }
                Ok(Option::None)
            }
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let expression = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
        let span = expression.span().clone();
        self.expect_semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            expression,
            directive: None,
            span,
        }))
    }

    fn parse_block(&mut self) -> Result<BlockStatement, ParseError> {
        let start = self.s.location();
        self.s.scan_expect(
            TokenKind::PunctuatorOpenBrace,
            "expected block opening brace `{`",
        )?;

        let mut body = Vec::new();

        // Early exit for empty block.
        if self.s.peek_at(0)?.kind == TokenKind::PunctuatorCloseBrace {
            self.s.scan()?;
            return Ok(BlockStatement {
                body,
                span: self.span_from(&start),
            });
        }

        let ctx = self.ctx;

        // Parse the first statement separately so directives can be read
        // out of it; a "use strict" directive applies to the rest of the
        // block.
        let mut stmt = self.parse_statement_item()?;
        self.apply_directive(&mut stmt);
        body.push(stmt);

        loop {
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorCloseBrace {
                self.s.scan()?;
                break;
            }
            body.push(self.parse_statement_item()?);
        }

        self.ctx = ctx;

        Ok(BlockStatement {
            body,
            span: self.span_from(&start),
        })
    }

    fn parse_variable_statement(&mut self) -> Result<VariableDeclaration, ParseError> {
        let mut n = self.parse_variable_statement_no_semicolon()?;
        self.expect_semicolon()?;
        n.span.end = self.s.location();
        Ok(n)
    }

    fn parse_variable_statement_no_semicolon(&mut self) -> Result<VariableDeclaration, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordVar, "expected variable declaration")?;
        let declarations = self.parse_variable_declarations()?;
        Ok(VariableDeclaration {
            kind: VariableKind::Var,
            declarations,
            span: self.span_from(&start),
        })
    }

    fn parse_variable_declarations(&mut self) -> Result<Vec<VariableDeclarator>, ParseError> {
        let mut v = Vec::new();
        loop {
            v.push(self.parse_variable_declarator()?);
            if self.s.peek_at(0)?.kind != TokenKind::PunctuatorComma {
                break;
            }
            self.s.scan()?;
        }
        Ok(v)
    }

    fn parse_variable_declarator(&mut self) -> Result<VariableDeclarator, ParseError> {
        let t = self.ctx.keyword_to_identifier(self.s.peek_at(0)?, false);
        let id = match t.kind {
            TokenKind::Identifier => {
                let name = self.scan_ident("expected variable identifier")?;
                self.check_restricted_name(&name)?;
                BindingPattern::Identifier(name)
            }
            TokenKind::PunctuatorOpenBracket => {
                BindingPattern::Array(self.parse_array_binding_pattern()?)
            }
            TokenKind::PunctuatorOpenBrace => {
                BindingPattern::Object(self.parse_object_binding_pattern()?)
            }
            _ => {
                let t = self.s.scan()?;
                return Err(self.s.syntax_error(format!(
                    "unexpected token in variable declaration: {}",
                    t.source()
                )));
            }
        };

        let init = if self.s.peek_at(0)?.kind == TokenKind::PunctuatorAssign {
            self.s.scan()?;
            Some(self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?)
        } else {
            None
        };

        Ok(VariableDeclarator { id, init })
    }

    fn parse_array_binding_pattern(&mut self) -> Result<ArrayBindingPattern, ParseError> {
        self.s.scan_expect(
            TokenKind::PunctuatorOpenBracket,
            "expected array binding pattern",
        )?;
        self.parse_array_binding_pattern_tail()
    }

    fn parse_array_binding_pattern_tail(&mut self) -> Result<ArrayBindingPattern, ParseError> {
        let mut n = ArrayBindingPattern::default();
        loop {
            let t = self.ctx.keyword_to_identifier(self.s.scan()?, false);
            let pattern = match t.kind {
                TokenKind::Identifier => BindingPattern::Identifier(t.literal),
                TokenKind::PunctuatorComma => {
                    // Elision.
                    n.elements.push(None);
                    continue;
                }
                TokenKind::PunctuatorCloseBracket => return Ok(n),
                TokenKind::PunctuatorOpenBracket => {
                    BindingPattern::Array(self.parse_array_binding_pattern_tail()?)
                }
                TokenKind::PunctuatorOpenBrace => {
                    BindingPattern::Object(self.parse_object_binding_pattern_tail()?)
                }
                TokenKind::PunctuatorEllipsis => {
                    let t = self.ctx.keyword_to_identifier(self.s.peek_at(0)?, false);
                    let rest = match t.kind {
                        TokenKind::Identifier => BindingPattern::Identifier(
                            self.scan_ident("expected variable identifier")?,
                        ),
                        TokenKind::PunctuatorOpenBracket => {
                            BindingPattern::Array(self.parse_array_binding_pattern()?)
                        }
                        TokenKind::PunctuatorOpenBrace => {
                            BindingPattern::Object(self.parse_object_binding_pattern()?)
                        }
                        _ => {
                            let t = self.s.scan()?;
                            return Err(self.s.syntax_error(format!(
                                "unexpected token in rest pattern: {}",
                                t.source()
                            )));
                        }
                    };
                    n.rest = Some(Box::new(rest));
                    self.s.scan_expect(
                        TokenKind::PunctuatorCloseBracket,
                        "expected closing bracket",
                    )?;
                    return Ok(n);
                }
                _ => {
                    return Err(self.s.syntax_error(format!(
                        "unexpected token in array binding pattern: {}",
                        t.source()
                    )));
                }
            };

            let mut b = BindingElement {
                pattern,
                default: None,
            };

            // Default syntax.
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorAssign {
                self.s.scan()?;
                b.default = Some(self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?);
            }

            n.elements.push(Some(b));

            let t = self.s.scan()?;
            match t.kind {
                TokenKind::PunctuatorComma => continue,
                TokenKind::PunctuatorCloseBracket => return Ok(n),
                _ => {
                    return Err(self
                        .s
                        .syntax_error(format!("expected `,` or `]`, but got: {}", t.source())));
                }
            }
        }
    }

    fn parse_object_binding_pattern(&mut self) -> Result<ObjectBindingPattern, ParseError> {
        self.s.scan_expect(
            TokenKind::PunctuatorOpenBrace,
            "expected object binding pattern",
        )?;
        self.parse_object_binding_pattern_tail()
    }

    fn parse_object_binding_pattern_tail(&mut self) -> Result<ObjectBindingPattern, ParseError> {
        let mut n = ObjectBindingPattern::default();
        loop {
            let t = self.ctx.keyword_to_identifier(self.s.scan()?, false);
            let mut b = match t.kind {
                TokenKind::Identifier => BindingProperty {
                    name: t.literal,
                    value: None,
                    default: None,
                },
                TokenKind::PunctuatorEllipsis => {
                    n.rest = Some(self.scan_ident("expected rest identifier")?);
                    self.s
                        .scan_expect(TokenKind::PunctuatorCloseBrace, "expected closing brace")?;
                    return Ok(n);
                }
                TokenKind::PunctuatorCloseBrace => return Ok(n),
                _ => {
                    return Err(self.s.syntax_error(format!(
                        "expected property name, `...`, or `}}`, but got: {}",
                        t.source()
                    )));
                }
            };

            // Binding syntax.
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorColon {
                self.s.scan()?;
                let t = self.ctx.keyword_to_identifier(self.s.scan()?, false);
                b.value = Some(match t.kind {
                    TokenKind::Identifier => BindingPattern::Identifier(t.literal),
                    TokenKind::PunctuatorOpenBracket => {
                        BindingPattern::Array(self.parse_array_binding_pattern_tail()?)
                    }
                    TokenKind::PunctuatorOpenBrace => {
                        BindingPattern::Object(self.parse_object_binding_pattern_tail()?)
                    }
                    _ => {
                        return Err(self.s.syntax_error(format!(
                            "unexpected token in object binding pattern: {}",
                            t.source()
                        )));
                    }
                });
            }

            // Default syntax.
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorAssign {
                self.s.scan()?;
                b.default = Some(self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?);
            }

            n.properties.push(b);

            let t = self.s.scan()?;
            match t.kind {
                TokenKind::PunctuatorComma => continue,
                TokenKind::PunctuatorCloseBrace => return Ok(n),
                _ => {
                    return Err(self
                        .s
                        .syntax_error(format!("expected `,` or `}}`, but got: {}", t.source())));
                }
            }
        }
    }

    fn parse_empty_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.expect_semicolon()?;
        Ok(Statement::Empty {
            span: self.span_from(&start),
        })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordIf, "expected `if` statement")?;
        self.s
            .scan_expect(TokenKind::PunctuatorOpenParen, "expected `(` after `if`")?;
        let test = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
        self.s
            .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)`")?;
        let consequent = Box::new(self.parse_statement_required()?);
        let alternate = if self.s.peek_at(0)?.kind == TokenKind::KeywordElse {
            self.s.scan()?;
            Some(Box::new(self.parse_statement_required()?))
        } else {
            None
        };
        Ok(Statement::If {
            test,
            consequent,
            alternate,
            span: self.span_from(&start),
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordDo, "expected `do` statement")?;
        let body = Box::new(self.parse_statement_required()?);
        self.s
            .scan_expect(TokenKind::KeywordWhile, "expected `while` in do/while statement")?;
        self.s.scan_expect(
            TokenKind::PunctuatorOpenParen,
            "expected `(` in `while` of do/while statement",
        )?;
        let test = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
        self.s.scan_expect(
            TokenKind::PunctuatorCloseParen,
            "expected `)` in `while` of do/while statement",
        )?;
        self.expect_semicolon()?;
        Ok(Statement::DoWhile {
            body,
            test,
            span: self.span_from(&start),
        })
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordWhile, "expected `while` statement")?;
        self.s
            .scan_expect(TokenKind::PunctuatorOpenParen, "expected `(` after `while`")?;
        let test = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
        self.s
            .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)`")?;
        let body = Box::new(self.parse_statement_required()?);
        Ok(Statement::While {
            test,
            body,
            span: self.span_from(&start),
        })
    }

    fn parse_for_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordFor, "expected `for` statement")?;
        self.s
            .scan_expect(TokenKind::PunctuatorOpenParen, "expected `(`")?;

        let mut init = None;
        if self.s.peek_at(0)?.kind == TokenKind::PunctuatorSemicolon {
            self.expect_semicolon()?;
        } else {
            let head = if self.s.peek_at(0)?.kind == TokenKind::KeywordVar {
                ForHead::Variable(self.parse_variable_statement_no_semicolon()?)
            } else {
                ForHead::Expression(
                    self.parse_expression(ExprOrder::Comma, ExprFlags::disallow_in())?,
                )
            };

            match self.s.peek_at(0)?.kind {
                TokenKind::KeywordIn => {
                    self.s.scan()?;
                    let right = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
                    self.s
                        .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)`")?;
                    let body = Box::new(self.parse_statement_required()?);
                    return Ok(Statement::ForIn {
                        left: head,
                        right,
                        body,
                        span: self.span_from(&start),
                    });
                }
                TokenKind::KeywordOf => {
                    self.s.scan()?;
                    let right = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
                    self.s
                        .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)`")?;
                    let body = Box::new(self.parse_statement_required()?);
                    return Ok(Statement::ForOf {
                        left: head,
                        right,
                        body,
                        span: self.span_from(&start),
                    });
                }
                _ => {}
            }

            init = Some(head);
            self.expect_semicolon()?;
        }

        let test = if self.s.peek_at(0)?.kind != TokenKind::PunctuatorSemicolon {
            Some(self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?)
        } else {
            None
        };
        self.expect_semicolon()?;

        let update = if self.s.peek_at(0)?.kind != TokenKind::PunctuatorCloseParen {
            Some(self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?)
        } else {
            None
        };
        self.s
            .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)`")?;

        let body = Box::new(self.parse_statement_required()?);
        Ok(Statement::For {
            init,
            test,
            update,
            body,
            span: self.span_from(&start),
        })
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordSwitch, "expected `switch` statement")?;
        self.s
            .scan_expect(TokenKind::PunctuatorOpenParen, "expected `(`")?;
        let discriminant = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
        self.s
            .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)`")?;

        self.s
            .scan_expect(TokenKind::PunctuatorOpenBrace, "expected `{`")?;
        let mut cases = Vec::new();
        loop {
            match self.s.peek_at(0)?.kind {
                TokenKind::KeywordCase => {
                    self.s.scan()?;
                    let test = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
                    self.s
                        .scan_expect(TokenKind::PunctuatorColon, "expected `:`")?;
                    cases.push(SwitchCase {
                        test: Some(test),
                        consequent: self.parse_case_statements()?,
                    });
                }
                TokenKind::KeywordDefault => {
                    self.s.scan()?;
                    self.s
                        .scan_expect(TokenKind::PunctuatorColon, "expected `:`")?;
                    cases.push(SwitchCase {
                        test: None,
                        consequent: self.parse_case_statements()?,
                    });
                }
                TokenKind::PunctuatorCloseBrace => {
                    self.s.scan()?;
                    break;
                }
                _ => {
                    return Err(self
                        .s
                        .syntax_error("expected `case`, `default`, or `}` in switch body"));
                }
            }
        }

        Ok(Statement::Switch {
            discriminant,
            cases,
            span: self.span_from(&start),
        })
    }

    fn parse_case_statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut consequent = Vec::new();
        loop {
            match self.s.peek_at(0)?.kind {
                TokenKind::KeywordCase | TokenKind::KeywordDefault
                | TokenKind::PunctuatorCloseBrace => return Ok(consequent),
                _ => consequent.push(self.parse_statement_item()?),
            }
        }
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordContinue, "expected continue statement")?;
        let t = self.ctx.keyword_to_identifier(self.s.peek_at(0)?, false);
        let label = if t.newline || t.kind != TokenKind::Identifier {
            None
        } else {
            Some(self.scan_ident("expected identifier")?)
        };
        self.expect_semicolon()?;
        Ok(Statement::Continue {
            label,
            span: self.span_from(&start),
        })
    }

    fn parse_break_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordBreak, "expected break statement")?;
        let t = self.ctx.keyword_to_identifier(self.s.peek_at(0)?, false);
        let label = if t.newline || t.kind != TokenKind::Identifier {
            None
        } else {
            Some(self.scan_ident("expected identifier")?)
        };
        self.expect_semicolon()?;
        Ok(Statement::Break {
            label,
            span: self.span_from(&start),
        })
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordReturn, "expected return statement")?;
        let t = self.s.peek_at(0)?;
        if t.newline
            || t.kind == TokenKind::PunctuatorSemicolon
            || t.kind == TokenKind::PunctuatorCloseBrace
            || t.kind == TokenKind::None
        {
            self.expect_semicolon()?;
            return Ok(Statement::Return {
                argument: None,
                span: self.span_from(&start),
            });
        }

        let argument = Some(self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?);
        self.expect_semicolon()?;
        Ok(Statement::Return {
            argument,
            span: self.span_from(&start),
        })
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordThrow, "expected throw statement")?;
        if self.s.peek_at(0)?.newline {
            return Err(self.s.syntax_error("illegal newline after throw"));
        }

        let argument = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
        self.expect_semicolon()?;
        Ok(Statement::Throw {
            argument,
            span: self.span_from(&start),
        })
    }

    fn parse_try_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordTry, "expected try statement")?;
        let block = self.parse_block()?;

        let mut handler = None;
        if self.s.peek_at(0)?.kind == TokenKind::KeywordCatch {
            let hstart = self.s.location();
            self.s.scan()?;
            let mut param = None;
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorOpenParen {
                self.s.scan()?;
                param = Some(self.parse_catch_parameter()?);
                self.s
                    .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)`")?;
            }
            let body = self.parse_block()?;
            handler = Some(CatchClause {
                param,
                body,
                span: self.span_from(&hstart),
            });
        }

        let mut finalizer = None;
        if self.s.peek_at(0)?.kind == TokenKind::KeywordFinally {
            self.s.scan()?;
            finalizer = Some(self.parse_block()?);
        }

        if handler.is_none() && finalizer.is_none() {
            return Err(self.s.syntax_error("missing catch or finally after try"));
        }

        Ok(Statement::Try {
            block,
            handler,
            finalizer,
            span: self.span_from(&start),
        })
    }

    fn parse_catch_parameter(&mut self) -> Result<BindingPattern, ParseError> {
        let t = self.ctx.keyword_to_identifier(self.s.scan()?, false);
        match t.kind {
            TokenKind::Identifier => Ok(BindingPattern::Identifier(t.literal)),
            TokenKind::PunctuatorOpenBracket => {
                Ok(BindingPattern::Array(self.parse_array_binding_pattern_tail()?))
            }
            TokenKind::PunctuatorOpenBrace => {
                Ok(BindingPattern::Object(self.parse_object_binding_pattern_tail()?))
            }
            _ => Err(self.s.syntax_error(format!(
                "unexpected token in catch parameter: {}",
                t.source()
            ))),
        }
    }

    fn parse_labeled_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.s.location();
        let label = self.scan_ident("expected statement label")?;
        self.s.scan_expect(
            TokenKind::PunctuatorColon,
            "expected `:` after statement label",
        )?;
        let body = Box::new(self.parse_statement_required()?);
        Ok(Statement::Labeled {
            label,
            body,
            span: self.span_from(&start),
        })
    }

    // ---- declarations ----

    fn parse_declaration(&mut self) -> Result<Option<Statement>, ParseError> {
        match self.s.peek_at(0)?.kind {
            TokenKind::KeywordFunction => {
                let start = self.s.location();
                Ok(Some(Statement::Function(
                    self.parse_function_declaration(start, false)?,
                )))
            }
            TokenKind::KeywordAsync => {
                let next = self.s.peek_at(1)?;
                if next.kind == TokenKind::KeywordFunction && !next.newline {
                    let start = self.s.location();
                    self.s.scan()?;
                    return Ok(Some(Statement::Function(
                        self.parse_function_declaration(start, true)?,
                    )));
                }
                Ok(None)
            }
            TokenKind::KeywordLet | TokenKind::KeywordConst => {
                Ok(Some(Statement::Variable(self.parse_lexical_declaration()?)))
            }
            TokenKind::KeywordClass => Ok(Some(Statement::Class(self.parse_class_declaration()?))),
            _ => Ok(None),
        }
    }

    fn parse_function_declaration(
        &mut self,
        start: Location,
        is_async: bool,
    ) -> Result<FunctionDeclaration, ParseError> {
        self.s
            .scan_expect(TokenKind::KeywordFunction, "expected function")?;

        let is_generator = if self.s.peek_at(0)?.kind == TokenKind::PunctuatorMult {
            self.s.scan()?;
            true
        } else {
            false
        };

        let id = self.scan_ident("expected identifier")?;
        self.check_restricted_name(&id)?;

        self.s.scan_expect(
            TokenKind::PunctuatorOpenParen,
            "expected parameter list following function declaration",
        )?;
        let params = self.parse_parameters_tail()?;

        let ctx = self.ctx;
        self.ctx.in_async = is_async;
        self.ctx.in_generator = is_generator;
        let body = self.parse_block()?;
        self.ctx = ctx;

        Ok(FunctionDeclaration {
            id,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(&start),
        })
    }

    fn parse_lexical_declaration(&mut self) -> Result<VariableDeclaration, ParseError> {
        let start = self.s.location();
        let kind = match self.s.scan()?.kind {
            TokenKind::KeywordLet => VariableKind::Let,
            TokenKind::KeywordConst => VariableKind::Const,
            _ => return Err(self.s.syntax_error("expected lexical declaration")),
        };
        let declarations = self.parse_variable_declarations()?;
        self.expect_semicolon()?;
        Ok(VariableDeclaration {
            kind,
            declarations,
            span: self.span_from(&start),
        })
    }

    fn parse_class_declaration(&mut self) -> Result<ClassDeclaration, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordClass, "expected class")?;
        let id = self.scan_ident("expected class name")?;

        let super_class = if self.s.peek_at(0)?.kind == TokenKind::KeywordExtends {
            self.s.scan()?;
            Some(self.parse_expression(ExprOrder::Member, ExprFlags::empty())?)
        } else {
            None
        };

        let body = self.parse_class_body()?;
        Ok(ClassDeclaration {
            id,
            super_class,
            body,
            span: self.span_from(&start),
        })
    }

    fn parse_class_expression_tail(
        &mut self,
        start: Location,
    ) -> Result<ClassExpression, ParseError> {
        let t = self.ctx.keyword_to_identifier(self.s.peek_at(0)?, false);
        let id = if t.kind == TokenKind::Identifier {
            Some(self.scan_ident("expected class name")?)
        } else {
            None
        };

        let super_class = if self.s.peek_at(0)?.kind == TokenKind::KeywordExtends {
            self.s.scan()?;
            Some(self.parse_expression(ExprOrder::Member, ExprFlags::empty())?)
        } else {
            None
        };

        let body = self.parse_class_body()?;
        Ok(ClassExpression {
            id,
            super_class,
            body,
            span: self.span_from(&start),
        })
    }

    fn parse_class_body(&mut self) -> Result<Vec<MethodDefinition>, ParseError> {
        self.s
            .scan_expect(TokenKind::PunctuatorOpenBrace, "expected `{`")?;

        let mut n = Vec::new();

        loop {
            let mut peek = self.s.peek_at(0)?;
            if peek.kind == TokenKind::PunctuatorCloseBrace {
                self.s.scan()?;
                break;
            }

            let mut is_static = false;
            if peek.kind == TokenKind::KeywordStatic {
                self.s.scan()?;
                peek = self.s.peek_at(0)?;
                is_static = true;
            }

            // Get/set specifier, unless it is itself the method name.
            let mut kind = MethodKind::Method;
            match peek.kind {
                TokenKind::KeywordGet
                    if self.s.peek_at(1)?.kind != TokenKind::PunctuatorOpenParen =>
                {
                    self.s.scan()?;
                    kind = MethodKind::Get;
                }
                TokenKind::KeywordSet
                    if self.s.peek_at(1)?.kind != TokenKind::PunctuatorOpenParen =>
                {
                    self.s.scan()?;
                    kind = MethodKind::Set;
                }
                _ => {}
            }

            // Method key, possibly computed.
            let key_start = self.s.location();
            let mut computed = false;
            let t = self.ctx.keyword_to_identifier(self.s.scan()?, true);
            let key = match t.kind {
                TokenKind::Identifier => Expression::Identifier {
                    name: t.literal,
                    span: self.span_from(&key_start),
                },
                TokenKind::LiteralString => Expression::String {
                    value: t.string_value(),
                    raw: t.literal,
                    span: self.span_from(&key_start),
                },
                TokenKind::LiteralNumber => Expression::Number {
                    value: t.number_value(),
                    raw: t.literal,
                    span: self.span_from(&key_start),
                },
                TokenKind::PunctuatorOpenBracket => {
                    computed = true;
                    let k = self.parse_expression(ExprOrder::Comma, ExprFlags::empty())?;
                    self.s
                        .scan_expect(TokenKind::PunctuatorCloseBracket, "expected `]`")?;
                    k
                }
                _ => return Err(self.s.syntax_error("expected method definition")),
            };

            let fn_start = self.s.location();
            let params = self.parse_parameters()?;
            self.check_accessor_arity(kind, &params)?;

            let ctx = self.ctx;
            self.ctx.in_async = false;
            self.ctx.in_generator = false;
            let body = self.parse_block()?;
            self.ctx = ctx;

            let value = FunctionExpression {
                id: None,
                params,
                body: FunctionBody::Block(body),
                is_async: false,
                is_generator: false,
                arrow: false,
                span: self.span_from(&fn_start),
            };

            n.push(MethodDefinition {
                key,
                computed,
                kind,
                is_static,
                value,
            });
        }

        Ok(n)
    }

    fn check_accessor_arity(
        &self,
        kind: MethodKind,
        params: &FormalParameters,
    ) -> Result<(), ParseError> {
        match kind {
            MethodKind::Get if !params.parameters.is_empty() || params.rest.is_some() => {
                Err(self.s.syntax_error("getter must have no parameters"))
            }
            MethodKind::Set if params.parameters.len() != 1 || params.rest.is_some() => {
                Err(self.s.syntax_error("setter must have exactly one parameter"))
            }
            _ => Ok(()),
        }
    }

    fn check_property_accessor_arity(
        &self,
        kind: PropertyKind,
        params: &FormalParameters,
    ) -> Result<(), ParseError> {
        match kind {
            PropertyKind::Get if !params.parameters.is_empty() || params.rest.is_some() => {
                Err(self.s.syntax_error("getter must have no parameters"))
            }
            PropertyKind::Set if params.parameters.len() != 1 || params.rest.is_some() => {
                Err(self.s.syntax_error("setter must have exactly one parameter"))
            }
            _ => Ok(()),
        }
    }

    // ---- imports ----

    fn parse_import_decl(&mut self) -> Result<ImportDeclaration, ParseError> {
        let start = self.s.location();
        self.s
            .scan_expect(TokenKind::KeywordImport, "expected `import` declaration")?;

        let mut n = ImportDeclaration {
            default_binding: None,
            namespace: None,
            named: None,
            module: String::new(),
            module_raw: String::new(),
            span: start.span(),
        };

        // Specifier names are force-demoted so non-reserved keywords can be
        // bound, e.g. `import as, * as as from "mod";`.
        let mut t = self.ctx.keyword_to_identifier(self.s.scan()?, true);
        match t.kind {
            TokenKind::LiteralString => {
                n.module = t.string_value();
                n.module_raw = t.literal;
                self.expect_semicolon()?;
                n.span = self.span_from(&start);
                return Ok(n);
            }
            TokenKind::Identifier => {
                n.default_binding = Some(t.literal.clone());

                t = self.s.scan()?;
                match t.kind {
                    TokenKind::PunctuatorComma => {
                        t = self.s.scan()?;
                    }
                    TokenKind::KeywordFrom => {
                        let m = self.s.scan_expect(
                            TokenKind::LiteralString,
                            "expected module specifier after `from`",
                        )?;
                        n.module = m.string_value();
                        n.module_raw = m.literal;
                        self.expect_semicolon()?;
                        n.span = self.span_from(&start);
                        return Ok(n);
                    }
                    _ => {
                        return Err(self.s.syntax_error(format!(
                            "expected `,` or `from` after default import in import declaration, got `{}`",
                            t.source()
                        )));
                    }
                }
            }
            _ => {}
        }

        match t.kind {
            TokenKind::PunctuatorMult => {
                self.s.scan_expect(
                    TokenKind::KeywordAs,
                    "expected `as` after namespace binding operator `*`",
                )?;
                n.namespace =
                    Some(self.force_scan_ident("expected namespace binding after `* as`")?);
            }
            TokenKind::PunctuatorOpenBrace => {
                let mut named = Vec::new();

                'import_list: loop {
                    t = self.s.scan()?;
                    if t.kind == TokenKind::PunctuatorCloseBrace {
                        break 'import_list;
                    }
                    let name = self.force_ident(t, "expected import specifier in import list")?;
                    let mut item = NamedImport {
                        name,
                        binding: None,
                    };
                    t = self.s.scan()?;
                    match t.kind {
                        TokenKind::PunctuatorCloseBrace => {
                            named.push(item);
                            break 'import_list;
                        }
                        TokenKind::PunctuatorComma => named.push(item),
                        TokenKind::KeywordAs => {
                            item.binding = Some(
                                self.force_scan_ident(
                                    "expected import binding after `as` in import list",
                                )?,
                            );
                            t = self.s.scan()?;
                            match t.kind {
                                TokenKind::PunctuatorCloseBrace => {
                                    named.push(item);
                                    break 'import_list;
                                }
                                TokenKind::PunctuatorComma => named.push(item),
                                _ => {
                                    return Err(self.s.syntax_error(format!(
                                        "expected `,` or `}}` in import list, got `{}`",
                                        t.source()
                                    )));
                                }
                            }
                        }
                        _ => {
                            return Err(self.s.syntax_error(format!(
                                "expected `,`, `as`, or `}}` in import list, got `{}`",
                                t.source()
                            )));
                        }
                    }
                }

                n.named = Some(named);
            }
            _ => {
                return Err(self
                    .s
                    .syntax_error("expected namespace or named imports in import statement"));
            }
        }

        self.s.scan_expect(
            TokenKind::KeywordFrom,
            "expected `from` clause in import declaration",
        )?;
        let m = self.s.scan_expect(
            TokenKind::LiteralString,
            "expected module specifier after `from`",
        )?;
        n.module = m.string_value();
        n.module_raw = m.literal;

        self.expect_semicolon()?;
        n.span = self.span_from(&start);
        Ok(n)
    }

    // ---- parameters and arguments ----

    fn parse_parameters(&mut self) -> Result<FormalParameters, ParseError> {
        self.s
            .scan_expect(TokenKind::PunctuatorOpenParen, "expected `(`")?;
        self.parse_parameters_tail()
    }

    fn parse_parameters_tail(&mut self) -> Result<FormalParameters, ParseError> {
        let mut n = FormalParameters::default();

        loop {
            let t = self.ctx.keyword_to_identifier(self.s.scan()?, false);
            let pattern = match t.kind {
                TokenKind::Identifier => BindingPattern::Identifier(t.literal),
                TokenKind::PunctuatorCloseParen => return Ok(n),
                TokenKind::PunctuatorOpenBracket => {
                    BindingPattern::Array(self.parse_array_binding_pattern_tail()?)
                }
                TokenKind::PunctuatorOpenBrace => {
                    BindingPattern::Object(self.parse_object_binding_pattern_tail()?)
                }
                TokenKind::PunctuatorEllipsis => {
                    n.rest = Some(self.scan_ident("expected identifier for rest parameter")?);
                    self.s
                        .scan_expect(TokenKind::PunctuatorCloseParen, "expected closing paren")?;
                    return Ok(n);
                }
                _ => {
                    return Err(self.s.syntax_error(format!(
                        "unexpected token in formal parameter list: {}",
                        t.source()
                    )));
                }
            };

            let mut b = BindingElement {
                pattern,
                default: None,
            };

            // Default syntax.
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorAssign {
                self.s.scan()?;
                b.default = Some(self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?);
            }

            n.parameters.push(b);

            let t = self.s.scan()?;
            match t.kind {
                TokenKind::PunctuatorComma => continue,
                TokenKind::PunctuatorCloseParen => return Ok(n),
                _ => {
                    return Err(self
                        .s
                        .syntax_error(format!("expected `,` or `)`, but got: {}", t.source())));
                }
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut n = Vec::new();

        self.s
            .scan_expect(TokenKind::PunctuatorOpenParen, "expected `(`")?;
        if self.s.peek_at(0)?.kind == TokenKind::PunctuatorCloseParen {
            self.s.scan()?;
            return Ok(n);
        }
        loop {
            let spread_start = if self.s.peek_at(0)?.kind == TokenKind::PunctuatorEllipsis {
                let start = self.s.location();
                self.s.scan()?;
                Some(start)
            } else {
                None
            };
            let mut m = self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?;
            if let Some(start) = spread_start {
                m = Expression::Spread {
                    argument: Box::new(m),
                    span: self.span_from(&start),
                };
            }
            n.push(m);
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorComma {
                self.s.scan()?;
            }
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorCloseParen {
                self.s.scan()?;
                return Ok(n);
            }
        }
    }

    // ---- expressions ----

    fn check_order(&self, order: ExprOrder, max: ExprOrder, t: &Token) -> Result<(), ParseError> {
        if order > max {
            return Err(self.s.syntax_error(format!(
                "unexpected token `{}`, expected primary expression",
                t.source()
            )));
        }
        Ok(())
    }

    fn wrap_binary(
        &mut self,
        operator: BinaryOperator,
        left: Expression,
        next: ExprOrder,
        flags: ExprFlags,
        start: &Location,
    ) -> Result<Expression, ParseError> {
        let right = self.parse_expression(next, flags)?;
        Ok(Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span: self.span_from(start),
        })
    }

    fn wrap_assign(
        &mut self,
        operator: AssignmentOperator,
        left: Expression,
        flags: ExprFlags,
        start: &Location,
    ) -> Result<Expression, ParseError> {
        if let Expression::Identifier { name, .. } = &left {
            self.check_restricted_name(name)?;
        }
        let right = self.parse_expression(ExprOrder::Assign, flags)?;
        Ok(Expression::Assignment {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span: self.span_from(start),
        })
    }

    fn parse_unary(
        &mut self,
        operator: UnaryOperator,
        flags: ExprFlags,
        start: &Location,
    ) -> Result<Expression, ParseError> {
        let argument = self.parse_expression(ExprOrder::Unary, flags)?;
        Ok(Expression::Unary {
            operator,
            argument: Box::new(argument),
            span: self.span_from(start),
        })
    }

    fn parse_arrow_body(&mut self) -> Result<FunctionBody, ParseError> {
        if self.s.peek_at(0)?.kind == TokenKind::PunctuatorOpenBrace {
            Ok(FunctionBody::Block(self.parse_block()?))
        } else {
            Ok(FunctionBody::Expression(Box::new(
                self.parse_expression(ExprOrder::Conditional, ExprFlags::empty())?,
            )))
        }
    }

    fn parse_arrow_tail(
        &mut self,
        start: Location,
        params: FormalParameters,
        is_async: bool,
    ) -> Result<Expression, ParseError> {
        let ctx = self.ctx;
        self.ctx.in_async = is_async;
        self.ctx.in_generator = false;
        let body = self.parse_arrow_body()?;
        self.ctx = ctx;

        Ok(Expression::Function(Box::new(FunctionExpression {
            id: None,
            params,
            body,
            is_async,
            is_generator: false,
            arrow: true,
            span: self.span_from(&start),
        })))
    }

    /// Parse an expression at or above the given precedence level.
    ///
    /// With `ExprOrder::Primary` only primary expressions are accepted; at
    /// lower orders the climbing loop keeps consuming operators until it
    /// reaches one below the requested level or a token that cannot continue
    /// an expression.
    fn parse_expression(
        &mut self,
        order: ExprOrder,
        flags: ExprFlags,
    ) -> Result<Expression, ParseError> {
        if flags.maybe_arrow {
            match self.s.peek_at(0)?.kind {
                TokenKind::PunctuatorCloseParen => {
                    // This is a parameter list, not an expression.
                    return Ok(Expression::EmptyArrowHead {
                        span: self.s.location().span(),
                    });
                }
                TokenKind::PunctuatorEllipsis => {
                    // Rest parameter inside of a possible arrow head.
                    let start = self.s.location();
                    self.s.scan()?;
                    let name = self.force_scan_ident("unexpected token")?;
                    return Ok(Expression::FloatingRest {
                        name,
                        span: self.span_from(&start),
                    });
                }
                _ => {}
            }
        }

        let start = self.s.location();
        let mut t = self.ctx.keyword_to_identifier(self.s.scan()?, false);

        // Can't be `/` or `/=` when a primary is expected; relex as a regex.
        // Only legal while the lookahead buffer is empty.
        let mut regex = None;
        if t.kind == TokenKind::PunctuatorDiv || t.kind == TokenKind::PunctuatorDivAssign {
            let re = self.s.rescan()?;
            t = re.token.clone();
            regex = Some(re);
        }

        let mut n = if let Some(re) = regex {
            Expression::RegExp {
                pattern: re.pattern,
                flags: re.flags,
                raw: re.token.literal,
                span: self.span_from(&start),
            }
        } else {
            match t.kind {
                // Unary operators
                TokenKind::PunctuatorIncrement => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    let argument = self.parse_expression(ExprOrder::Lhs, flags)?;
                    Expression::Update {
                        operator: UpdateOperator::PreIncrement,
                        argument: Box::new(argument),
                        span: self.span_from(&start),
                    }
                }
                TokenKind::PunctuatorDecrement => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    let argument = self.parse_expression(ExprOrder::Lhs, flags)?;
                    Expression::Update {
                        operator: UpdateOperator::PreDecrement,
                        argument: Box::new(argument),
                        span: self.span_from(&start),
                    }
                }
                TokenKind::KeywordDelete => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    self.parse_unary(UnaryOperator::Delete, flags, &start)?
                }
                TokenKind::KeywordVoid => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    self.parse_unary(UnaryOperator::Void, flags, &start)?
                }
                TokenKind::KeywordTypeOf => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    self.parse_unary(UnaryOperator::TypeOf, flags, &start)?
                }
                TokenKind::PunctuatorPlus => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    self.parse_unary(UnaryOperator::Plus, flags, &start)?
                }
                TokenKind::PunctuatorMinus => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    self.parse_unary(UnaryOperator::Minus, flags, &start)?
                }
                TokenKind::PunctuatorBitNot => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    self.parse_unary(UnaryOperator::BitNot, flags, &start)?
                }
                TokenKind::PunctuatorNot => {
                    self.check_order(order, ExprOrder::Unary, &t)?;
                    self.parse_unary(UnaryOperator::Not, flags, &start)?
                }

                // Primary expressions
                TokenKind::KeywordThis => Expression::This {
                    span: self.span_from(&start),
                },
                TokenKind::Identifier => {
                    if t.literal == "async" {
                        self.parse_async_primary(&start, t.literal.clone())?
                    } else {
                        Expression::Identifier {
                            name: t.literal,
                            span: self.span_from(&start),
                        }
                    }
                }
                TokenKind::KeywordNull => Expression::Null {
                    span: self.span_from(&start),
                },
                TokenKind::KeywordTrue => Expression::Boolean {
                    value: true,
                    raw: t.literal,
                    span: self.span_from(&start),
                },
                TokenKind::KeywordFalse => Expression::Boolean {
                    value: false,
                    raw: t.literal,
                    span: self.span_from(&start),
                },
                TokenKind::LiteralNumber => Expression::Number {
                    value: t.number_value(),
                    raw: t.literal,
                    span: self.span_from(&start),
                },
                TokenKind::LiteralString => Expression::String {
                    value: t.string_value(),
                    raw: t.literal,
                    span: self.span_from(&start),
                },
                TokenKind::PunctuatorOpenBracket => {
                    let array_flags = ExprFlags {
                        maybe_arrow: flags.maybe_arrow,
                        disallow_in: false,
                    };
                    self.parse_array_tail(start.clone(), array_flags)?
                }
                TokenKind::PunctuatorOpenBrace => {
                    let object_flags = ExprFlags {
                        maybe_arrow: flags.maybe_arrow,
                        disallow_in: false,
                    };
                    self.parse_object_tail(start.clone(), object_flags)?
                }
                TokenKind::KeywordFunction => Expression::Function(Box::new(
                    self.parse_function_expression_tail(start.clone(), false)?,
                )),
                TokenKind::KeywordNew => {
                    let callee = self.parse_expression(ExprOrder::Member, flags)?;
                    let arguments = if self.s.peek_at(0)?.kind == TokenKind::PunctuatorOpenParen {
                        self.parse_arguments()?
                    } else {
                        Vec::new()
                    };
                    Expression::New {
                        callee: Box::new(callee),
                        arguments,
                        span: self.span_from(&start),
                    }
                }
                TokenKind::KeywordClass => {
                    Expression::Class(Box::new(self.parse_class_expression_tail(start.clone())?))
                }
                TokenKind::LiteralTemplate => {
                    return Err(self.s.syntax_error("template literals are not supported"));
                }
                TokenKind::PunctuatorOpenParen => {
                    // Tricky: this could be a parenthesised expression, or
                    // the parameter list of an arrow function. To avoid
                    // look-ahead, parse as an expression where possible,
                    // allowing some invalid productions, and fix it up here.
                    let inner = self.parse_expression(ExprOrder::Comma, ExprFlags::maybe_arrow())?;
                    self.s
                        .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)` operator")?;
                    if self.s.peek_at(0)?.kind == TokenKind::PunctuatorFatArrow {
                        // This was an arrow function after all. Fix up the
                        // parenthesised expression to be a parameter list.
                        self.s.scan()?;
                        let params = self.convert_expr_to_arrow_params(inner)?;
                        self.parse_arrow_tail(start.clone(), params, false)?
                    } else {
                        // Was not an arrow. Deal with disallowed syntax
                        // retroactively.
                        if inner.contains_temporal_nodes() {
                            return Err(self.s.syntax_error("expected `=>` operator"));
                        }
                        Expression::Parenthesized {
                            expression: Box::new(inner),
                            span: self.span_from(&start),
                        }
                    }
                }
                _ => {
                    return Err(self.s.syntax_error(format!(
                        "unexpected token `{}`, expected primary expression",
                        t.source()
                    )));
                }
            }
        };

        // Handle single-parameter bare arrow head.
        if let Expression::Identifier { name, .. } = &n {
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorFatArrow {
                let name = name.clone();
                self.s.scan()?;
                let params = FormalParameters {
                    parameters: vec![BindingElement {
                        pattern: BindingPattern::Identifier(name),
                        default: None,
                    }],
                    rest: None,
                };
                return self.parse_arrow_tail(start, params, false);
            }
        }

        if order >= ExprOrder::Primary {
            return Ok(n);
        }

        loop {
            let t = self.s.peek_at(0)?;

            // Member access
            if t.kind == TokenKind::PunctuatorDot {
                self.s.scan()?;
                let pstart = self.s.location();
                let name = self.force_scan_ident("expected property name after `.` operator")?;
                n = Expression::Member {
                    object: Box::new(n),
                    property: Box::new(Expression::Identifier {
                        name,
                        span: self.span_from(&pstart),
                    }),
                    computed: false,
                    optional: false,
                    span: self.span_from(&start),
                };
                continue;
            } else if t.kind == TokenKind::PunctuatorOpenBracket {
                self.s.scan()?;
                let property = self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?;
                self.s
                    .scan_expect(TokenKind::PunctuatorCloseBracket, "expected `]` operator")?;
                n = Expression::Member {
                    object: Box::new(n),
                    property: Box::new(property),
                    computed: true,
                    optional: false,
                    span: self.span_from(&start),
                };
                continue;
            }
            if order >= ExprOrder::Member {
                break;
            }

            if t.kind == TokenKind::PunctuatorOpenParen {
                n = Expression::Call {
                    callee: Box::new(n),
                    arguments: self.parse_arguments()?,
                    optional: false,
                    span: self.span_from(&start),
                };
                continue;
            }
            if order >= ExprOrder::Call {
                break;
            }

            if t.kind == TokenKind::PunctuatorOptionalChain {
                self.s.scan()?;
                match self.s.peek_at(0)?.kind {
                    TokenKind::PunctuatorOpenBracket => {
                        self.s.scan()?;
                        let property =
                            self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?;
                        self.s.scan_expect(
                            TokenKind::PunctuatorCloseBracket,
                            "expected `]` operator",
                        )?;
                        n = Expression::Member {
                            object: Box::new(n),
                            property: Box::new(property),
                            computed: true,
                            optional: true,
                            span: self.span_from(&start),
                        };
                    }
                    TokenKind::PunctuatorOpenParen => {
                        n = Expression::Call {
                            callee: Box::new(n),
                            arguments: self.parse_arguments()?,
                            optional: true,
                            span: self.span_from(&start),
                        };
                    }
                    _ => {
                        let pstart = self.s.location();
                        let name =
                            self.force_scan_ident("expected property name after `?.` operator")?;
                        n = Expression::Member {
                            object: Box::new(n),
                            property: Box::new(Expression::Identifier {
                                name,
                                span: self.span_from(&pstart),
                            }),
                            computed: false,
                            optional: true,
                            span: self.span_from(&start),
                        };
                    }
                }
                continue;
            }
            if order >= ExprOrder::Lhs {
                break;
            }

            // Postfix update; suppressed when the operator follows a line
            // terminator.
            if t.kind == TokenKind::PunctuatorIncrement && !t.newline {
                self.s.scan()?;
                n = Expression::Update {
                    operator: UpdateOperator::PostIncrement,
                    argument: Box::new(n),
                    span: self.span_from(&start),
                };
                continue;
            } else if t.kind == TokenKind::PunctuatorDecrement && !t.newline {
                self.s.scan()?;
                n = Expression::Update {
                    operator: UpdateOperator::PostDecrement,
                    argument: Box::new(n),
                    span: self.span_from(&start),
                };
                continue;
            }
            if order >= ExprOrder::Unary {
                break;
            }

            if t.kind == TokenKind::PunctuatorExponent {
                // Right-associative: the right operand parses at exponent
                // level so `2 ** 3 ** 4` nests to the right.
                self.s.scan()?;
                n = self.wrap_binary(
                    BinaryOperator::Exponent,
                    n,
                    ExprOrder::Exponent,
                    flags,
                    &start,
                )?;
                continue;
            }
            if order >= ExprOrder::Exponent {
                break;
            }

            match t.kind {
                TokenKind::PunctuatorMult => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::Mult,
                        n,
                        ExprOrder::Exponent,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorDiv => {
                    self.s.scan()?;
                    n = self.wrap_binary(BinaryOperator::Div, n, ExprOrder::Exponent, flags, &start)?;
                    continue;
                }
                TokenKind::PunctuatorMod => {
                    self.s.scan()?;
                    n = self.wrap_binary(BinaryOperator::Mod, n, ExprOrder::Exponent, flags, &start)?;
                    continue;
                }
                _ => {}
            }
            if order >= ExprOrder::Multiplicative {
                break;
            }

            match t.kind {
                TokenKind::PunctuatorPlus => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::Add,
                        n,
                        ExprOrder::Multiplicative,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorMinus => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::Sub,
                        n,
                        ExprOrder::Multiplicative,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                _ => {}
            }
            if order >= ExprOrder::Additive {
                break;
            }

            match t.kind {
                TokenKind::PunctuatorLShift => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::LShift,
                        n,
                        ExprOrder::Additive,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorRShift => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::RShift,
                        n,
                        ExprOrder::Additive,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorUnsignedRShift => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::UnsignedRShift,
                        n,
                        ExprOrder::Additive,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                _ => {}
            }
            if order >= ExprOrder::Shift {
                break;
            }

            match t.kind {
                TokenKind::PunctuatorLessThan => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::LessThan,
                        n,
                        ExprOrder::Shift,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorGreaterThan => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::GreaterThan,
                        n,
                        ExprOrder::Shift,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorLessThanEqual => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::LessThanEqual,
                        n,
                        ExprOrder::Shift,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorGreaterThanEqual => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::GreaterThanEqual,
                        n,
                        ExprOrder::Shift,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::KeywordInstanceOf => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::InstanceOf,
                        n,
                        ExprOrder::Shift,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::KeywordIn if !flags.disallow_in => {
                    self.s.scan()?;
                    n = self.wrap_binary(BinaryOperator::In, n, ExprOrder::Shift, flags, &start)?;
                    continue;
                }
                _ => {}
            }
            if order >= ExprOrder::Relational {
                break;
            }

            match t.kind {
                TokenKind::PunctuatorEqual => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::Equal,
                        n,
                        ExprOrder::Relational,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorNotEqual => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::NotEqual,
                        n,
                        ExprOrder::Relational,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorStrictEqual => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::StrictEqual,
                        n,
                        ExprOrder::Relational,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorStrictNotEqual => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::StrictNotEqual,
                        n,
                        ExprOrder::Relational,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                _ => {}
            }
            if order >= ExprOrder::Equality {
                break;
            }

            if t.kind == TokenKind::PunctuatorBitAnd {
                self.s.scan()?;
                n = self.wrap_binary(BinaryOperator::BitAnd, n, ExprOrder::Equality, flags, &start)?;
                continue;
            }
            if order >= ExprOrder::BitwiseAnd {
                break;
            }

            if t.kind == TokenKind::PunctuatorBitXor {
                self.s.scan()?;
                n = self.wrap_binary(
                    BinaryOperator::BitXor,
                    n,
                    ExprOrder::BitwiseAnd,
                    flags,
                    &start,
                )?;
                continue;
            }
            if order >= ExprOrder::BitwiseXor {
                break;
            }

            if t.kind == TokenKind::PunctuatorBitOr {
                self.s.scan()?;
                n = self.wrap_binary(
                    BinaryOperator::BitOr,
                    n,
                    ExprOrder::BitwiseXor,
                    flags,
                    &start,
                )?;
                continue;
            }
            if order >= ExprOrder::BitwiseOr {
                break;
            }

            if t.kind == TokenKind::PunctuatorLogicalAnd {
                self.s.scan()?;
                n = self.wrap_binary(
                    BinaryOperator::LogicalAnd,
                    n,
                    ExprOrder::BitwiseOr,
                    flags,
                    &start,
                )?;
                continue;
            }
            if order >= ExprOrder::LogicalAnd {
                break;
            }

            match t.kind {
                TokenKind::PunctuatorLogicalOr => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::LogicalOr,
                        n,
                        ExprOrder::LogicalAnd,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                TokenKind::PunctuatorNullCoalesce => {
                    self.s.scan()?;
                    n = self.wrap_binary(
                        BinaryOperator::Coalesce,
                        n,
                        ExprOrder::LogicalAnd,
                        flags,
                        &start,
                    )?;
                    continue;
                }
                _ => {}
            }
            if order >= ExprOrder::LogicalOr {
                break;
            }

            if t.kind == TokenKind::PunctuatorQuestionMark {
                self.s.scan()?;
                let consequent = self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?;
                self.s.scan_expect(
                    TokenKind::PunctuatorColon,
                    "expected `:` operator in conditional expression",
                )?;
                let alternate = self.parse_expression(ExprOrder::Assign, ExprFlags::empty())?;
                n = Expression::Conditional {
                    test: Box::new(n),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                    span: self.span_from(&start),
                };
                continue;
            }
            if order >= ExprOrder::Conditional {
                break;
            }

            let assign_op = match t.kind {
                TokenKind::PunctuatorAssign => Some(AssignmentOperator::Assign),
                TokenKind::PunctuatorMultAssign => Some(AssignmentOperator::MultAssign),
                TokenKind::PunctuatorDivAssign => Some(AssignmentOperator::DivAssign),
                TokenKind::PunctuatorModAssign => Some(AssignmentOperator::ModAssign),
                TokenKind::PunctuatorPlusAssign => Some(AssignmentOperator::AddAssign),
                TokenKind::PunctuatorMinusAssign => Some(AssignmentOperator::SubAssign),
                TokenKind::PunctuatorLShiftAssign => Some(AssignmentOperator::LShiftAssign),
                TokenKind::PunctuatorRShiftAssign => Some(AssignmentOperator::RShiftAssign),
                TokenKind::PunctuatorUnsignedRShiftAssign => {
                    Some(AssignmentOperator::UnsignedRShiftAssign)
                }
                TokenKind::PunctuatorBitAndAssign => Some(AssignmentOperator::BitAndAssign),
                TokenKind::PunctuatorBitXorAssign => Some(AssignmentOperator::BitXorAssign),
                TokenKind::PunctuatorBitOrAssign => Some(AssignmentOperator::BitOrAssign),
                TokenKind::PunctuatorExponentAssign => Some(AssignmentOperator::ExponentAssign),
                TokenKind::PunctuatorLogicalAndAssign => Some(AssignmentOperator::LogicalAndAssign),
                TokenKind::PunctuatorLogicalOrAssign => Some(AssignmentOperator::LogicalOrAssign),
                TokenKind::PunctuatorNullCoalesceAssign => Some(AssignmentOperator::CoalesceAssign),
                _ => None,
            };
            if let Some(op) = assign_op {
                self.s.scan()?;
                n = self.wrap_assign(op, n, flags, &start)?;
                continue;
            }
            if order >= ExprOrder::Assign {
                break;
            }

            if t.kind == TokenKind::PunctuatorComma {
                self.s.scan()?;
                let next = self.parse_expression(ExprOrder::Assign, flags)?;
                n = match n {
                    Expression::Sequence {
                        mut expressions,
                        span,
                    } => {
                        expressions.push(next);
                        Expression::Sequence {
                            expressions,
                            span: Span {
                                start: span.start,
                                end: self.s.location(),
                            },
                        }
                    }
                    other => Expression::Sequence {
                        expressions: vec![other, next],
                        span: self.span_from(&start),
                    },
                };
                continue;
            }

            // Matched nothing; end of expression.
            break;
        }

        Ok(n)
    }

    /// Continue from an `async` identifier in primary position: an async
    /// function expression, an async arrow, or a call to a function named
    /// `async`.
    fn parse_async_primary(
        &mut self,
        start: &Location,
        literal: String,
    ) -> Result<Expression, ParseError> {
        let peek = self.s.peek_at(0)?;
        let ident = self.ctx.keyword_to_identifier(peek.clone(), true);

        if peek.kind == TokenKind::KeywordFunction {
            // Async function expression.
            self.s.scan()?;
            return Ok(Expression::Function(Box::new(
                self.parse_function_expression_tail(start.clone(), true)?,
            )));
        }

        if ident.kind == TokenKind::Identifier {
            // Async arrow function with a bare parameter.
            self.s.scan()?;
            self.s
                .scan_expect(TokenKind::PunctuatorFatArrow, "expected `=>`")?;
            let params = FormalParameters {
                parameters: vec![BindingElement {
                    pattern: BindingPattern::Identifier(ident.literal),
                    default: None,
                }],
                rest: None,
            };
            return self.parse_arrow_tail(start.clone(), params, true);
        }

        if peek.kind == TokenKind::PunctuatorOpenParen {
            // Async arrow function with a parameter list, or a call to a
            // function named "async".
            self.s.scan()?;
            let inner = self.parse_expression(ExprOrder::Comma, ExprFlags::maybe_arrow())?;
            self.s
                .scan_expect(TokenKind::PunctuatorCloseParen, "expected `)` operator")?;
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorFatArrow {
                self.s.scan()?;
                let params = self.convert_expr_to_arrow_params(inner)?;
                return self.parse_arrow_tail(start.clone(), params, true);
            }
            let callee = Expression::Identifier {
                name: literal,
                span: start.span(),
            };
            let arguments = self.convert_expr_to_call_params(inner)?;
            return Ok(Expression::Call {
                callee: Box::new(callee),
                arguments,
                optional: false,
                span: self.span_from(start),
            });
        }

        // `async` as a plain identifier.
        Ok(Expression::Identifier {
            name: literal,
            span: self.span_from(start),
        })
    }

    // ---- cover grammar conversion ----

    /// Convert a covered expression into an arrow-function parameter list.
    fn convert_expr_to_arrow_params(
        &mut self,
        inner: Expression,
    ) -> Result<FormalParameters, ParseError> {
        let mut params = FormalParameters::default();
        match inner {
            Expression::EmptyArrowHead { .. } => {}
            Expression::Sequence { expressions, .. } => {
                for e in expressions {
                    self.convert_arrow_param(e, &mut params)?;
                }
            }
            other => self.convert_arrow_param(other, &mut params)?,
        }
        Ok(params)
    }

    fn convert_arrow_param(
        &mut self,
        n: Expression,
        params: &mut FormalParameters,
    ) -> Result<(), ParseError> {
        if params.rest.is_some() {
            return Err(self
                .s
                .syntax_error("rest parameter must be last in parameter list"));
        }
        match n {
            Expression::FloatingRest { name, .. } => {
                params.rest = Some(name);
                Ok(())
            }
            // A trailing comma in the head leaves an empty-head marker as
            // the final sequence element.
            Expression::EmptyArrowHead { .. } => Ok(()),
            other => {
                let element = self.convert_to_binding_element(other)?;
                params.parameters.push(element);
                Ok(())
            }
        }
    }

    fn convert_to_binding_element(
        &mut self,
        n: Expression,
    ) -> Result<BindingElement, ParseError> {
        match n {
            Expression::Assignment {
                operator: AssignmentOperator::Assign,
                left,
                right,
                ..
            } => Ok(BindingElement {
                pattern: self.convert_to_binding_pattern(*left)?,
                default: Some(*right),
            }),
            other => Ok(BindingElement {
                pattern: self.convert_to_binding_pattern(other)?,
                default: None,
            }),
        }
    }

    fn convert_to_binding_pattern(
        &mut self,
        n: Expression,
    ) -> Result<BindingPattern, ParseError> {
        match n {
            Expression::Identifier { name, .. } => Ok(BindingPattern::Identifier(name)),
            Expression::Array { elements, .. } => {
                let mut pat = ArrayBindingPattern::default();
                for e in elements {
                    match e {
                        None => pat.elements.push(None),
                        Some(Expression::ArrayRest { pattern, .. }) => {
                            pat.rest = Some(Box::new(pattern));
                            break;
                        }
                        Some(e) => pat.elements.push(Some(self.convert_to_binding_element(e)?)),
                    }
                }
                Ok(BindingPattern::Array(pat))
            }
            Expression::Object { properties, .. } => {
                let mut pat = ObjectBindingPattern::default();
                for prop in properties {
                    if let Expression::ObjectRest { name, .. } = prop.key {
                        pat.rest = Some(name);
                        break;
                    }
                    let Expression::Identifier { name, .. } = prop.key else {
                        return Err(self
                            .s
                            .syntax_error("expected identifier key in object destructuring"));
                    };
                    let mut binding = BindingProperty {
                        name,
                        value: None,
                        default: None,
                    };
                    match prop.value {
                        None => {}
                        Some(Expression::Assignment {
                            operator: AssignmentOperator::Assign,
                            left,
                            right,
                            ..
                        }) => {
                            binding.value = Some(self.convert_to_binding_pattern(*left)?);
                            binding.default = Some(*right);
                        }
                        Some(v) => binding.value = Some(self.convert_to_binding_pattern(v)?),
                    }
                    if let Some(init) = prop.destructure_init {
                        binding.default = Some(init);
                    }
                    pat.properties.push(binding);
                }
                Ok(BindingPattern::Object(pat))
            }
            _ => Err(self
                .s
                .syntax_error("unexpected production in destructuring pattern")),
        }
    }

    /// Convert a covered expression into the arguments of a call to a
    /// function named `async`.
    fn convert_expr_to_call_params(
        &mut self,
        inner: Expression,
    ) -> Result<Vec<Expression>, ParseError> {
        let args = match inner {
            Expression::EmptyArrowHead { .. } => Vec::new(),
            Expression::Sequence { expressions, .. } => expressions,
            other => vec![other],
        };
        for a in &args {
            if a.contains_temporal_nodes() {
                return Err(self.s.syntax_error("expected `=>` operator"));
            }
        }
        Ok(args)
    }

    // ---- literals with tails ----

    /// Parse an array literal assuming the `[` was already consumed.
    fn parse_array_tail(
        &mut self,
        start: Location,
        flags: ExprFlags,
    ) -> Result<Expression, ParseError> {
        let mut elements: Vec<Option<Expression>> = Vec::new();

        loop {
            while self.s.peek_at(0)?.kind == TokenKind::PunctuatorComma {
                elements.push(None);
                self.s.scan()?;
            }
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorCloseBracket {
                break;
            }
            if flags.maybe_arrow && self.s.peek_at(0)?.kind == TokenKind::PunctuatorEllipsis {
                let rstart = self.s.location();
                self.s.scan()?;
                let pattern = match self.s.peek_at(0)?.kind {
                    TokenKind::PunctuatorCloseBracket => {
                        return Err(self.s.syntax_error("expected expression, got `]`"));
                    }
                    TokenKind::PunctuatorOpenBracket => {
                        BindingPattern::Array(self.parse_array_binding_pattern()?)
                    }
                    TokenKind::PunctuatorOpenBrace => {
                        BindingPattern::Object(self.parse_object_binding_pattern()?)
                    }
                    TokenKind::Identifier => {
                        BindingPattern::Identifier(self.force_scan_ident("unexpected token")?)
                    }
                    _ => return Err(self.s.syntax_error("missing variable name")),
                };
                elements.push(Some(Expression::ArrayRest {
                    pattern,
                    span: self.span_from(&rstart),
                }));
                break;
            }
            elements.push(Some(self.parse_expression(ExprOrder::Assign, flags)?));
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorComma {
                self.s.scan()?;
            }
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorCloseBracket {
                break;
            }
        }

        self.s
            .scan_expect(TokenKind::PunctuatorCloseBracket, "expected `]`")?;
        Ok(Expression::Array {
            elements,
            span: self.span_from(&start),
        })
    }

    /// Whether the next token ends a property key. A colon ends the key when
    /// not using shorthand; a comma or close brace can end a shorthand key;
    /// an open paren ends a method shorthand key. With the cover grammar, an
    /// `=` introduces a destructure default.
    fn at_end_of_property_key(&mut self, flags: ExprFlags) -> Result<bool, ParseError> {
        let kind = self.s.peek_at(0)?.kind;
        if flags.maybe_arrow && kind == TokenKind::PunctuatorAssign {
            return Ok(true);
        }
        Ok(kind == TokenKind::PunctuatorColon
            || kind == TokenKind::PunctuatorComma
            || kind == TokenKind::PunctuatorCloseBrace
            || kind == TokenKind::PunctuatorOpenParen)
    }

    /// Parse an object literal assuming the `{` was already consumed.
    fn parse_object_tail(
        &mut self,
        start: Location,
        flags: ExprFlags,
    ) -> Result<Expression, ParseError> {
        let mut properties: Vec<Property> = Vec::new();

        loop {
            // On first iteration: ends an empty object. On later iterations:
            // ends the object after a trailing comma.
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorCloseBrace {
                self.s.scan()?;
                return Ok(Expression::Object {
                    properties,
                    span: self.span_from(&start),
                });
            }

            // Specifiers recorded for the method shorthand.
            let mut is_async = false;
            let mut generator = false;
            let mut kind = PropertyKind::Init;
            let mut computed = false;

            // Until we get to the key, keep track of the position of the
            // last token; we need it for the key span.
            let mut pos = self.s.location();
            let mut t = self.s.scan()?;

            // A computed key starts on `[` and consumes arbitrary tokens, so
            // it cannot be preceded by specifiers we have not yet seen.
            let started_on_computed_key = t.kind == TokenKind::PunctuatorOpenBracket;

            if !started_on_computed_key && !self.at_end_of_property_key(flags)? {
                match t.kind {
                    TokenKind::KeywordGet => kind = PropertyKind::Get,
                    TokenKind::KeywordSet => kind = PropertyKind::Set,
                    TokenKind::KeywordAsync => {
                        is_async = true;

                        // Async generator (async *).
                        if self.s.peek_at(0)?.kind == TokenKind::PunctuatorMult {
                            generator = true;
                            self.s.scan()?;
                        }
                    }
                    TokenKind::PunctuatorMult => generator = true,
                    TokenKind::PunctuatorEllipsis if flags.maybe_arrow => {
                        // For a possible arrow head: an object rest binding.
                        let rstart = self.s.location();
                        let name = match self.s.peek_at(0)?.kind {
                            TokenKind::PunctuatorCloseBrace => {
                                return Err(self.s.syntax_error("expected expression, got `}`"));
                            }
                            TokenKind::Identifier => self.force_scan_ident("unexpected token")?,
                            _ => return Err(self.s.syntax_error("missing variable name")),
                        };
                        properties.push(Property {
                            key: Expression::ObjectRest {
                                name,
                                span: self.span_from(&rstart),
                            },
                            computed: false,
                            value: None,
                            destructure_init: None,
                            method: false,
                            kind: PropertyKind::Init,
                        });
                        self.s
                            .scan_expect(TokenKind::PunctuatorCloseBrace, "expected `}`")?;
                        return Ok(Expression::Object {
                            properties,
                            span: self.span_from(&start),
                        });
                    }
                    _ => return Err(self.s.syntax_error("invalid property syntax")),
                }

                pos = self.s.location();
                t = self.s.scan()?;
            }

            // Next, the key itself.
            let t = self.ctx.keyword_to_identifier(t, true);
            let key = match t.kind {
                TokenKind::Identifier => Expression::Identifier {
                    name: t.literal,
                    span: self.span_from(&pos),
                },
                TokenKind::LiteralString => Expression::String {
                    value: t.string_value(),
                    raw: t.literal,
                    span: self.span_from(&pos),
                },
                TokenKind::LiteralNumber => Expression::Number {
                    value: t.number_value(),
                    raw: t.literal,
                    span: self.span_from(&pos),
                },
                TokenKind::PunctuatorOpenBracket => {
                    computed = true;
                    let k = self.parse_expression(ExprOrder::Comma, flags)?;
                    self.s
                        .scan_expect(TokenKind::PunctuatorCloseBracket, "expected `]`")?;
                    k
                }
                _ => return Err(self.s.syntax_error("expected property name")),
            };

            let mut prop = Property {
                key,
                computed,
                value: None,
                destructure_init: None,
                method: false,
                kind,
            };

            let peek = self.s.peek_at(0)?;
            if prop.kind == PropertyKind::Get || prop.kind == PropertyKind::Set {
                // Getter/setter.
                let fstart = self.s.location();
                let params = self.parse_parameters()?;
                self.check_property_accessor_arity(prop.kind, &params)?;

                let ctx = self.ctx;
                self.ctx.in_async = false;
                self.ctx.in_generator = false;
                let body = self.parse_block()?;
                self.ctx = ctx;

                prop.value = Some(Expression::Function(Box::new(FunctionExpression {
                    id: None,
                    params,
                    body: FunctionBody::Block(body),
                    is_async: false,
                    is_generator: false,
                    arrow: false,
                    span: self.span_from(&fstart),
                })));
            } else if peek.kind == TokenKind::PunctuatorColon {
                // Normal init property.
                if is_async || generator {
                    return Err(self.s.syntax_error("expected method"));
                }
                self.s.scan()?;
                prop.value = Some(self.parse_expression(ExprOrder::Assign, flags)?);
            } else if flags.maybe_arrow && peek.kind == TokenKind::PunctuatorAssign {
                self.s.scan()?;
                prop.destructure_init =
                    Some(self.parse_expression(ExprOrder::Assign, flags)?);
            } else if peek.kind == TokenKind::PunctuatorOpenParen {
                // Method shorthand property.
                let ctx = self.ctx;
                self.ctx.in_async = is_async;
                self.ctx.in_generator = generator;

                let fstart = self.s.location();
                let params = self.parse_parameters()?;
                let body = self.parse_block()?;
                self.ctx = ctx;

                prop.value = Some(Expression::Function(Box::new(FunctionExpression {
                    id: None,
                    params,
                    body: FunctionBody::Block(body),
                    is_async,
                    is_generator: generator,
                    arrow: false,
                    span: self.span_from(&fstart),
                })));
                prop.method = true;
            } else if peek.kind == TokenKind::PunctuatorComma
                || peek.kind == TokenKind::PunctuatorCloseBrace
            {
                // Shorthand syntax; disallowed for computed keys and when
                // async/generator was specified.
                if prop.computed {
                    return Err(self
                        .s
                        .syntax_error("shorthand not allowed for computed property"));
                }
                if is_async || generator {
                    return Err(self.s.syntax_error("expected method"));
                }
            } else {
                return Err(self.s.syntax_error("expected `,` or `}`"));
            }

            properties.push(prop);

            // Object ends after a property.
            if self.s.peek_at(0)?.kind == TokenKind::PunctuatorCloseBrace {
                self.s.scan()?;
                return Ok(Expression::Object {
                    properties,
                    span: self.span_from(&start),
                });
            }

            // Comma before the next property, or before ending after a
            // trailing comma.
            self.s
                .scan_expect(TokenKind::PunctuatorComma, "expected `,` or `}`")?;
        }
    }

    /// Parse a traditional function expression, with the `function` keyword
    /// already consumed.
    fn parse_function_expression_tail(
        &mut self,
        start: Location,
        is_async: bool,
    ) -> Result<FunctionExpression, ParseError> {
        let mut t = self.s.scan()?;

        let mut is_generator = false;
        if t.kind == TokenKind::PunctuatorMult {
            is_generator = true;
            t = self.s.scan()?;
        }

        let t = self.ctx.keyword_to_identifier(t, false);
        let (id, t) = if t.kind == TokenKind::Identifier {
            (Some(t.literal), self.s.scan()?)
        } else {
            (None, t)
        };

        if t.kind != TokenKind::PunctuatorOpenParen {
            return Err(self
                .s
                .syntax_error("expected parameter list following function expression head"));
        }
        let params = self.parse_parameters_tail()?;

        let ctx = self.ctx;
        self.ctx.in_async = is_async;
        self.ctx.in_generator = is_generator;
        let body = self.parse_block()?;
        self.ctx = ctx;

        Ok(FunctionExpression {
            id,
            params,
            body: FunctionBody::Block(body),
            is_async,
            is_generator,
            arrow: false,
            span: self.span_from(&start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_module(s: &str) -> Result<Program, ParseError> {
        Parser::new(s).parse(ParseOptions {
            mode: ParseMode::Module,
        })
    }

    fn parse_expr(s: &str) -> Result<Program, ParseError> {
        Parser::new(s).parse(ParseOptions {
            mode: ParseMode::Expression,
        })
    }

    #[test]
    fn test_empty_module() {
        let p = parse_module("").unwrap();
        assert!(matches!(p, Program::Module { ref body, .. } if body.is_empty()));
    }

    #[test]
    fn test_precedence() {
        // 8 + 4 * 3 parses as 8 + (4 * 3).
        let p = parse_expr("8 + 4 * 3").unwrap();
        let Program::Expression(Expression::Binary { operator, left, right, .. }) = p else {
            panic!("expected binary expression");
        };
        assert_eq!(operator, BinaryOperator::Add);
        assert!(matches!(*left, Expression::Number { value, .. } if value == 8.0));
        assert!(
            matches!(*right, Expression::Binary { operator: BinaryOperator::Mult, .. })
        );
    }

    #[test]
    fn test_precedence_flipped() {
        // 4 * 3 + 8 parses as (4 * 3) + 8.
        let p = parse_expr("4 * 3 + 8").unwrap();
        let Program::Expression(Expression::Binary { operator, left, .. }) = p else {
            panic!("expected binary expression");
        };
        assert_eq!(operator, BinaryOperator::Add);
        assert!(
            matches!(*left, Expression::Binary { operator: BinaryOperator::Mult, .. })
        );
    }

    #[test]
    fn test_bit_or_operator() {
        let p = parse_expr("a | b").unwrap();
        let Program::Expression(Expression::Binary { operator, .. }) = p else {
            panic!("expected binary expression");
        };
        assert_eq!(operator, BinaryOperator::BitOr);
    }

    #[test]
    fn test_member_chain() {
        assert!(parse_module("window.localStorage.getItem;").is_ok());
        assert!(parse_module("window.[];").is_err());
    }

    #[test]
    fn test_optional_chaining() {
        let p = parse_expr("a?.b?.[0]?.()").unwrap();
        let Program::Expression(Expression::Call { optional, .. }) = p else {
            panic!("expected call expression");
        };
        assert!(optional);
    }

    #[test]
    fn test_postfix_newline_suppressed() {
        // A line terminator before ++ suppresses the postfix update.
        let p = parse_module("a\n++b;").unwrap();
        let Program::Module { body, .. } = p else { panic!() };
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_cover_grammar_residue_rejected() {
        assert!(parse_module("(...x);").is_err());
        assert!(parse_module("({x = 1});").is_err());
        assert!(parse_module("();").is_err());
    }

    #[test]
    fn test_arrow_heads() {
        assert!(parse_module("() => {};").is_ok());
        assert!(parse_module("x => x;").is_ok());
        assert!(parse_module("(x, y) => x + y;").is_ok());
        assert!(parse_module("({x = 1, ...y}, z, ...w) => {};").is_ok());
        assert!(parse_module("async x => x;").is_ok());
        assert!(parse_module("async (x) => x;").is_ok());
    }

    #[test]
    fn test_async_call() {
        let p = parse_expr("async(1, 2)").unwrap();
        let Program::Expression(Expression::Call { callee, arguments, .. }) = p else {
            panic!("expected call expression");
        };
        assert!(matches!(*callee, Expression::Identifier { ref name, .. } if name == "async"));
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn test_strict_mode_restrictions() {
        assert!(parse_module("arguments = 1;").is_err());
        assert!(parse_module("var let = 1;").is_err());
        let script = Parser::new("arguments = 1; var let = 2;").parse(ParseOptions {
            mode: ParseMode::Script,
        });
        assert!(script.is_ok());
    }

    #[test]
    fn test_directive_enables_strict() {
        let err = Parser::new("\"use strict\"; arguments = 1;")
            .parse(ParseOptions::default())
            .unwrap_err();
        assert!(err.message.contains("restricted"));
    }

    #[test]
    fn test_try_requires_handler_or_finalizer() {
        assert!(parse_module("try {} catch {}").is_ok());
        assert!(parse_module("try {} finally {}").is_ok());
        assert!(parse_module("try {} catch (e) {} finally {}").is_ok());
        assert!(parse_module("try {}").is_err());
    }

    #[test]
    fn test_throw_newline_illegal() {
        assert!(parse_module("throw\nx;").is_err());
        assert!(parse_module("throw x;").is_ok());
    }

    #[test]
    fn test_generator_declarations() {
        assert!(parse_module("function* gen() {}").is_ok());
        assert!(parse_module("async function af() {}").is_ok());
        assert!(parse_module("var f = function* named() {};").is_ok());
    }

    #[test]
    fn test_class_bodies() {
        assert!(parse_module("class A { m() {} get x() {} set x(v) {} static s() {} }").is_ok());
        assert!(parse_module("class B extends A { constructor() {} }").is_ok());
        assert!(parse_module("var C = class extends A {};").is_ok());
        assert!(parse_module("class D { get x(v) {} }").is_err());
        assert!(parse_module("class E { set x() {} }").is_err());
    }

    #[test]
    fn test_for_heads() {
        assert!(parse_module("for (;;) break;").is_ok());
        assert!(parse_module("for (var i = 0; i < 10; i++) f(i);").is_ok());
        assert!(parse_module("for (var k in obj) f(k);").is_ok());
        assert!(parse_module("for (x of xs) f(x);").is_ok());
    }

    #[test]
    fn test_unsupported_statements() {
        let err = parse_module("export default x;").unwrap_err();
        assert!(err.message.contains("export"));
        let err = parse_module("with (x) {}").unwrap_err();
        assert!(err.message.contains("with"));
        let err = parse_module("debugger;").unwrap_err();
        assert!(err.message.contains("debugger"));
    }

    #[test]
    fn test_labeled_statement() {
        let p = parse_module("outer: for (;;) break outer;").unwrap();
        let Program::Module { body, .. } = p else { panic!() };
        assert!(matches!(body[0], Statement::Labeled { ref label, .. } if label == "outer"));
    }

    #[test]
    fn test_regex_primary() {
        let p = parse_module("/[\\]/]/;").unwrap();
        let Program::Module { body, .. } = p else { panic!() };
        let Statement::Expression(es) = &body[0] else { panic!() };
        let Expression::RegExp { pattern, .. } = &es.expression else {
            panic!("expected regex literal");
        };
        assert_eq!(pattern, "[\\]/]");
    }

    #[test]
    fn test_let_heuristics() {
        // In sloppy script mode, `let` alone is an identifier expression.
        let script = |s: &str| {
            Parser::new(s).parse(ParseOptions {
                mode: ParseMode::Script,
            })
        };
        assert!(script("let = 5;").is_ok());
        assert!(script("let x = 5;").is_ok());
        assert!(script("let [x] = xs;").is_ok());
        assert!(script("let {x} = o;").is_ok());
    }
}
