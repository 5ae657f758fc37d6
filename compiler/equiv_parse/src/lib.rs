//! Recursive descent parser for the equiv source language.
//!
//! Produces a flat AST in an [`Arena`]. The grammar is the statement and
//! expression core of Python; constructs outside it (classes, exception
//! handling, generators, scope declarations) are refused with a
//! [`ParseErrorKind::Unsupported`] error naming the construct.

mod cursor;
mod error;
mod grammar;

pub use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind, SyntaxError};

use equiv_ir::{Arena, Expr, ExprId, Module, Span, StringInterner, TokenKind, TokenList};

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: Arena,
    interner: &'a mut StringInterner,
    /// Enclosing `def`s; `return` is only valid when non-zero.
    function_depth: u32,
    /// Enclosing loops of the innermost function.
    loop_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList, interner: &'a mut StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena: Arena::new(),
            interner,
            function_depth: 0,
            loop_depth: 0,
        }
    }

    /// Parse a whole module.
    ///
    /// # Errors
    /// Returns the first syntax error; there is no recovery.
    pub fn parse_module(mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Indent => return Err(self.error(ParseErrorKind::UnexpectedIndent)),
                _ => self.parse_statement(&mut body)?,
            }
        }
        tracing::trace!(
            statements = body.len(),
            exprs = self.arena.expr_count(),
            "parsed module"
        );
        Ok(Module {
            arena: self.arena,
            body,
        })
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    pub(crate) fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> equiv_ir::Token {
        self.cursor.advance()
    }

    /// Consume `kind` if it is next.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(
        &mut self,
        kind: &TokenKind,
        expected: &'static str,
    ) -> Result<equiv_ir::Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<(equiv_ir::Name, Span), ParseError> {
        let token = self.cursor.current();
        if let TokenKind::Ident(name) = token.kind {
            self.advance();
            Ok((name, token.span))
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    pub(crate) fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.current_span())
    }

    pub(crate) fn unexpected(&self, expected: &'static str) -> ParseError {
        self.error(ParseErrorKind::UnexpectedToken {
            expected,
            found: self.current_kind(),
        })
    }

    pub(crate) fn alloc(&mut self, kind: equiv_ir::ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    pub(crate) fn expr_span(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }
}

/// Parse a token stream.
///
/// # Errors
/// Returns the first [`ParseError`].
pub fn parse(tokens: &TokenList, interner: &mut StringInterner) -> Result<Module, ParseError> {
    Parser::new(tokens, interner).parse_module()
}

/// Lex and parse a source unit.
///
/// Run [`equiv_lexer::dedent`] first for snippets that may arrive indented.
///
/// # Errors
/// Returns the first lex or parse error as a [`SyntaxError`].
pub fn parse_source(source: &str, interner: &mut StringInterner) -> Result<Module, SyntaxError> {
    let tokens = equiv_lexer::lex(source, interner)?;
    Ok(parse(&tokens, interner)?)
}
