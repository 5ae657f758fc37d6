//! Primary Expression Parsing
//!
//! Literals, names, parenthesized expressions, displays and comprehensions.

use crate::{ParseError, ParseErrorKind, Parser};
use equiv_ir::{Comprehension, ComprehensionKind, ExprId, ExprKind, Generator, Span, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        let kind = match token.kind {
            TokenKind::Int(v) => ExprKind::Int(v),
            TokenKind::Float(v) => ExprKind::Float(v),
            TokenKind::Str(_) => return Ok(self.parse_strings()),
            TokenKind::Ident(name) => ExprKind::Ident(name),
            TokenKind::None => ExprKind::None,
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => return self.parse_list_display(),
            TokenKind::LBrace => return self.parse_brace_display(),
            TokenKind::Yield => return Err(self.error(ParseErrorKind::Unsupported("'yield'"))),
            TokenKind::Await => return Err(self.error(ParseErrorKind::Unsupported("'await'"))),
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(self.alloc(kind, token.span))
    }

    /// Adjacent string literals concatenate: `"ab" "cd"`.
    fn parse_strings(&mut self) -> ExprId {
        let first = self.advance();
        let TokenKind::Str(mut name) = first.kind else {
            return self.alloc(ExprKind::None, first.span);
        };
        let mut span = first.span;
        if let TokenKind::Str(_) = self.current_kind() {
            let mut text = self.interner.lookup(name).to_owned();
            while let TokenKind::Str(next) = self.current_kind() {
                text.push_str(self.interner.lookup(next));
                span = span.merge(self.advance().span);
            }
            name = self.interner.intern(&text);
        }
        self.alloc(ExprKind::Str(name), span)
    }

    /// `()`, `(expr)`, `(a, b)`, or a parenthesized generator.
    fn parse_paren(&mut self) -> Result<ExprId, ParseError> {
        let start = self.advance().span;
        if self.eat(&TokenKind::RParen) {
            let span = start.merge(self.previous_span());
            return Ok(self.alloc(ExprKind::Tuple(Vec::new()), span));
        }
        let first = self.parse_test()?;
        if self.check(&TokenKind::For) {
            let generator =
                self.parse_comprehension(ComprehensionKind::Generator, first, None)?;
            self.expect(&TokenKind::RParen, "')'")?;
            return Ok(generator);
        }
        if !self.check(&TokenKind::Comma) {
            self.expect(&TokenKind::RParen, "')'")?;
            return Ok(first);
        }
        let items = self.parse_rest_of_sequence(first, &TokenKind::RParen)?;
        self.expect(&TokenKind::RParen, "')'")?;
        let span = start.merge(self.previous_span());
        Ok(self.alloc(ExprKind::Tuple(items), span))
    }

    fn parse_list_display(&mut self) -> Result<ExprId, ParseError> {
        let start = self.advance().span;
        if self.eat(&TokenKind::RBracket) {
            let span = start.merge(self.previous_span());
            return Ok(self.alloc(ExprKind::List(Vec::new()), span));
        }
        let first = self.parse_test()?;
        let expr = if self.check(&TokenKind::For) {
            self.parse_comprehension(ComprehensionKind::List, first, None)?
        } else {
            let items = self.parse_rest_of_sequence(first, &TokenKind::RBracket)?;
            self.alloc(ExprKind::List(items), Span::DUMMY)
        };
        self.expect(&TokenKind::RBracket, "']'")?;
        Ok(self.respan(expr, start))
    }

    /// `{}` is an empty dict; otherwise the first item decides dict or set.
    fn parse_brace_display(&mut self) -> Result<ExprId, ParseError> {
        let start = self.advance().span;
        if self.eat(&TokenKind::RBrace) {
            let span = start.merge(self.previous_span());
            return Ok(self.alloc(ExprKind::Dict(Vec::new()), span));
        }
        let first = self.parse_test()?;
        let expr = if self.eat(&TokenKind::Colon) {
            let value = self.parse_test()?;
            if self.check(&TokenKind::For) {
                self.parse_comprehension(ComprehensionKind::Dict, first, Some(value))?
            } else {
                let mut entries = vec![(first, value)];
                while self.eat(&TokenKind::Comma) {
                    if self.check(&TokenKind::RBrace) {
                        break;
                    }
                    let key = self.parse_test()?;
                    self.expect(&TokenKind::Colon, "':'")?;
                    let value = self.parse_test()?;
                    entries.push((key, value));
                }
                self.alloc(ExprKind::Dict(entries), Span::DUMMY)
            }
        } else if self.check(&TokenKind::For) {
            self.parse_comprehension(ComprehensionKind::Set, first, None)?
        } else {
            let items = self.parse_rest_of_sequence(first, &TokenKind::RBrace)?;
            self.alloc(ExprKind::Set(items), Span::DUMMY)
        };
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(self.respan(expr, start))
    }

    /// Remaining `, item` entries of a display after its first item.
    fn parse_rest_of_sequence(
        &mut self,
        first: ExprId,
        closing: &TokenKind,
    ) -> Result<Vec<ExprId>, ParseError> {
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(closing) {
                break;
            }
            items.push(self.parse_test()?);
        }
        Ok(items)
    }

    /// `for target in iter (if cond)*`, repeated, after the element.
    pub(crate) fn parse_comprehension(
        &mut self,
        kind: ComprehensionKind,
        element: ExprId,
        value: Option<ExprId>,
    ) -> Result<ExprId, ParseError> {
        let mut generators = Vec::new();
        while self.eat(&TokenKind::For) {
            let target = self.parse_target_list()?;
            self.expect(&TokenKind::In, "'in'")?;
            let iter = self.parse_or()?;
            let mut conditions = Vec::new();
            while self.eat(&TokenKind::If) {
                conditions.push(self.parse_or()?);
            }
            generators.push(Generator {
                target,
                iter,
                conditions,
            });
        }
        let span = self.expr_span(element).merge(self.previous_span());
        Ok(self.alloc(
            ExprKind::Comprehension(Box::new(Comprehension {
                kind,
                element,
                value,
                generators,
            })),
            span,
        ))
    }

    /// Widen `expr`'s span to cover its brackets.
    fn respan(&mut self, expr: ExprId, start: Span) -> ExprId {
        let span = start.merge(self.previous_span());
        self.arena.set_expr_span(expr, span);
        expr
    }
}
