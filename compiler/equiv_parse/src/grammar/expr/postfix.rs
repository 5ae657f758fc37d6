//! Postfix Expression Parsing
//!
//! Calls, attribute access, subscripts and slices.

use crate::{ParseError, ParseErrorKind, Parser};
use equiv_ir::{CallArg, ExprId, ExprKind, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    let span = self.expr_span(expr).merge(self.previous_span());
                    expr = self.alloc(ExprKind::Call { func: expr, args }, span);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_subscript_index()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    let span = self.expr_span(expr).merge(self.previous_span());
                    expr = self.alloc(
                        ExprKind::Subscript {
                            object: expr,
                            index,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let (attr, attr_span) = self.expect_ident()?;
                    let span = self.expr_span(expr).merge(attr_span);
                    expr = self.alloc(ExprKind::Attribute { object: expr, attr }, span);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments after `(`, up to but not including `)`.
    ///
    /// A lone unparenthesized generator, as in `sum(x for x in xs)`, becomes a
    /// single positional argument.
    fn parse_call_args(&mut self) -> Result<Vec<CallArg>, ParseError> {
        let mut args = Vec::new();
        let mut seen_keyword = false;
        while !self.check(&TokenKind::RParen) {
            match self.current_kind() {
                TokenKind::Star => {
                    self.advance();
                    args.push(CallArg::Star(self.parse_test()?));
                }
                TokenKind::DoubleStar => {
                    return Err(self.error(ParseErrorKind::Unsupported("'**' argument unpacking")));
                }
                TokenKind::Ident(name) if self.cursor.peek_kind(1) == TokenKind::Eq => {
                    self.advance();
                    self.advance();
                    seen_keyword = true;
                    args.push(CallArg::Keyword(name, self.parse_test()?));
                }
                _ => {
                    if seen_keyword {
                        return Err(self.error(ParseErrorKind::PositionalAfterKeyword));
                    }
                    let value = self.parse_test()?;
                    if self.check(&TokenKind::For) {
                        let generator = self.parse_comprehension(
                            equiv_ir::ComprehensionKind::Generator,
                            value,
                            None,
                        )?;
                        if !args.is_empty() || !self.check(&TokenKind::RParen) {
                            return Err(ParseError::new(
                                ParseErrorKind::UnparenthesizedGenerator,
                                self.expr_span(generator),
                            ));
                        }
                        args.push(CallArg::Positional(generator));
                        break;
                    }
                    args.push(CallArg::Positional(value));
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    /// Index inside `[...]`: an expression, a slice, or a tuple of them.
    fn parse_subscript_index(&mut self) -> Result<ExprId, ParseError> {
        let first = self.parse_slice_item()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let start = self.expr_span(first);
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.parse_slice_item()?);
        }
        let span = start.merge(self.previous_span());
        Ok(self.alloc(ExprKind::Tuple(items), span))
    }

    fn parse_slice_item(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            let expr = self.parse_test()?;
            if !self.check(&TokenKind::Colon) {
                return Ok(expr);
            }
            Some(expr)
        };
        self.advance();

        let ends_part = |p: &Self| {
            matches!(
                p.current_kind(),
                TokenKind::Colon | TokenKind::RBracket | TokenKind::Comma
            )
        };
        let upper = if ends_part(self) {
            None
        } else {
            Some(self.parse_test()?)
        };
        let step = if self.eat(&TokenKind::Colon) && !ends_part(self) {
            Some(self.parse_test()?)
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Ok(self.alloc(ExprKind::Slice { lower, upper, step }, span))
    }
}
