//! Assignment targets.
//!
//! Targets are parsed as expressions and then converted, so `a, b[i] = ...`
//! and `for k, v in ...` share the expression grammar.

use crate::{ParseError, ParseErrorKind, Parser};
use equiv_ir::{ExprId, ExprKind, Target, TokenKind};

impl Parser<'_> {
    /// Comma-separated targets, stopping before `in` or `=`.
    pub(crate) fn parse_target_list(&mut self) -> Result<Target, ParseError> {
        let start = self.current_span();
        let first = self.parse_bitwise_or()?;
        if !self.check(&TokenKind::Comma) {
            return self.expr_to_target(first);
        }
        let mut items = vec![self.expr_to_target(first)?];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            let item = self.parse_bitwise_or()?;
            items.push(self.expr_to_target(item)?);
        }
        Ok(Target::Tuple(items, start.merge(self.previous_span())))
    }

    /// A single target, as in `del x[0]`.
    pub(crate) fn parse_target(&mut self) -> Result<Target, ParseError> {
        let expr = self.parse_bitwise_or()?;
        self.expr_to_target(expr)
    }

    pub(crate) fn expr_to_target(&self, id: ExprId) -> Result<Target, ParseError> {
        let expr = self.arena.expr(id);
        let span = expr.span;
        let invalid = |what: &'static str| -> Result<Target, ParseError> {
            Err(ParseError::new(ParseErrorKind::InvalidTarget(what), span))
        };
        match &expr.kind {
            ExprKind::Ident(name) => Ok(Target::Name(*name, span)),
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                let items = items
                    .iter()
                    .map(|&item| self.expr_to_target(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Target::Tuple(items, span))
            }
            ExprKind::Subscript { object, index } => Ok(Target::Subscript {
                object: *object,
                index: *index,
                span,
            }),
            ExprKind::Attribute { .. } => invalid("attribute"),
            ExprKind::Call { .. } => invalid("function call"),
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Bool(_)
            | ExprKind::None => invalid("literal"),
            ExprKind::Lambda(_) => invalid("lambda"),
            ExprKind::Comprehension(_) => invalid("comprehension"),
            _ => invalid("expression"),
        }
    }
}
