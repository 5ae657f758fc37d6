//! Expression parsing.
//!
//! One method per precedence level, lowest first:
//! conditional, `or`, `and`, `not`, comparison chain, `|`, `^`, `&`, shifts,
//! additive, multiplicative, unary, `**`, postfix, atoms.

mod operators;
mod postfix;
mod primary;

use crate::{ParseError, Parser};
use equiv_ir::{BoolOp, ExprId, ExprKind, TokenKind, UnaryOp};
use equiv_stack::ensure_sufficient_stack;

impl Parser<'_> {
    /// `test (',' test)* [',']`: a bare tuple when a comma appears.
    pub(crate) fn parse_testlist(&mut self) -> Result<ExprId, ParseError> {
        let first = self.parse_test()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let start = self.expr_span(first);
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.parse_test()?);
        }
        let span = start.merge(self.previous_span());
        Ok(self.alloc(ExprKind::Tuple(items), span))
    }

    /// Whether the current token can begin an expression.
    pub(crate) fn starts_expression(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::Ident(_)
                | TokenKind::None
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Tilde
                | TokenKind::Not
                | TokenKind::Lambda
        )
    }

    /// Full expression: conditional or lambda.
    ///
    /// Uses `ensure_sufficient_stack` so deeply nested input does not
    /// overflow the native stack.
    pub(crate) fn parse_test(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_test_inner())
    }

    fn parse_test_inner(&mut self) -> Result<ExprId, ParseError> {
        if self.check(&TokenKind::Lambda) {
            return self.parse_lambda();
        }
        let then_branch = self.parse_or()?;
        if !self.eat(&TokenKind::If) {
            return Ok(then_branch);
        }
        let cond = self.parse_or()?;
        self.expect(&TokenKind::Else, "'else'")?;
        let else_branch = self.parse_test()?;
        let span = self
            .expr_span(then_branch)
            .merge(self.expr_span(else_branch));
        Ok(self.alloc(
            ExprKind::IfExp {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    /// `lambda params: test`
    fn parse_lambda(&mut self) -> Result<ExprId, ParseError> {
        let start = self.advance().span;
        let params = self.parse_params(&TokenKind::Colon, false)?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_test()?;
        let span = start.merge(self.expr_span(body));
        let name = self.interner.intern("<lambda>");
        let function = self.arena.alloc_function(equiv_ir::FunctionDef {
            name,
            params,
            body: equiv_ir::FunctionBody::Expr(body),
            span,
        });
        Ok(self.alloc(ExprKind::Lambda(function), span))
    }

    /// Parse `or`
    pub(crate) fn parse_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_and()?;

        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;

            let span = self.expr_span(left).merge(self.expr_span(right));
            left = self.alloc(
                ExprKind::BoolOp {
                    op: BoolOp::Or,
                    left,
                    right,
                },
                span,
            );
        }

        Ok(left)
    }

    /// Parse `and`
    fn parse_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_not()?;

        while self.eat(&TokenKind::And) {
            let right = self.parse_not()?;

            let span = self.expr_span(left).merge(self.expr_span(right));
            left = self.alloc(
                ExprKind::BoolOp {
                    op: BoolOp::And,
                    left,
                    right,
                },
                span,
            );
        }

        Ok(left)
    }

    /// Parse prefix `not`
    fn parse_not(&mut self) -> Result<ExprId, ParseError> {
        if !self.check(&TokenKind::Not) {
            return self.parse_comparison();
        }
        let start = self.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_not())?;
        let span = start.merge(self.expr_span(operand));
        Ok(self.alloc(
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            },
            span,
        ))
    }

    /// Parse a comparison chain: `a < b <= c`, `x not in ys`, `v is not None`
    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let left = self.parse_bitwise_or()?;
        let mut rest = Vec::new();

        while let Some((op, width)) = self.match_comparison_op() {
            for _ in 0..width {
                self.advance();
            }
            rest.push((op, self.parse_bitwise_or()?));
        }

        let Some(&(_, last)) = rest.last() else {
            return Ok(left);
        };
        let span = self.expr_span(left).merge(self.expr_span(last));
        Ok(self.alloc(ExprKind::Compare { left, rest }, span))
    }

    /// Parse `|`
    pub(crate) fn parse_bitwise_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_bitwise_xor()?;

        while self.eat(&TokenKind::Pipe) {
            let right = self.parse_bitwise_xor()?;
            left = self.binary(equiv_ir::BinaryOp::BitOr, left, right);
        }

        Ok(left)
    }

    /// Parse `^`
    fn parse_bitwise_xor(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_bitwise_and()?;

        while self.eat(&TokenKind::Caret) {
            let right = self.parse_bitwise_and()?;
            left = self.binary(equiv_ir::BinaryOp::BitXor, left, right);
        }

        Ok(left)
    }

    /// Parse `&`
    fn parse_bitwise_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_shift()?;

        while self.eat(&TokenKind::Amp) {
            let right = self.parse_shift()?;
            left = self.binary(equiv_ir::BinaryOp::BitAnd, left, right);
        }

        Ok(left)
    }

    /// Parse `<<` and `>>`
    fn parse_shift(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_additive()?;

        while let Some(op) = self.match_shift_op() {
            self.advance();
            let right = self.parse_additive()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse `+` and `-`
    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;

        while let Some(op) = self.match_additive_op() {
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse `*`, `/`, `//` and `%`
    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.match_multiplicative_op() {
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse prefix `-`, `+` and `~`
    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let Some(op) = self.match_unary_op() else {
            return self.parse_power();
        };
        let start = self.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(self.expr_span(operand));
        Ok(self.alloc(ExprKind::Unary { op, operand }, span))
    }

    /// Parse `**`, which binds tighter than a unary operator on its left and
    /// is right-associative.
    fn parse_power(&mut self) -> Result<ExprId, ParseError> {
        let base = self.parse_postfix()?;
        if !self.eat(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.parse_unary()?;
        Ok(self.binary(equiv_ir::BinaryOp::Pow, base, exponent))
    }

    fn binary(&mut self, op: equiv_ir::BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.expr_span(left).merge(self.expr_span(right));
        self.alloc(ExprKind::Binary { op, left, right }, span)
    }
}
