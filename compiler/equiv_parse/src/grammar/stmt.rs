//! Statement parsing.
//!
//! A statement line is either one compound statement (`def`, `if`, `while`,
//! `for`) or a `;`-separated run of simple statements ending in `Newline`.

use crate::{ParseError, ParseErrorKind, Parser};
use equiv_ir::{
    BinaryOp, FunctionBody, FunctionDef, Param, Span, Stmt, StmtId, StmtKind, TokenKind,
};
use equiv_stack::ensure_sufficient_stack;

impl Parser<'_> {
    /// Parse one statement line, appending to `out`.
    pub(crate) fn parse_statement(&mut self, out: &mut Vec<StmtId>) -> Result<(), ParseError> {
        ensure_sufficient_stack(|| self.parse_statement_inner(out))
    }

    fn parse_statement_inner(&mut self, out: &mut Vec<StmtId>) -> Result<(), ParseError> {
        let stmt = match self.current_kind() {
            TokenKind::Def => self.parse_function_def()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Class => return Err(self.error(ParseErrorKind::Unsupported("'class'"))),
            TokenKind::Try | TokenKind::Except | TokenKind::Finally => {
                return Err(self.error(ParseErrorKind::Unsupported("'try'")));
            }
            TokenKind::With => return Err(self.error(ParseErrorKind::Unsupported("'with'"))),
            TokenKind::Async => return Err(self.error(ParseErrorKind::Unsupported("'async'"))),
            TokenKind::Indent => return Err(self.error(ParseErrorKind::UnexpectedIndent)),
            _ => return self.parse_simple_statements(out),
        };
        out.push(stmt);
        Ok(())
    }

    fn alloc_stmt(&mut self, kind: StmtKind, start: Span) -> StmtId {
        let span = start.merge(self.previous_span());
        self.arena.alloc_stmt(Stmt::new(kind, span))
    }

    /// `: simple_stmts` on the same line, or `: NEWLINE INDENT stmt+ DEDENT`.
    pub(crate) fn parse_block(&mut self) -> Result<Vec<StmtId>, ParseError> {
        self.expect(&TokenKind::Colon, "':'")?;
        let mut body = Vec::new();
        if !self.eat(&TokenKind::Newline) {
            self.parse_simple_statements(&mut body)?;
            return Ok(body);
        }
        if !self.eat(&TokenKind::Indent) {
            return Err(self.error(ParseErrorKind::ExpectedIndent));
        }
        while !self.check(&TokenKind::Dedent) && !self.cursor.is_at_end() {
            if self.eat(&TokenKind::Newline) {
                continue;
            }
            self.parse_statement(&mut body)?;
        }
        self.expect(&TokenKind::Dedent, "dedent")?;
        Ok(body)
    }

    fn parse_loop_body(&mut self) -> Result<Vec<StmtId>, ParseError> {
        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;
        body
    }

    fn reject_loop_else(&self) -> Result<(), ParseError> {
        if self.check(&TokenKind::Else) {
            return Err(self.error(ParseErrorKind::Unsupported("'else' clause on a loop")));
        }
        Ok(())
    }

    fn parse_function_def(&mut self) -> Result<StmtId, ParseError> {
        let start = self.advance().span;
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::LParen, "'('")?;
        let params = self.parse_params(&TokenKind::RParen, true)?;
        self.expect(&TokenKind::RParen, "')'")?;
        if self.eat(&TokenKind::Arrow) {
            self.parse_test()?;
        }

        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let body = self.parse_block();
        self.function_depth -= 1;
        self.loop_depth = saved_loops;
        let body = body?;

        let span = start.merge(self.previous_span());
        let function = self.arena.alloc_function(FunctionDef {
            name,
            params,
            body: FunctionBody::Block(body),
            span,
        });
        Ok(self.alloc_stmt(StmtKind::FunctionDef(function), start))
    }

    /// Parameters up to `closing`. Annotations are parsed and dropped.
    pub(crate) fn parse_params(
        &mut self,
        closing: &TokenKind,
        annotations: bool,
    ) -> Result<Vec<Param>, ParseError> {
        let mut params: Vec<Param> = Vec::new();
        while !self.check(closing) {
            if matches!(self.current_kind(), TokenKind::Star | TokenKind::DoubleStar) {
                return Err(self.error(ParseErrorKind::Unsupported("variadic parameters")));
            }
            let (name, span) = self.expect_ident()?;
            if params.iter().any(|p| p.name == name) {
                let text = self.interner.lookup(name).to_owned();
                return Err(ParseError::new(
                    ParseErrorKind::DuplicateParameter(text),
                    span,
                ));
            }
            if annotations && self.eat(&TokenKind::Colon) {
                self.parse_test()?;
            }
            let default = if self.eat(&TokenKind::Eq) {
                Some(self.parse_test()?)
            } else {
                if params.iter().any(|p| p.default.is_some()) {
                    return Err(ParseError::new(ParseErrorKind::NonDefaultAfterDefault, span));
                }
                None
            };
            params.push(Param {
                name,
                default,
                span,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// `if`/`elif` chain. `elif` nests as a single `If` in the else branch.
    fn parse_if(&mut self) -> Result<StmtId, ParseError> {
        let start = self.advance().span;
        let cond = self.parse_test()?;
        let body = self.parse_block()?;
        let orelse = match self.current_kind() {
            TokenKind::Elif => vec![self.parse_if()?],
            TokenKind::Else => {
                self.advance();
                self.parse_block()?
            }
            _ => Vec::new(),
        };
        Ok(self.alloc_stmt(StmtKind::If { cond, body, orelse }, start))
    }

    fn parse_while(&mut self) -> Result<StmtId, ParseError> {
        let start = self.advance().span;
        let cond = self.parse_test()?;
        let body = self.parse_loop_body()?;
        self.reject_loop_else()?;
        Ok(self.alloc_stmt(StmtKind::While { cond, body }, start))
    }

    fn parse_for(&mut self) -> Result<StmtId, ParseError> {
        let start = self.advance().span;
        let target = self.parse_target_list()?;
        self.expect(&TokenKind::In, "'in'")?;
        let iter = self.parse_testlist()?;
        let body = self.parse_loop_body()?;
        self.reject_loop_else()?;
        Ok(self.alloc_stmt(StmtKind::For { target, iter, body }, start))
    }

    fn parse_simple_statements(&mut self, out: &mut Vec<StmtId>) -> Result<(), ParseError> {
        loop {
            out.push(self.parse_small_statement()?);
            if !self.eat(&TokenKind::Semicolon) {
                break;
            }
            if matches!(self.current_kind(), TokenKind::Newline | TokenKind::Eof) {
                break;
            }
        }
        if !self.cursor.is_at_end() {
            self.expect(&TokenKind::Newline, "newline")?;
        }
        Ok(())
    }

    pub(crate) fn at_statement_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof | TokenKind::Dedent
        )
    }

    fn parse_small_statement(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Pass => {
                self.advance();
                StmtKind::Pass
            }
            TokenKind::Break => {
                if self.loop_depth == 0 {
                    return Err(self.error(ParseErrorKind::OutsideLoop("break")));
                }
                self.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                if self.loop_depth == 0 {
                    return Err(self.error(ParseErrorKind::OutsideLoop("continue")));
                }
                self.advance();
                StmtKind::Continue
            }
            TokenKind::Return => {
                if self.function_depth == 0 {
                    return Err(self.error(ParseErrorKind::OutsideFunction("return")));
                }
                self.advance();
                if self.at_statement_end() {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.parse_testlist()?))
                }
            }
            TokenKind::Raise => {
                self.advance();
                let exc = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_test()?)
                };
                if self.eat(&TokenKind::From) {
                    self.parse_test()?;
                }
                StmtKind::Raise(exc)
            }
            TokenKind::Assert => {
                self.advance();
                let cond = self.parse_test()?;
                let message = if self.eat(&TokenKind::Comma) {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                StmtKind::Assert { cond, message }
            }
            TokenKind::Del => {
                self.advance();
                let mut targets = vec![self.parse_target()?];
                while self.eat(&TokenKind::Comma) {
                    if self.at_statement_end() {
                        break;
                    }
                    targets.push(self.parse_target()?);
                }
                StmtKind::Delete(targets)
            }
            TokenKind::Import => self.parse_import()?,
            TokenKind::From => self.parse_from_import()?,
            TokenKind::Global => return Err(self.error(ParseErrorKind::Unsupported("'global'"))),
            TokenKind::Nonlocal => {
                return Err(self.error(ParseErrorKind::Unsupported("'nonlocal'")));
            }
            TokenKind::Yield => return Err(self.error(ParseErrorKind::Unsupported("'yield'"))),
            _ => return self.parse_expression_statement(),
        };
        Ok(self.alloc_stmt(kind, start))
    }

    /// Dotted module path; only the first component is kept.
    fn parse_module_path(&mut self) -> Result<equiv_ir::Name, ParseError> {
        let (module, _) = self.expect_ident()?;
        while self.eat(&TokenKind::Dot) {
            self.expect_ident()?;
        }
        Ok(module)
    }

    fn parse_import(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        let module = self.parse_module_path()?;
        if self.eat(&TokenKind::As) {
            self.expect_ident()?;
        }
        while self.eat(&TokenKind::Comma) {
            self.parse_module_path()?;
            if self.eat(&TokenKind::As) {
                self.expect_ident()?;
            }
        }
        Ok(StmtKind::Import { module })
    }

    fn parse_from_import(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        let module = self.parse_module_path()?;
        self.expect(&TokenKind::Import, "'import'")?;
        if self.eat(&TokenKind::Star) {
            return Ok(StmtKind::Import { module });
        }
        let parenthesized = self.eat(&TokenKind::LParen);
        loop {
            self.expect_ident()?;
            if self.eat(&TokenKind::As) {
                self.expect_ident()?;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if parenthesized && self.check(&TokenKind::RParen) {
                break;
            }
        }
        if parenthesized {
            self.expect(&TokenKind::RParen, "')'")?;
        }
        Ok(StmtKind::Import { module })
    }

    /// Expression statement, assignment, annotated or augmented assignment.
    fn parse_expression_statement(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        let first = self.parse_testlist()?;

        if self.check(&TokenKind::Colon) {
            let target = self.expr_to_target(first)?;
            self.advance();
            self.parse_test()?;
            let kind = if self.eat(&TokenKind::Eq) {
                let value = self.parse_testlist()?;
                StmtKind::Assign {
                    targets: vec![target],
                    value,
                }
            } else {
                StmtKind::Pass
            };
            return Ok(self.alloc_stmt(kind, start));
        }

        if let Some(op) = self.match_augmented_op() {
            let target = self.expr_to_target(first)?;
            if matches!(target, equiv_ir::Target::Tuple(..)) {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidTarget("tuple in augmented assignment"),
                    target.span(),
                ));
            }
            self.advance();
            let value = self.parse_testlist()?;
            return Ok(self.alloc_stmt(StmtKind::AugAssign { target, op, value }, start));
        }

        if self.check(&TokenKind::Eq) {
            let mut targets = vec![self.expr_to_target(first)?];
            let mut value;
            loop {
                self.advance();
                if self.check(&TokenKind::Yield) {
                    return Err(self.error(ParseErrorKind::Unsupported("'yield'")));
                }
                value = self.parse_testlist()?;
                if !self.check(&TokenKind::Eq) {
                    break;
                }
                targets.push(self.expr_to_target(value)?);
            }
            return Ok(self.alloc_stmt(StmtKind::Assign { targets, value }, start));
        }

        Ok(self.alloc_stmt(StmtKind::Expr(first), start))
    }

    fn match_augmented_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::DoubleStarEq => Some(BinaryOp::Pow),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            TokenKind::DoubleSlashEq => Some(BinaryOp::FloorDiv),
            TokenKind::PercentEq => Some(BinaryOp::Mod),
            TokenKind::AmpEq => Some(BinaryOp::BitAnd),
            TokenKind::PipeEq => Some(BinaryOp::BitOr),
            TokenKind::CaretEq => Some(BinaryOp::BitXor),
            TokenKind::ShlEq => Some(BinaryOp::Shl),
            TokenKind::ShrEq => Some(BinaryOp::Shr),
            _ => None,
        }
    }
}
