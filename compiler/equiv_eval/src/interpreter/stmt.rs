//! Statement execution.

use equiv_ir::{StmtId, StmtKind};
use equiv_stack::ensure_sufficient_stack;

use super::{Flow, Interpreter};
use crate::errors::{type_error, EvalError, EvalErrorKind, EvalResult};
use crate::format;
use crate::value::Value;

impl Interpreter<'_> {
    pub(crate) fn exec_block(&mut self, body: &[StmtId]) -> EvalResult<Flow> {
        for &id in body {
            match self.exec(id)? {
                Flow::Next => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Next)
    }

    fn exec(&mut self, id: StmtId) -> EvalResult<Flow> {
        let span = self.arena.stmt(id).span;
        ensure_sufficient_stack(|| {
            self.tick()?;
            self.exec_inner(id)
        })
        .map_err(|e| e.or_span(span))
    }

    fn exec_inner(&mut self, id: StmtId) -> EvalResult<Flow> {
        let arena = self.arena;
        match &arena.stmt(id).kind {
            StmtKind::FunctionDef(fid) => {
                let function = self.make_function(*fid)?;
                self.store_name(arena.function(*fid).name, function);
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(e) => self.eval(*e)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Expr(e) => {
                self.eval(*e)?;
            }
            StmtKind::Assign { targets, value } => {
                let value = self.eval(*value)?;
                for target in targets {
                    self.assign(target, value.clone())?;
                }
            }
            StmtKind::AugAssign { target, op, value } => {
                self.aug_assign(target, *op, *value)?;
            }
            StmtKind::If { cond, body, orelse } => {
                let branch = if self.eval(*cond)?.is_truthy() { body } else { orelse };
                return self.exec_block(branch);
            }
            StmtKind::While { cond, body } => {
                while self.eval(*cond)?.is_truthy() {
                    self.tick()?;
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Next | Flow::Continue => {}
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
            }
            StmtKind::For { target, iter, body } => {
                let mut items = self.eval(*iter)?.iter()?;
                while let Some(item) = items.next() {
                    self.tick()?;
                    self.assign(target, item)?;
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Next | Flow::Continue => {}
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
            }
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::Pass => {}
            StmtKind::Assert { cond, message } => {
                if !self.eval(*cond)?.is_truthy() {
                    let message = match message {
                        Some(m) => {
                            let message = self.eval(*m)?;
                            Some(format::str_checked(&message, self.budget_mut())?)
                        }
                        None => None,
                    };
                    return Err(EvalError::new(EvalErrorKind::Assertion(message)));
                }
            }
            StmtKind::Raise(value) => {
                return Err(match value {
                    // Exception classes are not in any capability set, so
                    // evaluating one fails with NameError first.
                    Some(e) => {
                        self.eval(*e)?;
                        type_error("exceptions must derive from BaseException")
                    }
                    None => EvalError::new(EvalErrorKind::Runtime(
                        "No active exception to reraise".to_owned(),
                    )),
                });
            }
            StmtKind::Delete(targets) => {
                for target in targets {
                    self.delete(target)?;
                }
            }
            StmtKind::Import { .. } => return Err(EvalErrorKind::Import.into()),
        }
        Ok(Flow::Next)
    }
}
