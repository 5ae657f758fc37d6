//! Expression evaluation.

use equiv_ir::{BoolOp, CallArg, ExprId, ExprKind};
use equiv_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::builtins::Args;
use crate::errors::{type_error, EvalResult};
use crate::methods::get_attribute;
use crate::operators::{binary_op, compare, unary_op};
use crate::value::{Dict, Set, Value};

impl Interpreter<'_> {
    /// Evaluate an expression. Errors raised without a location take the
    /// span of the innermost expression that saw them.
    pub(crate) fn eval(&mut self, id: ExprId) -> EvalResult {
        let span = self.arena.expr(id).span;
        ensure_sufficient_stack(|| self.eval_inner(id)).map_err(|e| e.or_span(span))
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let arena = self.arena;
        match &arena.expr(id).kind {
            ExprKind::Int(i) => Ok(Value::Int(*i)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(name) => Ok(Value::Str(self.interner.lookup_rc(*name))),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::None => Ok(Value::None),
            ExprKind::Ident(name) => self.load_name(*name),

            ExprKind::List(items) => Ok(Value::list(self.eval_all(items)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            ExprKind::Set(items) => {
                let mut set = Set::new();
                for &item in items {
                    let value = self.eval(item)?;
                    set.insert_value(value)?;
                }
                Ok(Value::set(set))
            }
            ExprKind::Dict(entries) => {
                let mut dict = Dict::new();
                for &(k, v) in entries {
                    let key = self.eval(k)?;
                    let value = self.eval(v)?;
                    dict.insert_value(key, value)?;
                }
                Ok(Value::dict(dict))
            }

            ExprKind::Binary { op, left, right } => {
                let l = self.eval(*left)?;
                let r = self.eval(*right)?;
                binary_op(*op, &l, &r)
            }
            ExprKind::Unary { op, operand } => {
                let v = self.eval(*operand)?;
                unary_op(*op, &v)
            }
            ExprKind::BoolOp { op, left, right } => {
                let l = self.eval(*left)?;
                let short = match op {
                    BoolOp::And => !l.is_truthy(),
                    BoolOp::Or => l.is_truthy(),
                };
                if short {
                    Ok(l)
                } else {
                    self.eval(*right)
                }
            }
            ExprKind::Compare { left, rest } => {
                let mut l = self.eval(*left)?;
                for &(op, right) in rest {
                    let r = self.eval(right)?;
                    if !compare(op, &l, &r)? {
                        return Ok(Value::Bool(false));
                    }
                    l = r;
                }
                Ok(Value::Bool(true))
            }

            ExprKind::Call { func, args } => {
                let callee = self.eval(*func)?;
                let args = self.eval_args(args)?;
                self.call_value(&callee, args)
            }
            ExprKind::Attribute { object, attr } => {
                let object = self.eval(*object)?;
                get_attribute(&object, self.name_text(*attr))
            }
            ExprKind::Subscript { object, index } => {
                let object = self.eval(*object)?;
                if let Some((lower, upper, step)) = self.slice_parts(*index) {
                    let bounds = self.eval_slice(lower, upper, step)?;
                    return self.get_slice(&object, bounds);
                }
                let index = self.eval(*index)?;
                self.get_item(&object, &index)
            }
            ExprKind::Slice { .. } => Err(type_error("slice is only valid as a subscript")),
            ExprKind::IfExp {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(*cond)?.is_truthy() {
                    self.eval(*then_branch)
                } else {
                    self.eval(*else_branch)
                }
            }
            ExprKind::Lambda(fid) => self.make_function(*fid),
            ExprKind::Comprehension(comp) => self.eval_comprehension(comp),
        }
    }

    fn eval_all(&mut self, items: &[ExprId]) -> EvalResult<Vec<Value>> {
        let mut out = Vec::with_capacity(items.len());
        for &item in items {
            out.push(self.eval(item)?);
        }
        Ok(out)
    }

    fn eval_args(&mut self, args: &[CallArg]) -> EvalResult<Args> {
        let mut out = Args::default();
        for arg in args {
            match arg {
                CallArg::Positional(e) => {
                    let value = self.eval(*e)?;
                    out.positional.push(value);
                }
                CallArg::Keyword(name, e) => {
                    let value = self.eval(*e)?;
                    let name = self.interner.lookup_rc(*name);
                    if out.keywords.iter().any(|(k, _)| *k == name) {
                        return Err(type_error(format!(
                            "keyword argument repeated: {name}"
                        )));
                    }
                    out.keywords.push((name, value));
                }
                CallArg::Star(e) => {
                    let iterable = self.eval(*e)?;
                    let items = self.collect(&iterable)?;
                    out.positional.extend(items);
                }
            }
        }
        Ok(out)
    }
}
