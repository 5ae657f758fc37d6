//! Assignment targets, subscripts and slices.

use equiv_ir::{BinaryOp, ExprId, ExprKind, Target};

use super::Interpreter;
use crate::errors::{
    index_error, key_error, type_error, undefined_name, value_error, EvalError, EvalErrorKind,
    EvalResult,
};
use crate::operators::binary_op;
use crate::value::{HashKey, RangeValue, Value};

/// Evaluated `lower:upper:step`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SliceBounds {
    lower: Option<i64>,
    upper: Option<i64>,
    step: i64,
}

impl SliceBounds {
    /// Resolved `(start, stop, step)` for a sequence of `len` items,
    /// clamped the way Python clamps slice indices.
    fn indices(self, len: usize) -> (i64, i64, i64) {
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let step = self.step;
        let clamp = |bound: Option<i64>, default: i64| -> i64 {
            let Some(mut i) = bound else {
                return default;
            };
            if i < 0 {
                i = i.saturating_add(len);
                if i < 0 {
                    i = if step < 0 { -1 } else { 0 };
                }
            } else if i >= len {
                i = if step < 0 { len - 1 } else { len };
            }
            i
        };
        if step > 0 {
            (clamp(self.lower, 0), clamp(self.upper, len), step)
        } else {
            (clamp(self.lower, len - 1), clamp(self.upper, -1), step)
        }
    }

    /// Positions selected from a sequence of `len` items.
    fn positions(self, len: usize) -> Vec<usize> {
        let (start, stop, step) = self.indices(len);
        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            if let Ok(p) = usize::try_from(i) {
                out.push(p);
            }
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        out
    }
}

fn seq_index(index: &Value, len: usize, type_name: &str) -> EvalResult<Option<usize>> {
    let Some(i) = index.as_int() else {
        return Err(type_error(format!(
            "{type_name} indices must be integers or slices, not {}",
            index.type_name()
        )));
    };
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let i = if i < 0 { i.saturating_add(len) } else { i };
    Ok(if (0..len).contains(&i) {
        usize::try_from(i).ok()
    } else {
        None
    })
}

impl Interpreter<'_> {
    /// The bounds of a subscript index that is a slice.
    pub(crate) fn slice_parts(
        &self,
        index: ExprId,
    ) -> Option<(Option<ExprId>, Option<ExprId>, Option<ExprId>)> {
        match self.arena.expr(index).kind {
            ExprKind::Slice { lower, upper, step } => Some((lower, upper, step)),
            _ => None,
        }
    }

    pub(crate) fn eval_slice(
        &mut self,
        lower: Option<ExprId>,
        upper: Option<ExprId>,
        step: Option<ExprId>,
    ) -> EvalResult<SliceBounds> {
        let mut bound = |e: Option<ExprId>| -> EvalResult<Option<i64>> {
            let Some(e) = e else { return Ok(None) };
            match self.eval(e)? {
                Value::None => Ok(None),
                v => v.as_int().map(Some).ok_or_else(|| {
                    type_error(
                        "slice indices must be integers or None or have an __index__ method",
                    )
                }),
            }
        };
        let lower = bound(lower)?;
        let upper = bound(upper)?;
        let step = bound(step)?.unwrap_or(1);
        if step == 0 {
            return Err(value_error("slice step cannot be zero"));
        }
        Ok(SliceBounds { lower, upper, step })
    }

    pub(crate) fn get_item(&mut self, object: &Value, index: &Value) -> EvalResult {
        match object {
            Value::List(items) => {
                let items = items.borrow();
                seq_index(index, items.len(), "list")?
                    .map(|i| items[i].clone())
                    .ok_or_else(|| index_error("list index out of range"))
            }
            Value::Tuple(items) => seq_index(index, items.len(), "tuple")?
                .map(|i| items[i].clone())
                .ok_or_else(|| index_error("tuple index out of range")),
            Value::Str(s) => {
                let len = s.chars().count();
                seq_index(index, len, "string")?
                    .and_then(|i| s.chars().nth(i))
                    .map(Value::char)
                    .ok_or_else(|| index_error("string index out of range"))
            }
            Value::Range(r) => {
                let len = usize::try_from(r.len()).unwrap_or(usize::MAX);
                seq_index(index, len, "range")?
                    .and_then(|i| i64::try_from(i).ok())
                    .map(|i| Value::Int(r.at(i)))
                    .ok_or_else(|| index_error("range object index out of range"))
            }
            Value::Dict(d) => {
                let hash = HashKey::from_value(index)?;
                d.borrow()
                    .get(&hash)
                    .cloned()
                    .ok_or_else(|| key_error(index))
            }
            other => Err(type_error(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }

    pub(crate) fn get_slice(&mut self, object: &Value, bounds: SliceBounds) -> EvalResult {
        match object {
            Value::List(items) => {
                let items = items.borrow();
                let picked = bounds.positions(items.len());
                Ok(Value::list(picked.into_iter().map(|i| items[i].clone()).collect()))
            }
            Value::Tuple(items) => {
                let picked = bounds.positions(items.len());
                Ok(Value::tuple(picked.into_iter().map(|i| items[i].clone()).collect()))
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let picked = bounds.positions(chars.len());
                Ok(Value::str(&picked.into_iter().map(|i| chars[i]).collect::<String>()))
            }
            Value::Range(r) => {
                let len = usize::try_from(r.len()).unwrap_or(usize::MAX);
                let (start, stop, step) = bounds.indices(len);
                Ok(Value::Range(RangeValue {
                    start: r.at(start),
                    stop: r.start.saturating_add(stop.saturating_mul(r.step)),
                    step: r.step.saturating_mul(step),
                }))
            }
            other => Err(type_error(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }

    fn set_item(&mut self, object: &Value, index: &Value, value: Value) -> EvalResult<()> {
        match object {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let i = seq_index(index, items.len(), "list")?
                    .ok_or_else(|| index_error("list assignment index out of range"))?;
                items[i] = value;
                Ok(())
            }
            Value::Dict(d) => d.borrow_mut().insert_value(index.clone(), value),
            other => Err(type_error(format!(
                "'{}' object does not support item assignment",
                other.type_name()
            ))),
        }
    }

    fn set_slice(&mut self, object: &Value, bounds: SliceBounds, value: &Value) -> EvalResult<()> {
        let Value::List(list) = object else {
            return Err(type_error(format!(
                "'{}' object does not support item assignment",
                object.type_name()
            )));
        };
        let replacement = self.collect(value)?;
        let mut items = list.borrow_mut();
        if bounds.step == 1 {
            let (start, stop, _) = bounds.indices(items.len());
            let start = usize::try_from(start).unwrap_or(0);
            let stop = usize::try_from(stop).unwrap_or(0).max(start);
            items.splice(start..stop, replacement);
            return Ok(());
        }
        let picked = bounds.positions(items.len());
        if picked.len() != replacement.len() {
            return Err(value_error(format!(
                "attempt to assign sequence of size {} to extended slice of size {}",
                replacement.len(),
                picked.len()
            )));
        }
        for (i, v) in picked.into_iter().zip(replacement) {
            items[i] = v;
        }
        Ok(())
    }

    /// Bind `value` to `target`.
    pub(crate) fn assign(&mut self, target: &Target, value: Value) -> EvalResult<()> {
        match target {
            Target::Name(name, _) => {
                self.store_name(*name, value);
                Ok(())
            }
            Target::Tuple(targets, span) => {
                let items = self.collect(&value).map_err(|e| match e.kind {
                    EvalErrorKind::Type(_) => type_error(format!(
                        "cannot unpack non-iterable {} object",
                        value.type_name()
                    )),
                    _ => e,
                })?;
                if items.len() != targets.len() {
                    let message = if items.len() < targets.len() {
                        format!(
                            "not enough values to unpack (expected {}, got {})",
                            targets.len(),
                            items.len()
                        )
                    } else {
                        format!("too many values to unpack (expected {})", targets.len())
                    };
                    return Err(value_error(message).or_span(*span));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign(target, item)?;
                }
                Ok(())
            }
            Target::Subscript { object, index, .. } => {
                let object = self.eval(*object)?;
                if let Some((lower, upper, step)) = self.slice_parts(*index) {
                    let bounds = self.eval_slice(lower, upper, step)?;
                    return self.set_slice(&object, bounds, &value);
                }
                let index = self.eval(*index)?;
                self.set_item(&object, &index, value)
            }
        }
    }

    /// `target op= value`. Lists, sets and dicts are updated in place.
    pub(crate) fn aug_assign(&mut self, target: &Target, op: BinaryOp, value: ExprId) -> EvalResult<()> {
        match target {
            Target::Name(name, _) => {
                let current = self.load_name(*name)?;
                let rhs = self.eval(value)?;
                let result = self.inplace_op(op, current, &rhs)?;
                self.store_name(*name, result);
                Ok(())
            }
            Target::Subscript { object, index, .. } => {
                let object = self.eval(*object)?;
                if let Some((lower, upper, step)) = self.slice_parts(*index) {
                    let bounds = self.eval_slice(lower, upper, step)?;
                    let current = self.get_slice(&object, bounds)?;
                    let rhs = self.eval(value)?;
                    let result = self.inplace_op(op, current, &rhs)?;
                    return self.set_slice(&object, bounds, &result);
                }
                let index = self.eval(*index)?;
                let current = self.get_item(&object, &index)?;
                let rhs = self.eval(value)?;
                let result = self.inplace_op(op, current, &rhs)?;
                self.set_item(&object, &index, result)
            }
            Target::Tuple(_, span) => Err(EvalError::new(EvalErrorKind::Internal(
                "illegal expression for augmented assignment".to_owned(),
            ))
            .or_span(*span)),
        }
    }

    fn inplace_op(&mut self, op: BinaryOp, current: Value, rhs: &Value) -> EvalResult {
        match (&current, op, rhs) {
            (Value::List(list), BinaryOp::Add, _) => {
                let items = self.collect(rhs)?;
                list.borrow_mut().extend(items);
                Ok(current.clone())
            }
            (Value::List(list), BinaryOp::Mul, _) => {
                if let Value::List(repeated) = binary_op(op, &current, rhs)? {
                    let items = repeated.borrow().clone();
                    *list.borrow_mut() = items;
                }
                Ok(current.clone())
            }
            (
                Value::Set(set),
                BinaryOp::BitOr | BinaryOp::BitAnd | BinaryOp::BitXor | BinaryOp::Sub,
                Value::Set(_),
            ) => {
                if let Value::Set(result) = binary_op(op, &current, rhs)? {
                    let result = result.borrow().clone();
                    *set.borrow_mut() = result;
                }
                Ok(current.clone())
            }
            (Value::Dict(dict), BinaryOp::BitOr, Value::Dict(other)) => {
                let entries: Vec<(Value, Value)> = other
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                for (k, v) in entries {
                    dict.borrow_mut().insert_value(k, v)?;
                }
                Ok(current.clone())
            }
            _ => binary_op(op, &current, rhs),
        }
    }

    /// `del target`.
    pub(crate) fn delete(&mut self, target: &Target) -> EvalResult<()> {
        match target {
            Target::Name(name, _) => {
                let removed = self.scope.borrow_mut().remove(*name);
                if removed {
                    return Ok(());
                }
                self.load_name(*name)?;
                Err(undefined_name(self.name_text(*name)))
            }
            Target::Tuple(targets, _) => {
                for target in targets {
                    self.delete(target)?;
                }
                Ok(())
            }
            Target::Subscript { object, index, .. } => {
                let object = self.eval(*object)?;
                if let Some((lower, upper, step)) = self.slice_parts(*index) {
                    let bounds = self.eval_slice(lower, upper, step)?;
                    let Value::List(list) = &object else {
                        return Err(type_error(format!(
                            "'{}' object does not support item deletion",
                            object.type_name()
                        )));
                    };
                    let mut items = list.borrow_mut();
                    let mut picked = bounds.positions(items.len());
                    picked.sort_unstable();
                    for i in picked.into_iter().rev() {
                        items.remove(i);
                    }
                    return Ok(());
                }
                let index = self.eval(*index)?;
                match &object {
                    Value::List(list) => {
                        let mut items = list.borrow_mut();
                        let i = seq_index(&index, items.len(), "list")?
                            .ok_or_else(|| index_error("list assignment index out of range"))?;
                        items.remove(i);
                        Ok(())
                    }
                    Value::Dict(d) => {
                        let hash = HashKey::from_value(&index)?;
                        match d.borrow_mut().remove(&hash) {
                            Some(_) => Ok(()),
                            None => Err(key_error(&index)),
                        }
                    }
                    other => Err(type_error(format!(
                        "'{}' object does not support item deletion",
                        other.type_name()
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SliceBounds;

    fn bounds(lower: Option<i64>, upper: Option<i64>, step: i64) -> SliceBounds {
        SliceBounds { lower, upper, step }
    }

    #[test]
    fn slice_positions_follow_python_clamping() {
        assert_eq!(bounds(None, None, 1).positions(4), vec![0, 1, 2, 3]);
        assert_eq!(bounds(Some(1), Some(-1), 1).positions(4), vec![1, 2]);
        assert_eq!(bounds(None, None, -1).positions(4), vec![3, 2, 1, 0]);
        assert_eq!(bounds(Some(-10), Some(10), 2).positions(5), vec![0, 2, 4]);
        assert_eq!(bounds(Some(10), None, -2).positions(5), vec![4, 2, 0]);
        assert!(bounds(Some(3), Some(1), 1).positions(5).is_empty());
    }
}
