//! Arithmetic, comparison and membership semantics.
//!
//! Integers are 64-bit and checked: a result that would need a wider integer
//! raises `OverflowError` instead of wrapping.

use std::cmp::Ordering;
use std::rc::Rc;

use equiv_ir::{BinaryOp, CmpOp, UnaryOp};
use equiv_stack::ensure_sufficient_stack;

use crate::builtins::Builtin;
use crate::errors::{
    not_orderable, overflow, too_large, type_error, unsupported_operands, value_error, EvalError,
    EvalErrorKind, EvalResult,
};
use crate::interpreter::MAX_SEQUENCE_LEN;
use crate::value::{Dict, HashKey, Set, Value};

/// Nesting depth at which structural comparison gives up.
const MAX_COMPARE_DEPTH: usize = 1000;

/// Element pairs one structural comparison may visit.
const MAX_COMPARE_NODES: usize = 10_000_000;

fn zero_division(message: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::ZeroDivision(message))
}

fn float_overflow() -> EvalError {
    EvalError::new(EvalErrorKind::Overflow(
        "(34, 'Numerical result out of range')".to_owned(),
    ))
}

/// Both operands as integers, when neither is a float.
fn int_pair(l: &Value, r: &Value) -> Option<(i64, i64)> {
    Some((l.as_int()?, r.as_int()?))
}

/// Both operands as floats, when at least one is numeric and neither is
/// anything else.
fn float_pair(l: &Value, r: &Value) -> Option<(f64, f64)> {
    Some((l.as_f64()?, r.as_f64()?))
}

pub fn binary_op(op: BinaryOp, l: &Value, r: &Value) -> EvalResult {
    let unsupported = || unsupported_operands(op.as_symbol(), l.type_name(), r.type_name());
    match op {
        BinaryOp::Add => add(l, r),
        BinaryOp::Sub => {
            if let Some((a, b)) = int_pair(l, r) {
                return a.checked_sub(b).map(Value::Int).ok_or_else(overflow);
            }
            if let (Value::Set(a), Value::Set(b)) = (l, r) {
                let (a, b) = (a.borrow(), b.borrow());
                return Ok(set_from(a.iter_hashed().filter(|(h, _)| !b.contains(h))));
            }
            float_pair(l, r)
                .map(|(a, b)| Value::Float(a - b))
                .ok_or_else(unsupported)
        }
        BinaryOp::Mul => mul(l, r),
        BinaryOp::Div => {
            let (a, b) = float_pair(l, r).ok_or_else(unsupported)?;
            if b == 0.0 {
                let message = if int_pair(l, r).is_some() {
                    "division by zero"
                } else {
                    "float division by zero"
                };
                return Err(zero_division(message));
            }
            Ok(Value::Float(a / b))
        }
        BinaryOp::FloorDiv => {
            if let Some((a, b)) = int_pair(l, r) {
                return int_floor_div(a, b).map(Value::Int);
            }
            let (a, b) = float_pair(l, r).ok_or_else(unsupported)?;
            if b == 0.0 {
                return Err(zero_division("float floor division by zero"));
            }
            Ok(Value::Float(float_div_mod(a, b).0))
        }
        BinaryOp::Mod => {
            if let Some((a, b)) = int_pair(l, r) {
                return int_mod(a, b).map(Value::Int);
            }
            let (a, b) = float_pair(l, r).ok_or_else(unsupported)?;
            if b == 0.0 {
                return Err(zero_division("float modulo"));
            }
            Ok(Value::Float(float_div_mod(a, b).1))
        }
        BinaryOp::Pow => pow(l, r),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => bitwise(op, l, r),
        BinaryOp::Shl | BinaryOp::Shr => {
            let (a, n) = int_pair(l, r).ok_or_else(unsupported)?;
            if n < 0 {
                return Err(value_error("negative shift count"));
            }
            if op == BinaryOp::Shr {
                return Ok(Value::Int(if n >= 64 { a >> 63 } else { a >> n }));
            }
            if a == 0 {
                return Ok(Value::Int(0));
            }
            let n = u32::try_from(n).map_err(|_| overflow())?;
            if n >= 64 {
                return Err(overflow());
            }
            let shifted = a << n;
            if shifted >> n == a {
                Ok(Value::Int(shifted))
            } else {
                Err(overflow())
            }
        }
    }
}

/// `**` on finite floats raises instead of returning an infinity.
fn finite(result: f64, a: f64, b: f64) -> EvalResult {
    if result.is_infinite() && a.is_finite() && b.is_finite() {
        Err(float_overflow())
    } else {
        Ok(Value::Float(result))
    }
}

fn add(l: &Value, r: &Value) -> EvalResult {
    if let Some((a, b)) = int_pair(l, r) {
        return a.checked_add(b).map(Value::Int).ok_or_else(overflow);
    }
    if let Some((a, b)) = float_pair(l, r) {
        return Ok(Value::Float(a + b));
    }
    let joined_len = |a: usize, b: usize, what: &str| -> EvalResult<usize> {
        a.checked_add(b)
            .filter(|&n| n <= MAX_SEQUENCE_LEN)
            .ok_or_else(|| too_large(what))
    };
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => {
            joined_len(a.len(), b.len(), "string")?;
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Ok(Value::Str(Rc::from(s)))
        }
        (Value::List(a), Value::List(b)) => {
            joined_len(a.borrow().len(), b.borrow().len(), "list")?;
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (Value::Tuple(a), Value::Tuple(b)) => {
            joined_len(a.len(), b.len(), "tuple")?;
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Str(_) | Value::List(_) | Value::Tuple(_), _) => Err(type_error(format!(
            "can only concatenate {} (not \"{}\") to {}",
            l.type_name(),
            r.type_name(),
            l.type_name()
        ))),
        _ => Err(unsupported_operands("+", l.type_name(), r.type_name())),
    }
}

fn mul(l: &Value, r: &Value) -> EvalResult {
    if let Some((a, b)) = int_pair(l, r) {
        return a.checked_mul(b).map(Value::Int).ok_or_else(overflow);
    }
    if let Some((a, b)) = float_pair(l, r) {
        return Ok(Value::Float(a * b));
    }
    let (seq, count) = match (l.as_int(), r.as_int()) {
        (_, Some(n)) if is_sequence(l) => (l, n),
        (Some(n), _) if is_sequence(r) => (r, n),
        _ if is_sequence(l) || is_sequence(r) => {
            let other = if is_sequence(l) { r } else { l };
            return Err(type_error(format!(
                "can't multiply sequence by non-int of type '{}'",
                other.type_name()
            )));
        }
        _ => return Err(unsupported_operands("*", l.type_name(), r.type_name())),
    };
    let count = usize::try_from(count).unwrap_or(0);
    let repeat_len = |len: usize| -> EvalResult<usize> {
        len.checked_mul(count)
            .filter(|&n| n <= MAX_SEQUENCE_LEN)
            .ok_or_else(|| too_large("repeated sequence"))
    };
    match seq {
        Value::Str(s) => {
            repeat_len(s.len())?;
            Ok(Value::str(&s.repeat(count)))
        }
        Value::List(items) => {
            let items = items.borrow();
            let mut out = Vec::with_capacity(repeat_len(items.len())?);
            for _ in 0..count {
                out.extend(items.iter().cloned());
            }
            Ok(Value::list(out))
        }
        Value::Tuple(items) => {
            let mut out = Vec::with_capacity(repeat_len(items.len())?);
            for _ in 0..count {
                out.extend(items.iter().cloned());
            }
            Ok(Value::tuple(out))
        }
        _ => Err(unsupported_operands("*", l.type_name(), r.type_name())),
    }
}

fn is_sequence(v: &Value) -> bool {
    matches!(v, Value::Str(_) | Value::List(_) | Value::Tuple(_))
}

fn int_floor_div(a: i64, b: i64) -> EvalResult<i64> {
    if b == 0 {
        return Err(zero_division("integer division or modulo by zero"));
    }
    let q = a.checked_div(b).ok_or_else(overflow)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn int_mod(a: i64, b: i64) -> EvalResult<i64> {
    if b == 0 {
        return Err(zero_division("integer modulo by zero"));
    }
    let r = a.checked_rem(b).unwrap_or(0);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

/// Floor quotient and remainder of floats; the remainder takes the sign of
/// the divisor.
fn float_div_mod(a: f64, b: f64) -> (f64, f64) {
    let mut rem = a % b;
    if rem != 0.0 {
        if (b < 0.0) != (rem < 0.0) {
            rem += b;
        }
    } else {
        rem = 0.0f64.copysign(b);
    }
    let div = (a - rem) / b;
    let floor = if div == 0.0 {
        0.0f64.copysign(a / b)
    } else {
        let mut f = div.floor();
        if div - f > 0.5 {
            f += 1.0;
        }
        f
    };
    (floor, rem)
}

fn pow(l: &Value, r: &Value) -> EvalResult {
    if let Some((base, exp)) = int_pair(l, r) {
        if exp >= 0 {
            return match (base, u32::try_from(exp)) {
                (_, Ok(e)) => base.checked_pow(e).map(Value::Int).ok_or_else(overflow),
                (0 | 1, Err(_)) => Ok(Value::Int(base)),
                (-1, Err(_)) => Ok(Value::Int(if exp % 2 == 0 { 1 } else { -1 })),
                (_, Err(_)) => Err(overflow()),
            };
        }
        if base == 0 {
            return Err(zero_division("0.0 cannot be raised to a negative power"));
        }
    }
    let (a, b) = float_pair(l, r)
        .ok_or_else(|| unsupported_operands("** or pow()", l.type_name(), r.type_name()))?;
    if a == 0.0 && b < 0.0 {
        return Err(zero_division("0.0 cannot be raised to a negative power"));
    }
    if a < 0.0 && b.fract() != 0.0 && b.is_finite() {
        return Err(value_error(
            "negative number cannot be raised to a fractional power",
        ));
    }
    finite(a.powf(b), a, b)
}

fn bitwise(op: BinaryOp, l: &Value, r: &Value) -> EvalResult {
    if let (Value::Bool(a), Value::Bool(b)) = (l, r) {
        return Ok(Value::Bool(match op {
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            _ => a ^ b,
        }));
    }
    if let Some((a, b)) = int_pair(l, r) {
        return Ok(Value::Int(match op {
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            _ => a ^ b,
        }));
    }
    match (l, r) {
        (Value::Set(a), Value::Set(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            Ok(match op {
                BinaryOp::BitAnd => set_from(a.iter_hashed().filter(|(h, _)| b.contains(h))),
                BinaryOp::BitOr => set_from(a.iter_hashed().chain(b.iter_hashed())),
                _ => set_from(
                    a.iter_hashed()
                        .filter(|(h, _)| !b.contains(h))
                        .chain(b.iter_hashed().filter(|(h, _)| !a.contains(h))),
                ),
            })
        }
        (Value::Dict(a), Value::Dict(b)) if op == BinaryOp::BitOr => {
            let mut merged: Dict = a.borrow().clone();
            for (hash, key, value) in b.borrow().iter_hashed() {
                merged.insert(hash.clone(), key.clone(), value.clone());
            }
            Ok(Value::dict(merged))
        }
        _ => Err(unsupported_operands(
            op.as_symbol(),
            l.type_name(),
            r.type_name(),
        )),
    }
}

fn set_from<'a>(items: impl Iterator<Item = (&'a HashKey, &'a Value)>) -> Value {
    let mut set = Set::new();
    for (hash, value) in items {
        set.insert(hash.clone(), value.clone());
    }
    Value::set(set)
}

pub fn unary_op(op: UnaryOp, v: &Value) -> EvalResult {
    let bad = || {
        type_error(format!(
            "bad operand type for unary {}: '{}'",
            op.as_symbol(),
            v.type_name()
        ))
    };
    match op {
        UnaryOp::Not => Ok(Value::Bool(!v.is_truthy())),
        UnaryOp::Neg => match v {
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => {
                let i = v.as_int().ok_or_else(bad)?;
                i.checked_neg().map(Value::Int).ok_or_else(overflow)
            }
        },
        UnaryOp::Pos => match v {
            Value::Float(f) => Ok(Value::Float(*f)),
            _ => v.as_int().map(Value::Int).ok_or_else(bad),
        },
        UnaryOp::Invert => v.as_int().map(|i| Value::Int(!i)).ok_or_else(bad),
    }
}

/// Exact comparison of an integer with a float.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f >= 9_223_372_036_854_775_808.0 {
        return Some(Ordering::Less);
    }
    if f < -9_223_372_036_854_775_808.0 {
        return Some(Ordering::Greater);
    }
    let floor = f.floor();
    match i.cmp(&(floor as i64)) {
        Ordering::Equal if f > floor => Some(Ordering::Less),
        ord => Some(ord),
    }
}

fn cmp_numbers(l: &Value, r: &Value) -> Option<Option<Ordering>> {
    Some(match (l, r) {
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Float(a), other) => cmp_int_float(other.as_int()?, *a).map(Ordering::reverse),
        (other, Value::Float(b)) => cmp_int_float(other.as_int()?, *b),
        _ => Some(l.as_int()?.cmp(&r.as_int()?)),
    })
}

/// Python `==`.
pub fn py_eq(l: &Value, r: &Value) -> EvalResult<bool> {
    eq_at(l, r, 0, &mut 0)
}

/// Count one visited pair against [`MAX_COMPARE_NODES`].
fn visit(visited: &mut usize) -> EvalResult<()> {
    *visited += 1;
    if *visited > MAX_COMPARE_NODES {
        return Err(EvalError::new(EvalErrorKind::Timeout(format!(
            "comparison visited more than {MAX_COMPARE_NODES} elements"
        ))));
    }
    Ok(())
}

fn eq_at(l: &Value, r: &Value, depth: usize, visited: &mut usize) -> EvalResult<bool> {
    if depth > MAX_COMPARE_DEPTH {
        return Err(EvalErrorKind::Recursion.into());
    }
    visit(visited)?;
    if let Some(ord) = cmp_numbers(l, r) {
        return Ok(ord == Some(Ordering::Equal));
    }
    ensure_sufficient_stack(|| {
        Ok(match (l, r) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || seq_eq(&a.borrow(), &b.borrow(), depth, visited)?
            }
            (Value::Tuple(a), Value::Tuple(b)) => {
                Rc::ptr_eq(a, b) || seq_eq(a, b, depth, visited)?
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (hash, _, value) in a.iter_hashed() {
                    match b.get(hash) {
                        Some(other) if eq_at(value, other, depth + 1, visited)? => {}
                        _ => return Ok(false),
                    }
                }
                true
            }
            (Value::Set(a), Value::Set(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter_hashed().all(|(h, _)| b.contains(h))
            }
            (Value::Range(_), Value::Range(_)) => {
                HashKey::from_value(l)? == HashKey::from_value(r)?
            }
            _ => l.is_same(r),
        })
    })
}

fn seq_eq(a: &[Value], b: &[Value], depth: usize, visited: &mut usize) -> EvalResult<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !eq_at(x, y, depth + 1, visited)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Order two values for `<`-style operators and sorting.
///
/// `Ok(None)` means the values are unordered (NaN). Values of unrelated
/// types raise `TypeError` naming `op`.
pub fn compare_values(l: &Value, r: &Value, op: &str) -> EvalResult<Option<Ordering>> {
    order_at(l, r, op, 0, &mut 0)
}

fn order_at(
    l: &Value,
    r: &Value,
    op: &str,
    depth: usize,
    visited: &mut usize,
) -> EvalResult<Option<Ordering>> {
    if depth > MAX_COMPARE_DEPTH {
        return Err(EvalErrorKind::Recursion.into());
    }
    visit(visited)?;
    if let Some(ord) = cmp_numbers(l, r) {
        return Ok(ord);
    }
    ensure_sufficient_stack(|| match (l, r) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            seq_order(&a.borrow(), &b.borrow(), op, depth, visited)
        }
        (Value::Tuple(a), Value::Tuple(b)) => seq_order(a, b, op, depth, visited),
        _ => Err(not_orderable(op, l.type_name(), r.type_name())),
    })
}

/// Lexicographic order: the first unequal pair decides, then length.
fn seq_order(
    a: &[Value],
    b: &[Value],
    op: &str,
    depth: usize,
    visited: &mut usize,
) -> EvalResult<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if !eq_at(x, y, depth + 1, visited)? {
            return order_at(x, y, op, depth + 1, visited);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

fn is_subset(a: &Set, b: &Set) -> bool {
    a.len() <= b.len() && a.iter_hashed().all(|(h, _)| b.contains(h))
}

/// Evaluate one link of a comparison chain.
pub fn compare(op: CmpOp, l: &Value, r: &Value) -> EvalResult<bool> {
    match op {
        CmpOp::Eq => py_eq(l, r),
        CmpOp::NotEq => py_eq(l, r).map(|eq| !eq),
        CmpOp::Is => Ok(l.is_same(r)),
        CmpOp::IsNot => Ok(!l.is_same(r)),
        CmpOp::In => contains(r, l),
        CmpOp::NotIn => contains(r, l).map(|found| !found),
        CmpOp::Lt | CmpOp::LtEq | CmpOp::Gt | CmpOp::GtEq => {
            if let (Value::Set(a), Value::Set(b)) = (l, r) {
                let (a, b) = (a.borrow(), b.borrow());
                return Ok(match op {
                    CmpOp::Lt => a.len() < b.len() && is_subset(&a, &b),
                    CmpOp::LtEq => is_subset(&a, &b),
                    CmpOp::Gt => b.len() < a.len() && is_subset(&b, &a),
                    _ => is_subset(&b, &a),
                });
            }
            let Some(ord) = compare_values(l, r, op.as_symbol())? else {
                return Ok(false);
            };
            Ok(match op {
                CmpOp::Lt => ord == Ordering::Less,
                CmpOp::LtEq => ord != Ordering::Greater,
                CmpOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            })
        }
    }
}

/// Python `item in container`.
pub fn contains(container: &Value, item: &Value) -> EvalResult<bool> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(&**needle)),
            other => Err(type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) => {
            let mut index = 0;
            loop {
                let Some(candidate) = items.borrow().get(index).cloned() else {
                    return Ok(false);
                };
                if py_eq(&candidate, item)? {
                    return Ok(true);
                }
                index += 1;
            }
        }
        Value::Tuple(items) => {
            for candidate in items.iter() {
                if py_eq(candidate, item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Dict(d) => Ok(d.borrow().contains(&HashKey::from_value(item)?)),
        Value::Set(s) => Ok(s.borrow().contains(&HashKey::from_value(item)?)),
        Value::Range(r) => Ok(match HashKey::from_value(item) {
            Ok(HashKey::Int(n)) => r.contains(n),
            _ => false,
        }),
        Value::Iterator(_) => {
            let mut iter = container.iter()?;
            while let Some(candidate) = iter.next() {
                if py_eq(&candidate, item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        other => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// `isinstance(value, kind)` where `kind` is a type or a tuple of types.
pub fn isinstance(value: &Value, kind: &Value) -> EvalResult<bool> {
    match kind {
        Value::Builtin(b) if b.is_type() => Ok(instance_of(value, *b)),
        Value::Tuple(kinds) => {
            for k in kinds.iter() {
                if isinstance(value, k)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(type_error(
            "isinstance() arg 2 must be a type, a tuple of types, or a union",
        )),
    }
}

fn instance_of(value: &Value, kind: Builtin) -> bool {
    match (kind, value) {
        (Builtin::Int, Value::Int(_) | Value::Bool(_))
        | (Builtin::Bool, Value::Bool(_))
        | (Builtin::Float, Value::Float(_))
        | (Builtin::Str, Value::Str(_))
        | (Builtin::List, Value::List(_))
        | (Builtin::Tuple, Value::Tuple(_))
        | (Builtin::Dict, Value::Dict(_))
        | (Builtin::Set, Value::Set(_))
        | (Builtin::Range, Value::Range(_)) => true,
        (_, Value::Iterator(it)) => it.label == kind.name(),
        _ => false,
    }
}

#[cfg(test)]
mod tests;
