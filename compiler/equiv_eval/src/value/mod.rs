//! Runtime values.
//!
//! Containers are shared by reference (`Rc`) and mutated through `RefCell`,
//! which gives Python's aliasing semantics: `b = a; b.append(1)` is visible
//! through `a`. Values never leave the thread that created them; results are
//! converted to [`Datum`](crate::Datum) before returning to the host.

mod collections;
mod iter;

pub use collections::{Dict, HashKey, Set};
pub use iter::{IterValue, ValueIter};

use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use equiv_ir::{FunctionId, Name};

use crate::builtins::Builtin;
use crate::environment::Env;
use crate::errors::{not_iterable, EvalResult};

/// `range(start, stop, step)`; `step` is never zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeValue {
    /// Number of elements, saturating at `i64::MAX`.
    pub fn len(&self) -> i64 {
        let (start, stop, step) = (
            i128::from(self.start),
            i128::from(self.stop),
            i128::from(self.step),
        );
        let n = if step > 0 && start < stop {
            (stop - start - 1) / step + 1
        } else if step < 0 && start > stop {
            (start - stop - 1) / (-step) + 1
        } else {
            0
        };
        i64::try_from(n).unwrap_or(i64::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at a non-negative index below `len()`.
    pub fn at(&self, index: i64) -> i64 {
        self.start.saturating_add(index.saturating_mul(self.step))
    }

    pub fn contains(&self, n: i64) -> bool {
        let in_bounds = if self.step > 0 {
            self.start <= n && n < self.stop
        } else {
            self.stop < n && n <= self.start
        };
        in_bounds && (i128::from(n) - i128::from(self.start)) % i128::from(self.step) == 0
    }
}

/// A user function: `def` or `lambda`.
pub struct Function {
    pub id: FunctionId,
    pub name: Rc<str>,
    /// Default values, aligned with the parameter list.
    pub defaults: Vec<Option<Value>>,
    /// Scope the function was defined in.
    pub closure: Env,
    /// Names assigned in the body, which are local to each call.
    pub locals: Rc<FxHashSet<Name>>,
}

/// `receiver.method` captured as a value.
///
/// When `receiver` is a type builtin such as `str`, the method is unbound and
/// the first call argument becomes the receiver (`str.lower(s)`).
pub struct BoundMethod {
    pub receiver: Value,
    pub name: Rc<str>,
}

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<[Value]>),
    Dict(Rc<RefCell<Dict>>),
    Set(Rc<RefCell<Set>>),
    Range(RangeValue),
    Function(Rc<Function>),
    Builtin(Builtin),
    Method(Rc<BoundMethod>),
    Iterator(Rc<IterValue>),
}

impl Value {
    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    /// One-character string.
    pub fn char(c: char) -> Value {
        let mut buf = [0; 4];
        Value::str(c.encode_utf8(&mut buf))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::from(items))
    }

    pub fn dict(dict: Dict) -> Value {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn set(set: Set) -> Value {
        Value::Set(Rc::new(RefCell::new(set)))
    }

    pub fn iterator(label: &'static str, state: ValueIter) -> Value {
        Value::Iterator(Rc::new(IterValue::new(label, state)))
    }

    /// Python type name, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Set(_) => "set",
            Value::Range(_) => "range",
            Value::Function(_) => "function",
            Value::Builtin(b) if b.is_type() => "type",
            Value::Builtin(_) | Value::Method(_) => "builtin_function_or_method",
            Value::Iterator(it) => it.label,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::Set(s) => !s.borrow().is_empty(),
            Value::Range(r) => !r.is_empty(),
            Value::Function(_) | Value::Builtin(_) | Value::Method(_) | Value::Iterator(_) => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Builtin(_) | Value::Method(_)
        )
    }

    /// Integer value of an `int` or `bool`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Numeric value of an `int`, `bool` or `float`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            other => other.as_int().map(|i| i as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Start iterating. Dicts iterate over a snapshot of their keys.
    pub fn iter(&self) -> EvalResult<ValueIter> {
        Ok(match self {
            Value::List(list) => ValueIter::List {
                list: Rc::clone(list),
                index: 0,
            },
            Value::Tuple(items) => ValueIter::items(items.to_vec()),
            Value::Str(s) => ValueIter::items(s.chars().map(Value::char).collect()),
            Value::Dict(d) => ValueIter::items(d.borrow().keys().cloned().collect()),
            Value::Set(s) => ValueIter::items(s.borrow().iter().cloned().collect()),
            Value::Range(r) => ValueIter::range(*r),
            Value::Iterator(it) => ValueIter::Shared(Rc::clone(it)),
            _ => return Err(not_iterable(self.type_name())),
        })
    }

    /// Identity comparison (`is`). Immutable scalars compare by value.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b),
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => Rc::ptr_eq(a, b),
            (Value::Iterator(a), Value::Iterator(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::repr(self))
    }
}

#[cfg(test)]
mod tests;
