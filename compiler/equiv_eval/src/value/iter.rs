//! Iteration over runtime values.

use std::cell::RefCell;
use std::rc::Rc;

use super::{RangeValue, Value};

/// Iterator state. Lists are iterated live by index, so appends made while
/// looping are visited, as in Python.
pub enum ValueIter {
    Range {
        next: i64,
        stop: i64,
        step: i64,
    },
    List {
        list: Rc<RefCell<Vec<Value>>>,
        index: usize,
    },
    Items(std::vec::IntoIter<Value>),
    Enumerate {
        inner: Box<ValueIter>,
        count: i64,
    },
    Zip(Vec<ValueIter>),
    /// Advances a first-class iterator value, consuming it for everyone.
    Shared(Rc<IterValue>),
}

impl ValueIter {
    pub fn range(range: RangeValue) -> Self {
        ValueIter::Range {
            next: range.start,
            stop: range.stop,
            step: range.step,
        }
    }

    pub fn items(items: Vec<Value>) -> Self {
        ValueIter::Items(items.into_iter())
    }
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            ValueIter::Range { next, stop, step } => {
                let more = if *step > 0 { *next < *stop } else { *next > *stop };
                if !more {
                    return None;
                }
                let current = *next;
                *next = current.checked_add(*step).unwrap_or(*stop);
                Some(Value::Int(current))
            }
            ValueIter::List { list, index } => {
                let item = list.borrow().get(*index).cloned();
                *index += 1;
                item
            }
            ValueIter::Items(items) => items.next(),
            ValueIter::Enumerate { inner, count } => {
                let item = inner.next()?;
                let n = *count;
                *count = count.saturating_add(1);
                Some(Value::tuple(vec![Value::Int(n), item]))
            }
            ValueIter::Zip(iters) => {
                let mut row = Vec::with_capacity(iters.len());
                for it in iters.iter_mut() {
                    row.push(it.next()?);
                }
                if row.is_empty() {
                    return None;
                }
                Some(Value::tuple(row))
            }
            ValueIter::Shared(shared) => shared.state.borrow_mut().next(),
        }
    }
}

/// A first-class iterator: the result of `enumerate`, `zip`, `reversed`,
/// `iter`-like builtins and generator expressions. Single pass.
pub struct IterValue {
    /// Python type name, e.g. `enumerate`.
    pub label: &'static str,
    pub state: RefCell<ValueIter>,
}

impl IterValue {
    pub fn new(label: &'static str, state: ValueIter) -> Self {
        IterValue {
            label,
            state: RefCell::new(state),
        }
    }
}
