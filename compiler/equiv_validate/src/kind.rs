//! Value kinds used to dispatch comparison.

use equiv_eval::{Datum, InvocationResult};
use std::fmt;

/// Coarse classification of a result.
///
/// Two values of different kinds never match. `Boolean` is separate from
/// `Number` even though the interpreter treats `True == 1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    Text,
    /// Lists and tuples. Shape is checked separately.
    Sequence,
    Mapping,
    Set,
    /// Functions, ranges and other values with no data form.
    Opaque,
    /// A captured failure.
    Error,
}

impl ValueKind {
    pub fn of(result: &InvocationResult) -> Self {
        match result {
            InvocationResult::Value(datum) => ValueKind::of_datum(datum),
            InvocationResult::Failure(_) => ValueKind::Error,
        }
    }

    pub fn of_datum(datum: &Datum) -> Self {
        match datum {
            Datum::None => ValueKind::Null,
            Datum::Bool(_) => ValueKind::Boolean,
            Datum::Int(_) | Datum::Float(_) => ValueKind::Number,
            Datum::Str(_) => ValueKind::Text,
            Datum::List(_) | Datum::Tuple(_) => ValueKind::Sequence,
            Datum::Dict(_) => ValueKind::Mapping,
            Datum::Set(_) => ValueKind::Set,
            Datum::Opaque(_) => ValueKind::Opaque,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
            ValueKind::Set => "set",
            ValueKind::Opaque => "opaque",
            ValueKind::Error => "error",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
