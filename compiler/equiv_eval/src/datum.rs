//! Host-facing values.
//!
//! A [`Datum`] is the thread-safe counterpart of a runtime [`Value`]:
//! arguments are decoded into Datums before they enter an execution, and
//! results are converted back to Datums before they leave it.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

use crate::budget::Budget;
use crate::errors::{too_large, EvalResult};
use crate::format::{self, float_repr, quote_str};
use crate::value::{Dict, Set, Value};

/// Largest result, in values, that leaves an execution.
pub const MAX_RESULT_NODES: usize = 1_000_000;

/// Plain data exchanged with the interpreter.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Datum>),
    Tuple(Vec<Datum>),
    Set(Vec<Datum>),
    /// Entries in insertion order.
    Dict(Vec<(Datum, Datum)>),
    /// `repr` of a value with no data form, such as a function or a range.
    Opaque(String),
}

impl Datum {
    /// Convert a runtime value, one budget step per node. Self-referencing
    /// containers are cut at the point of recursion and rendered as
    /// `Opaque`; a result of more than [`MAX_RESULT_NODES`] nodes raises
    /// `MemoryError`.
    pub(crate) fn from_value(value: &Value, budget: &mut Budget) -> EvalResult<Datum> {
        Converter {
            seen: Vec::new(),
            budget,
            nodes: 0,
        }
        .convert(value)
    }

    /// Build a fresh runtime value. Containers are never shared between two
    /// conversions.
    pub(crate) fn to_value(&self) -> EvalResult<Value> {
        Ok(match self {
            Datum::None => Value::None,
            Datum::Bool(b) => Value::Bool(*b),
            Datum::Int(i) => Value::Int(*i),
            Datum::Float(f) => Value::Float(*f),
            Datum::Str(s) | Datum::Opaque(s) => Value::str(s),
            Datum::List(items) => Value::list(to_values(items)?),
            Datum::Tuple(items) => Value::tuple(to_values(items)?),
            Datum::Set(items) => {
                let mut set = Set::new();
                for item in items {
                    set.insert_value(item.to_value()?)?;
                }
                Value::set(set)
            }
            Datum::Dict(entries) => {
                let mut dict = Dict::new();
                for (k, v) in entries {
                    dict.insert_value(k.to_value()?, v.to_value()?)?;
                }
                Value::dict(dict)
            }
        })
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Datum::Int(_) | Datum::Float(_))
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(i) => Some(*i as f64),
            Datum::Float(f) => Some(*f),
            _ => None,
        }
    }
}

fn to_values(items: &[Datum]) -> EvalResult<Vec<Value>> {
    items.iter().map(Datum::to_value).collect()
}

struct Converter<'b> {
    /// Containers on the current path.
    seen: Vec<*const ()>,
    budget: &'b mut Budget,
    nodes: usize,
}

impl Converter<'_> {
    fn convert(&mut self, value: &Value) -> EvalResult<Datum> {
        self.nodes += 1;
        if self.nodes > MAX_RESULT_NODES {
            return Err(too_large("result"));
        }
        self.budget.tick()?;
        let addr = match value {
            Value::List(rc) => Some(std::rc::Rc::as_ptr(rc).cast::<()>()),
            Value::Dict(rc) => Some(std::rc::Rc::as_ptr(rc).cast::<()>()),
            Value::Set(rc) => Some(std::rc::Rc::as_ptr(rc).cast::<()>()),
            _ => None,
        };
        if let Some(addr) = addr {
            if self.seen.contains(&addr) {
                return Ok(Datum::Opaque(
                    if matches!(value, Value::Dict(_)) { "{...}" } else { "[...]" }.to_owned(),
                ));
            }
            self.seen.push(addr);
        }
        let datum = equiv_stack::ensure_sufficient_stack(|| self.convert_node(value));
        if addr.is_some() {
            self.seen.pop();
        }
        datum
    }

    fn convert_all<'a>(&mut self, items: impl Iterator<Item = &'a Value>) -> EvalResult<Vec<Datum>> {
        items.map(|item| self.convert(item)).collect()
    }

    fn convert_node(&mut self, value: &Value) -> EvalResult<Datum> {
        Ok(match value {
            Value::None => Datum::None,
            Value::Bool(b) => Datum::Bool(*b),
            Value::Int(i) => Datum::Int(*i),
            Value::Float(f) => Datum::Float(*f),
            Value::Str(s) => Datum::Str(s.to_string()),
            Value::List(items) => Datum::List(self.convert_all(items.borrow().iter())?),
            Value::Tuple(items) => Datum::Tuple(self.convert_all(items.iter())?),
            Value::Set(set) => Datum::Set(self.convert_all(set.borrow().iter())?),
            Value::Dict(dict) => {
                let dict = dict.borrow();
                let mut entries = Vec::with_capacity(dict.len());
                for (k, v) in dict.iter() {
                    entries.push((self.convert(k)?, self.convert(v)?));
                }
                Datum::Dict(entries)
            }
            other => Datum::Opaque(format::repr(other)),
        })
    }
}

/// Python `repr` of the datum.
impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn seq(f: &mut fmt::Formatter<'_>, items: &[Datum]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }
        match self {
            Datum::None => f.write_str("None"),
            Datum::Bool(true) => f.write_str("True"),
            Datum::Bool(false) => f.write_str("False"),
            Datum::Int(i) => write!(f, "{i}"),
            Datum::Float(x) => f.write_str(&float_repr(*x)),
            Datum::Str(s) => f.write_str(&quote_str(s)),
            Datum::Opaque(s) => f.write_str(s),
            Datum::List(items) => {
                f.write_str("[")?;
                seq(f, items)?;
                f.write_str("]")
            }
            Datum::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Datum::Tuple(items) => {
                f.write_str("(")?;
                seq(f, items)?;
                f.write_str(")")
            }
            Datum::Set(items) if items.is_empty() => f.write_str("set()"),
            Datum::Set(items) => {
                f.write_str("{")?;
                seq(f, items)?;
                f.write_str("}")
            }
            Datum::Dict(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// JSON key text for a dict key: strings as-is, anything else as its repr.
fn key_text(key: &Datum) -> String {
    match key {
        Datum::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Serialize for Datum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Datum::None => serializer.serialize_unit(),
            Datum::Bool(b) => serializer.serialize_bool(*b),
            Datum::Int(i) => serializer.serialize_i64(*i),
            // JSON has no NaN or infinities.
            Datum::Float(x) if !x.is_finite() => serializer.serialize_str(&float_repr(*x)),
            Datum::Float(x) => serializer.serialize_f64(*x),
            Datum::Str(s) | Datum::Opaque(s) => serializer.serialize_str(s),
            Datum::List(items) | Datum::Tuple(items) | Datum::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Datum::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&key_text(k), v)?;
                }
                map.end()
            }
        }
    }
}

struct DatumVisitor;

impl<'de> Visitor<'de> for DatumVisitor {
    type Value = Datum;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Datum, E> {
        Ok(Datum::None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Datum, E> {
        Ok(Datum::None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Datum, D::Error> {
        Datum::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Datum, E> {
        Ok(Datum::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<Datum, E> {
        Ok(Datum::Int(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<Datum, E> {
        i64::try_from(u)
            .map(Datum::Int)
            .map_err(|_| E::custom(format_args!("integer {u} does not fit in 64 bits")))
    }

    fn visit_f64<E: de::Error>(self, x: f64) -> Result<Datum, E> {
        Ok(Datum::Float(x))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Datum, E> {
        Ok(Datum::Str(s.to_owned()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Datum, E> {
        Ok(Datum::Str(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Datum, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Datum::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Datum, A::Error> {
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, Datum>()? {
            entries.push((Datum::Str(key), value));
        }
        Ok(Datum::Dict(entries))
    }
}

impl<'de> Deserialize<'de> for Datum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Datum, D::Error> {
        deserializer.deserialize_any(DatumVisitor)
    }
}

#[cfg(test)]
mod tests;
