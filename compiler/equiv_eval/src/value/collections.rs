//! Insertion-ordered dict and set storage keyed by [`HashKey`].

use rustc_hash::FxHashMap;
use std::rc::Rc;

use super::Value;
use crate::builtins::Builtin;
use crate::errors::{too_large, unhashable, EvalResult};

/// Hashable projection of a value.
///
/// Values that compare equal map to the same key: `True`, `1` and `1.0`
/// all become `Int(1)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Int(i64),
    Float(u64),
    Str(Rc<str>),
    Tuple(Vec<HashKey>),
    Range { start: i64, step: i64, len: i64 },
    Builtin(Builtin),
    Identity(usize),
}

/// Largest float magnitude whose integral values convert to `i64` exactly.
const I64_FLOAT_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Tuple elements one hash key may hold, nested ones included.
const MAX_KEY_NODES: usize = 1_000_000;

impl HashKey {
    pub fn from_value(value: &Value) -> EvalResult<HashKey> {
        key_at(value, &mut 0)
    }
}

fn key_at(value: &Value, nodes: &mut usize) -> EvalResult<HashKey> {
    *nodes += 1;
    if *nodes > MAX_KEY_NODES {
        return Err(too_large("tuple"));
    }
    Ok(match value {
        Value::None => HashKey::None,
        Value::Bool(b) => HashKey::Int(i64::from(*b)),
        Value::Int(i) => HashKey::Int(*i),
        Value::Float(f) => float_key(*f),
        Value::Str(s) => HashKey::Str(Rc::clone(s)),
        Value::Tuple(items) => HashKey::Tuple(equiv_stack::ensure_sufficient_stack(|| {
            items
                .iter()
                .map(|item| key_at(item, nodes))
                .collect::<EvalResult<_>>()
        })?),
        Value::Range(r) => {
            let len = r.len();
            // Empty and singleton ranges compare by contents only.
            let start = if len == 0 { 0 } else { r.start };
            let step = if len <= 1 { 1 } else { r.step };
            HashKey::Range { start, step, len }
        }
        Value::Builtin(b) => HashKey::Builtin(*b),
        Value::Function(f) => HashKey::Identity(Rc::as_ptr(f) as usize),
        Value::Iterator(it) => HashKey::Identity(Rc::as_ptr(it) as usize),
        Value::Method(m) => HashKey::Identity(Rc::as_ptr(m) as usize),
        Value::List(_) | Value::Dict(_) | Value::Set(_) => {
            return Err(unhashable(value.type_name()));
        }
    })
}

#[allow(clippy::cast_possible_truncation)]
fn float_key(f: f64) -> HashKey {
    if f.fract() == 0.0 && f.abs() < I64_FLOAT_BOUND {
        HashKey::Int(f as i64)
    } else {
        HashKey::Float(f.to_bits())
    }
}

#[derive(Clone, Debug)]
struct DictEntry {
    hash: HashKey,
    key: Value,
    value: Value,
}

/// Dict storage preserving insertion order.
#[derive(Clone, Debug, Default)]
pub struct Dict {
    entries: Vec<DictEntry>,
    index: FxHashMap<HashKey, usize>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, hash: &HashKey) -> Option<&Value> {
        self.index.get(hash).map(|&i| &self.entries[i].value)
    }

    pub fn contains(&self, hash: &HashKey) -> bool {
        self.index.contains_key(hash)
    }

    /// Insert or overwrite. An existing entry keeps its original key object
    /// and position.
    pub fn insert(&mut self, hash: HashKey, key: Value, value: Value) {
        if let Some(&i) = self.index.get(&hash) {
            self.entries[i].value = value;
            return;
        }
        self.index.insert(hash.clone(), self.entries.len());
        self.entries.push(DictEntry { hash, key, value });
    }

    pub fn insert_value(&mut self, key: Value, value: Value) -> EvalResult<()> {
        let hash = HashKey::from_value(&key)?;
        self.insert(hash, key, value);
        Ok(())
    }

    /// Remove an entry, returning its key and value.
    pub fn remove(&mut self, hash: &HashKey) -> Option<(Value, Value)> {
        let pos = self.index.remove(hash)?;
        let entry = self.entries.remove(pos);
        for i in self.index.values_mut() {
            if *i > pos {
                *i -= 1;
            }
        }
        Some((entry.key, entry.value))
    }

    /// Remove and return the most recently inserted entry.
    pub fn pop_last(&mut self) -> Option<(Value, Value)> {
        let entry = self.entries.pop()?;
        self.index.remove(&entry.hash);
        Some((entry.key, entry.value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|e| &e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|e| (&e.key, &e.value))
    }

    /// Entries with their hash keys, for lookups in another dict.
    pub fn iter_hashed(&self) -> impl Iterator<Item = (&HashKey, &Value, &Value)> {
        self.entries.iter().map(|e| (&e.hash, &e.key, &e.value))
    }
}

/// Set storage preserving insertion order.
#[derive(Clone, Debug, Default)]
pub struct Set {
    items: Vec<(HashKey, Value)>,
    index: FxHashMap<HashKey, usize>,
}

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, hash: &HashKey) -> bool {
        self.index.contains_key(hash)
    }

    /// Returns `false` if an equal element was already present.
    pub fn insert(&mut self, hash: HashKey, value: Value) -> bool {
        if self.index.contains_key(&hash) {
            return false;
        }
        self.index.insert(hash.clone(), self.items.len());
        self.items.push((hash, value));
        true
    }

    pub fn insert_value(&mut self, value: Value) -> EvalResult<bool> {
        let hash = HashKey::from_value(&value)?;
        Ok(self.insert(hash, value))
    }

    pub fn remove(&mut self, hash: &HashKey) -> bool {
        let Some(pos) = self.index.remove(hash) else {
            return false;
        };
        self.items.remove(pos);
        for i in self.index.values_mut() {
            if *i > pos {
                *i -= 1;
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().map(|(_, v)| v)
    }

    pub fn iter_hashed(&self) -> impl Iterator<Item = (&HashKey, &Value)> {
        self.items.iter().map(|(h, v)| (h, v))
    }
}
