//! String interner for identifiers and string literals.
//!
//! One interner is owned by each parsed source unit. Nothing is shared
//! between executions, so there is no locking and no process-wide table.

use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// Interned string handle.
///
/// Equality and hashing are a single `u32` comparison. Resolve the text with
/// [`StringInterner::lookup`] on the interner that produced it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// The empty string, pre-interned in every interner.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Per-source-unit string interner.
///
/// Strings are stored as `Rc<str>` so the interpreter can hand literal text to
/// runtime string values without copying it.
pub struct StringInterner {
    map: FxHashMap<Rc<str>, Name>,
    strings: Vec<Rc<str>>,
}

impl StringInterner {
    pub fn new() -> Self {
        let empty: Rc<str> = Rc::from("");
        let mut map = FxHashMap::default();
        map.insert(Rc::clone(&empty), Name::EMPTY);
        StringInterner {
            map,
            strings: vec![empty],
        }
    }

    /// Intern `s`, returning the existing handle if already present.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let name = Name(u32::try_from(self.strings.len()).unwrap_or(u32::MAX));
        let text: Rc<str> = Rc::from(s);
        self.strings.push(Rc::clone(&text));
        self.map.insert(text, name);
        name
    }

    /// Look up an already-interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Text of `name`. Unknown handles resolve to the empty string.
    #[inline]
    pub fn lookup(&self, name: Name) -> &str {
        self.strings
            .get(name.0 as usize)
            .map_or("", |text| &**text)
    }

    /// Shared text of `name`, for runtime string values.
    #[inline]
    pub fn lookup_rc(&self, name: Name) -> Rc<str> {
        self.strings
            .get(name.0 as usize)
            .map_or_else(|| Rc::from(""), Rc::clone)
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.strings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut interner = StringInterner::new();
        let a = interner.intern("num_map");
        let b = interner.intern("complement");
        assert_ne!(a, b);
        assert_eq!(interner.intern("num_map"), a);
        assert_eq!(interner.lookup(a), "num_map");
        assert_eq!(interner.get("complement"), Some(b));
        assert_eq!(interner.get("target"), None);
    }

    #[test]
    fn empty_is_preinterned() {
        let mut interner = StringInterner::new();
        assert!(interner.is_empty());
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }
}
