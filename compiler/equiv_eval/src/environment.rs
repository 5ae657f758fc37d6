//! Scopes for name resolution.
//!
//! Scopes form a parent chain: a call scope points at the scope its function
//! closed over, and the chain ends at the module namespace. Capability-set
//! builtins are consulted by the interpreter after the chain is exhausted.

use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use equiv_ir::Name;

use crate::Value;

/// Single-threaded shared scope handle.
///
/// All scope allocations go through [`LocalScope::new`]. Scopes are confined
/// to one execution and never cross threads.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }
}

impl<T> LocalScope<T> {
    /// Whether both handles refer to the same scope.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LocalScope(..)")
    }
}

/// Shared handle to a [`Scope`].
pub type Env = LocalScope<Scope>;

/// Outcome of resolving a name through the scope chain.
#[derive(Debug)]
pub enum Lookup {
    Found(Value),
    /// The name is local to an enclosing call but not yet assigned.
    UnboundLocal,
    NotFound,
}

/// Bindings of one module, call or comprehension.
#[derive(Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    /// Names in the order they were first bound.
    order: Vec<Name>,
    /// Names assigned anywhere in the function body, for call scopes.
    locals: Option<Rc<FxHashSet<Name>>>,
    parent: Option<Env>,
}

impl Scope {
    /// The module namespace.
    pub fn module() -> Self {
        Scope::default()
    }

    /// Scope for one function call.
    pub fn call(parent: Env, locals: Rc<FxHashSet<Name>>) -> Self {
        Scope {
            locals: Some(locals),
            parent: Some(parent),
            ..Scope::default()
        }
    }

    /// Scope holding comprehension loop variables.
    pub fn nested(parent: Env) -> Self {
        Scope {
            parent: Some(parent),
            ..Scope::default()
        }
    }

    pub fn define(&mut self, name: Name, value: Value) {
        if self.bindings.insert(name, value).is_none() {
            self.order.push(name);
        }
    }

    /// Remove a binding from this scope only. Returns whether it existed.
    pub fn remove(&mut self, name: Name) -> bool {
        if self.bindings.remove(&name).is_none() {
            return false;
        }
        self.order.retain(|&n| n != name);
        true
    }

    pub fn lookup(&self, name: Name) -> Lookup {
        if let Some(value) = self.bindings.get(&name) {
            return Lookup::Found(value.clone());
        }
        if self.locals.as_ref().is_some_and(|l| l.contains(&name)) {
            return Lookup::UnboundLocal;
        }
        match &self.parent {
            Some(parent) => parent.borrow().lookup(name),
            None => Lookup::NotFound,
        }
    }

    /// Bindings in first-definition order.
    pub fn bindings_in_order(&self) -> Vec<(Name, Value)> {
        self.order
            .iter()
            .filter_map(|name| self.bindings.get(name).map(|v| (*name, v.clone())))
            .collect()
    }

    /// Drop all bindings and the parent link, breaking reference cycles
    /// between closures and the scopes they captured.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.order.clear();
        self.parent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equiv_ir::StringInterner;

    #[test]
    fn lookup_walks_parents_and_respects_locals() {
        let mut interner = StringInterner::new();
        let x = interner.intern("x");
        let y = interner.intern("y");

        let module = LocalScope::new(Scope::module());
        module.borrow_mut().define(x, Value::Int(1));
        module.borrow_mut().define(y, Value::Int(2));

        let mut locals = FxHashSet::default();
        locals.insert(y);
        let call = Scope::call(module.clone(), Rc::new(locals));

        assert!(matches!(call.lookup(x), Lookup::Found(Value::Int(1))));
        assert!(matches!(call.lookup(y), Lookup::UnboundLocal));
        assert!(matches!(
            call.lookup(interner.intern("z")),
            Lookup::NotFound
        ));
    }

    #[test]
    fn order_tracks_first_definition_and_removal() {
        let mut interner = StringInterner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let mut scope = Scope::module();
        scope.define(a, Value::Int(1));
        scope.define(b, Value::Int(2));
        scope.define(a, Value::Int(3));
        let names: Vec<Name> = scope.bindings_in_order().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec![a, b]);

        assert!(scope.remove(a));
        scope.define(a, Value::Int(4));
        let names: Vec<Name> = scope.bindings_in_order().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec![b, a]);
    }
}
