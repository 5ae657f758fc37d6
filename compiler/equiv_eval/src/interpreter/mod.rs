//! Tree-walking interpreter over a parsed [`Module`].
//!
//! One `Interpreter` runs one source unit: it executes the top-level
//! statements into a fresh module namespace, then calls into it. Name
//! resolution walks the scope chain (call, enclosing calls, module) and ends
//! at the capability set. Nothing else is reachable.

mod assign;
mod call;
mod comprehension;
mod expr;
mod stmt;

use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

use equiv_ir::{Arena, FunctionId, Module, Name, StringInterner};

use crate::budget::{Budget, Limits};
use crate::builtins::CapabilitySet;
use crate::environment::{Env, LocalScope, Lookup, Scope};
use crate::errors::{undefined_name, EvalError, EvalErrorKind, EvalResult};
use crate::value::Value;

/// Longest list, string or tuple a single operation may build.
pub const MAX_SEQUENCE_LEN: usize = 10_000_000;

/// How a statement finished.
pub(crate) enum Flow {
    Next,
    Break,
    Continue,
    Return(Value),
}

pub struct Interpreter<'a> {
    arena: &'a Arena,
    interner: &'a StringInterner,
    capabilities: &'a CapabilitySet,
    budget: Budget,
    globals: Env,
    /// Innermost scope of the code being executed.
    scope: Env,
    /// Active user-function calls.
    depth: usize,
    /// Names assigned in each function body.
    locals_cache: FxHashMap<FunctionId, Rc<FxHashSet<Name>>>,
    /// Call scopes captured by closures, cleared on teardown.
    captured: Vec<Env>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        module: &'a Module,
        interner: &'a StringInterner,
        capabilities: &'a CapabilitySet,
        limits: Limits,
    ) -> Self {
        let globals = LocalScope::new(Scope::module());
        Interpreter {
            arena: &module.arena,
            interner,
            capabilities,
            budget: Budget::new(limits),
            scope: globals.clone(),
            globals,
            depth: 0,
            locals_cache: FxHashMap::default(),
            captured: Vec::new(),
        }
    }

    /// Execute top-level statements into the module namespace.
    pub fn run_module(&mut self, module: &Module) -> EvalResult<()> {
        match self.exec_block(&module.body)? {
            Flow::Next => Ok(()),
            // The parser rejects these outside functions and loops.
            Flow::Return(_) | Flow::Break | Flow::Continue => Err(EvalError::new(
                EvalErrorKind::Internal("control flow escaped the module".to_owned()),
            )),
        }
    }

    /// Module bindings in the order they were introduced.
    pub fn module_bindings(&self) -> Vec<(Name, Value)> {
        self.globals.borrow().bindings_in_order()
    }

    /// Steps spent so far.
    pub fn steps(&self) -> u64 {
        self.budget.steps()
    }

    pub(crate) fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }

    #[inline]
    pub(crate) fn tick(&mut self) -> EvalResult<()> {
        self.budget.tick()
    }

    #[inline]
    pub(crate) fn tick_element(&mut self) -> EvalResult<()> {
        self.budget.tick_element()
    }

    pub(crate) fn name_text(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// Resolve a name: scope chain, then capability set.
    pub(crate) fn load_name(&self, name: Name) -> EvalResult {
        let found = self.scope.borrow().lookup(name);
        match found {
            Lookup::Found(value) => Ok(value),
            Lookup::UnboundLocal => Err(EvalError::new(EvalErrorKind::UnboundLocal(
                self.name_text(name).to_owned(),
            ))),
            Lookup::NotFound => {
                let text = self.name_text(name);
                self.capabilities
                    .get(text)
                    .map(Value::Builtin)
                    .ok_or_else(|| undefined_name(text))
            }
        }
    }

    pub(crate) fn store_name(&mut self, name: Name, value: Value) {
        self.scope.borrow_mut().define(name, value);
    }

    /// Break the reference cycles between closures and the scopes they
    /// captured so that every allocation of this execution is freed.
    pub fn teardown(&mut self) {
        for scope in self.captured.drain(..) {
            scope.borrow_mut().clear();
        }
        self.globals.borrow_mut().clear();
        self.scope = self.globals.clone();
    }
}

impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        self.teardown();
    }
}
