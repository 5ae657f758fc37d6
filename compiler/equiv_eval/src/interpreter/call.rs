//! Function values, calls and argument binding.

use rustc_hash::FxHashSet;
use std::rc::Rc;

use equiv_ir::{Arena, FunctionBody, FunctionId, Name, StmtId, StmtKind, Target};
use equiv_stack::ensure_sufficient_stack;

use super::{Flow, Interpreter};
use crate::builtins::Args;
use crate::environment::{LocalScope, Scope};
use crate::errors::{not_callable, type_error, EvalError, EvalErrorKind, EvalResult};
use crate::value::{Function, Value};

impl Interpreter<'_> {
    /// Create a function value for `def` or `lambda`, evaluating defaults
    /// now and closing over the current scope.
    pub(crate) fn make_function(&mut self, id: FunctionId) -> EvalResult {
        let arena = self.arena;
        let def = arena.function(id);
        let mut defaults = Vec::with_capacity(def.params.len());
        for param in &def.params {
            defaults.push(match param.default {
                Some(e) => Some(self.eval(e)?),
                None => None,
            });
        }
        let locals = self.locals_of(id);
        if !self.scope.ptr_eq(&self.globals) {
            self.captured.push(self.scope.clone());
        }
        Ok(Value::Function(Rc::new(Function {
            id,
            name: self.interner.lookup_rc(def.name),
            defaults,
            closure: self.scope.clone(),
            locals,
        })))
    }

    fn locals_of(&mut self, id: FunctionId) -> Rc<FxHashSet<Name>> {
        if let Some(locals) = self.locals_cache.get(&id) {
            return Rc::clone(locals);
        }
        let locals = Rc::new(assigned_names(self.arena, id));
        self.locals_cache.insert(id, Rc::clone(&locals));
        locals
    }

    /// Call any callable value.
    pub(crate) fn call_value(&mut self, callee: &Value, args: Args) -> EvalResult {
        self.tick()?;
        match callee {
            Value::Function(f) => self.call_function(f, args),
            Value::Builtin(b) => self.call_builtin(*b, args),
            Value::Method(m) => self.call_method(m, args),
            other => Err(not_callable(other.type_name())),
        }
    }

    pub(crate) fn call_function(&mut self, function: &Rc<Function>, args: Args) -> EvalResult {
        if self.depth >= self.budget.max_depth() {
            return Err(EvalErrorKind::Recursion.into());
        }
        let call_scope = LocalScope::new(Scope::call(
            function.closure.clone(),
            Rc::clone(&function.locals),
        ));
        self.bind_arguments(function, args, &mut call_scope.borrow_mut())?;

        let saved = std::mem::replace(&mut self.scope, call_scope);
        self.depth += 1;
        let arena = self.arena;
        let def = arena.function(function.id);
        let result = ensure_sufficient_stack(|| match &def.body {
            FunctionBody::Block(body) => match self.exec_block(body)? {
                Flow::Return(value) => Ok(value),
                Flow::Next => Ok(Value::None),
                Flow::Break | Flow::Continue => Err(EvalError::new(EvalErrorKind::Internal(
                    "loop control escaped a function".to_owned(),
                ))),
            },
            FunctionBody::Expr(e) => self.eval(*e),
        });
        self.depth -= 1;
        self.scope = saved;
        result
    }

    fn bind_arguments(&self, function: &Function, mut args: Args, scope: &mut Scope) -> EvalResult<()> {
        let def = self.arena.function(function.id);
        let name = &function.name;
        let params = &def.params;

        if args.positional.len() > params.len() {
            let required = function.defaults.iter().filter(|d| d.is_none()).count();
            let takes = if required == params.len() {
                format!("{}", params.len())
            } else {
                format!("from {required} to {}", params.len())
            };
            return Err(type_error(format!(
                "{name}() takes {takes} positional argument{} but {} {} given",
                if params.len() == 1 { "" } else { "s" },
                args.positional.len(),
                if args.positional.len() == 1 { "was" } else { "were" },
            )));
        }

        let mut slots: Vec<Option<Value>> = vec![None; params.len()];
        for (slot, value) in slots.iter_mut().zip(args.positional.drain(..)) {
            *slot = Some(value);
        }
        for (keyword, value) in args.keywords {
            let Some(i) = params
                .iter()
                .position(|p| self.interner.lookup(p.name) == &*keyword)
            else {
                return Err(type_error(format!(
                    "{name}() got an unexpected keyword argument '{keyword}'"
                )));
            };
            if slots[i].is_some() {
                return Err(type_error(format!(
                    "{name}() got multiple values for argument '{keyword}'"
                )));
            }
            slots[i] = Some(value);
        }

        let mut missing = Vec::new();
        for ((param, slot), default) in params.iter().zip(slots).zip(&function.defaults) {
            match slot.or_else(|| default.clone()) {
                Some(value) => scope.define(param.name, value),
                None => missing.push(format!("'{}'", self.interner.lookup(param.name))),
            }
        }
        if !missing.is_empty() {
            let listed = match missing.as_slice() {
                [only] => only.clone(),
                [init @ .., last] => format!("{} and {last}", init.join(", ")),
                [] => String::new(),
            };
            return Err(type_error(format!(
                "{name}() missing {} required positional argument{}: {listed}",
                missing.len(),
                if missing.len() == 1 { "" } else { "s" },
            )));
        }
        Ok(())
    }
}

/// Names bound anywhere in a function body, not counting nested functions
/// and comprehensions, which get their own scopes.
fn assigned_names(arena: &Arena, id: FunctionId) -> FxHashSet<Name> {
    let def = arena.function(id);
    let mut names: FxHashSet<Name> = def.params.iter().map(|p| p.name).collect();
    if let FunctionBody::Block(body) = &def.body {
        collect_block(arena, body, &mut names);
    }
    names
}

fn collect_block(arena: &Arena, body: &[StmtId], names: &mut FxHashSet<Name>) {
    for &id in body {
        match &arena.stmt(id).kind {
            StmtKind::FunctionDef(fid) => {
                names.insert(arena.function(*fid).name);
            }
            StmtKind::Assign { targets, .. } => {
                for target in targets {
                    collect_target(target, names);
                }
            }
            StmtKind::AugAssign { target, .. } => collect_target(target, names),
            StmtKind::Delete(targets) => {
                for target in targets {
                    collect_target(target, names);
                }
            }
            StmtKind::For { target, body, .. } => {
                collect_target(target, names);
                collect_block(arena, body, names);
            }
            StmtKind::While { body, .. } => collect_block(arena, body, names),
            StmtKind::If { body, orelse, .. } => {
                collect_block(arena, body, names);
                collect_block(arena, orelse, names);
            }
            StmtKind::Return(_)
            | StmtKind::Expr(_)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Pass
            | StmtKind::Assert { .. }
            | StmtKind::Raise(_)
            | StmtKind::Import { .. } => {}
        }
    }
}

fn collect_target(target: &Target, names: &mut FxHashSet<Name>) {
    match target {
        Target::Name(name, _) => {
            names.insert(*name);
        }
        Target::Tuple(targets, _) => {
            for t in targets {
                collect_target(t, names);
            }
        }
        Target::Subscript { .. } => {}
    }
}
