//! List, set and dict comprehensions and generator expressions.
//!
//! Loop variables live in a scope of their own, so they never leak into the
//! enclosing function. The first iterable is evaluated in the enclosing
//! scope, as in Python.

use equiv_ir::{Comprehension, ComprehensionKind};

use super::{Interpreter, MAX_SEQUENCE_LEN};
use crate::environment::{LocalScope, Scope};
use crate::errors::{too_large, EvalResult};
use crate::value::{Dict, Set, Value, ValueIter};

/// Results collected by a running comprehension.
enum Sink {
    Items(Vec<Value>),
    Set(Set),
    Dict(Dict),
}

impl Interpreter<'_> {
    pub(crate) fn eval_comprehension(&mut self, comp: &Comprehension) -> EvalResult {
        let Some(first) = comp.generators.first() else {
            return Ok(Value::list(Vec::new()));
        };
        let outer = self.eval(first.iter)?.iter()?;

        let scope = LocalScope::new(Scope::nested(self.scope.clone()));
        let saved = std::mem::replace(&mut self.scope, scope);
        let mut sink = match comp.kind {
            ComprehensionKind::List | ComprehensionKind::Generator => Sink::Items(Vec::new()),
            ComprehensionKind::Set => Sink::Set(Set::new()),
            ComprehensionKind::Dict => Sink::Dict(Dict::new()),
        };
        let result = self.run_generator(comp, 0, Some(outer), &mut sink);
        self.scope = saved;
        result?;

        Ok(match (comp.kind, sink) {
            (ComprehensionKind::Generator, Sink::Items(items)) => {
                Value::iterator("generator", ValueIter::items(items))
            }
            (_, Sink::Items(items)) => Value::list(items),
            (_, Sink::Set(set)) => Value::set(set),
            (_, Sink::Dict(dict)) => Value::dict(dict),
        })
    }

    /// Run generator clause `level`, then the inner clauses for each item.
    fn run_generator(
        &mut self,
        comp: &Comprehension,
        level: usize,
        iter: Option<ValueIter>,
        sink: &mut Sink,
    ) -> EvalResult<()> {
        let Some(generator) = comp.generators.get(level) else {
            return self.emit(comp, sink);
        };
        let mut items = match iter {
            Some(iter) => iter,
            None => self.eval(generator.iter)?.iter()?,
        };
        'items: while let Some(item) = items.next() {
            self.tick()?;
            self.assign(&generator.target, item)?;
            for &cond in &generator.conditions {
                if !self.eval(cond)?.is_truthy() {
                    continue 'items;
                }
            }
            self.run_generator(comp, level + 1, None, sink)?;
        }
        Ok(())
    }

    fn emit(&mut self, comp: &Comprehension, sink: &mut Sink) -> EvalResult<()> {
        let element = self.eval(comp.element)?;
        match sink {
            Sink::Items(items) => {
                if items.len() >= MAX_SEQUENCE_LEN {
                    return Err(too_large("comprehension"));
                }
                items.push(element);
            }
            Sink::Set(set) => {
                set.insert_value(element)?;
            }
            Sink::Dict(dict) => {
                let value = match comp.value {
                    Some(v) => self.eval(v)?,
                    None => Value::None,
                };
                dict.insert_value(element, value)?;
            }
        }
        Ok(())
    }
}
