//! `repr()` and `str()` rendering.
//!
//! Rendering a value the program asked for is charged to the execution
//! [`Budget`]: one step per node, and `MemoryError` once the text grows past
//! [`MAX_SEQUENCE_LEN`] bytes. A `repr` embedded in an error message is cut
//! at [`MESSAGE_REPR_LIMIT`] bytes instead.

use std::fmt::Write;

use crate::budget::Budget;
use crate::errors::{too_large, EvalResult};
use crate::interpreter::MAX_SEQUENCE_LEN;
use crate::Value;

/// Longest `repr` quoted inside an error message.
pub const MESSAGE_REPR_LIMIT: usize = 10_000;

/// Python `repr(value)`, truncated with `...` past [`MESSAGE_REPR_LIMIT`].
pub fn repr(value: &Value) -> String {
    let mut renderer = Renderer::new(None, MESSAGE_REPR_LIMIT);
    let complete = renderer.write_repr(value).is_ok();
    let mut out = renderer.out;
    if !complete {
        out.push_str("...");
    }
    out
}

/// Python `str(value)` for messages: strings render without quotes.
pub fn to_str(value: &Value) -> String {
    match value {
        Value::Str(s) => s.to_string(),
        other => repr(other),
    }
}

/// `repr(value)` charged against `budget`.
pub(crate) fn repr_checked(value: &Value, budget: &mut Budget) -> EvalResult<String> {
    let mut renderer = Renderer::new(Some(budget), MAX_SEQUENCE_LEN);
    renderer.write_repr(value)?;
    Ok(renderer.out)
}

/// `str(value)` charged against `budget`.
pub(crate) fn str_checked(value: &Value, budget: &mut Budget) -> EvalResult<String> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        other => repr_checked(other, budget),
    }
}

/// Python `repr()` of a float: shortest round-trip digits, scientific
/// notation outside `1e-4 <= |f| < 1e16`.
pub fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_owned();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0" } else { "0.0" }.to_owned();
    }
    let sci = format!("{f:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..16).contains(&exponent) {
        let plain = format!("{f}");
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

/// Quote a string the way Python's `repr` does.
pub fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Address of a container, for cycle detection.
fn address(value: &Value) -> Option<usize> {
    match value {
        Value::List(rc) => Some(std::rc::Rc::as_ptr(rc) as *const () as usize),
        Value::Dict(rc) => Some(std::rc::Rc::as_ptr(rc) as *const () as usize),
        Value::Set(rc) => Some(std::rc::Rc::as_ptr(rc) as *const () as usize),
        _ => None,
    }
}

struct Renderer<'b> {
    out: String,
    /// Containers on the current path.
    seen: Vec<usize>,
    budget: Option<&'b mut Budget>,
    limit: usize,
}

impl<'b> Renderer<'b> {
    fn new(budget: Option<&'b mut Budget>, limit: usize) -> Self {
        Renderer {
            out: String::new(),
            seen: Vec::new(),
            budget,
            limit,
        }
    }

    fn visit(&mut self) -> EvalResult<()> {
        if self.out.len() > self.limit {
            return Err(too_large("string"));
        }
        match self.budget.as_deref_mut() {
            Some(budget) => budget.tick(),
            None => Ok(()),
        }
    }

    fn write_seq<'a>(
        &mut self,
        open: &str,
        close: &str,
        items: impl Iterator<Item = &'a Value>,
    ) -> EvalResult<()> {
        self.out.push_str(open);
        for (i, item) in items.enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_repr(item)?;
        }
        self.out.push_str(close);
        Ok(())
    }

    fn write_repr(&mut self, value: &Value) -> EvalResult<()> {
        self.visit()?;
        if let Some(addr) = address(value) {
            if self.seen.contains(&addr) {
                self.out.push_str(match value {
                    Value::Dict(_) => "{...}",
                    _ => "[...]",
                });
                return Ok(());
            }
            self.seen.push(addr);
            let written = equiv_stack::ensure_sufficient_stack(|| self.write_container(value));
            self.seen.pop();
            return written;
        }
        if let Value::Tuple(items) = value {
            if items.len() == 1 {
                self.out.push('(');
                self.write_repr(&items[0])?;
                self.out.push_str(",)");
                return Ok(());
            }
            return self.write_seq("(", ")", items.iter());
        }
        let out = &mut self.out;
        match value {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Value::Float(f) => out.push_str(&float_repr(*f)),
            Value::Str(s) => out.push_str(&quote_str(s)),
            Value::Range(r) => {
                if r.step == 1 {
                    let _ = write!(out, "range({}, {})", r.start, r.stop);
                } else {
                    let _ = write!(out, "range({}, {}, {})", r.start, r.stop, r.step);
                }
            }
            Value::Function(f) => {
                let _ = write!(out, "<function {}>", f.name);
            }
            Value::Builtin(b) if b.is_type() => {
                let _ = write!(out, "<class '{}'>", b.name());
            }
            Value::Builtin(b) => {
                let _ = write!(out, "<built-in function {}>", b.name());
            }
            Value::Method(m) => {
                let _ = write!(
                    out,
                    "<built-in method {} of {} object>",
                    m.name,
                    m.receiver.type_name()
                );
            }
            Value::Iterator(it) => {
                let _ = write!(out, "<{} object>", it.label);
            }
            Value::Tuple(_) | Value::List(_) | Value::Dict(_) | Value::Set(_) => {}
        }
        Ok(())
    }

    fn write_container(&mut self, value: &Value) -> EvalResult<()> {
        match value {
            Value::List(items) => self.write_seq("[", "]", items.borrow().iter()),
            Value::Set(set) => {
                let set = set.borrow();
                if set.is_empty() {
                    self.out.push_str("set()");
                    Ok(())
                } else {
                    self.write_seq("{", "}", set.iter())
                }
            }
            Value::Dict(dict) => {
                self.out.push('{');
                for (i, (k, v)) in dict.borrow().iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.write_repr(k)?;
                    self.out.push_str(": ");
                    self.write_repr(v)?;
                }
                self.out.push('}');
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests;
