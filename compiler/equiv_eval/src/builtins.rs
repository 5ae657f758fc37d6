//! Builtin functions and the capability set that exposes them.
//!
//! The capability set is the entire builtin surface a source unit can reach:
//! a name missing from it is a `NameError`. It is immutable, `Send + Sync`,
//! and shared by reference across executions.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use crate::errors::{
    arity, overflow, too_large, type_error, value_error, EvalError, EvalErrorKind, EvalResult,
};
use crate::format;
use crate::interpreter::{Interpreter, MAX_SEQUENCE_LEN};
use crate::operators::{self, binary_op};
use crate::value::{Dict, RangeValue, Set, Value, ValueIter};
use equiv_ir::BinaryOp;

/// A primitive operation reachable by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    All,
    Any,
    Bool,
    Dict,
    Enumerate,
    Float,
    Int,
    IsInstance,
    Len,
    List,
    Max,
    Min,
    Range,
    Set,
    Str,
    Sum,
    Tuple,
    // Extended set
    Sorted,
    Reversed,
    Zip,
    Round,
}

impl Builtin {
    pub const STANDARD: [Builtin; 18] = [
        Builtin::Abs,
        Builtin::All,
        Builtin::Any,
        Builtin::Bool,
        Builtin::Dict,
        Builtin::Enumerate,
        Builtin::Float,
        Builtin::Int,
        Builtin::Len,
        Builtin::List,
        Builtin::Max,
        Builtin::Min,
        Builtin::Range,
        Builtin::Set,
        Builtin::Str,
        Builtin::Sum,
        Builtin::Tuple,
        Builtin::IsInstance,
    ];

    pub const EXTENDED: [Builtin; 4] = [
        Builtin::Sorted,
        Builtin::Reversed,
        Builtin::Zip,
        Builtin::Round,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::All => "all",
            Builtin::Any => "any",
            Builtin::Bool => "bool",
            Builtin::Dict => "dict",
            Builtin::Enumerate => "enumerate",
            Builtin::Float => "float",
            Builtin::Int => "int",
            Builtin::IsInstance => "isinstance",
            Builtin::Len => "len",
            Builtin::List => "list",
            Builtin::Max => "max",
            Builtin::Min => "min",
            Builtin::Range => "range",
            Builtin::Set => "set",
            Builtin::Str => "str",
            Builtin::Sum => "sum",
            Builtin::Tuple => "tuple",
            Builtin::Sorted => "sorted",
            Builtin::Reversed => "reversed",
            Builtin::Zip => "zip",
            Builtin::Round => "round",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::STANDARD
            .iter()
            .chain(Builtin::EXTENDED.iter())
            .copied()
            .find(|b| b.name() == name)
    }

    /// Whether this builtin is a type (usable with `isinstance`).
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Builtin::Bool
                | Builtin::Dict
                | Builtin::Float
                | Builtin::Int
                | Builtin::List
                | Builtin::Range
                | Builtin::Set
                | Builtin::Str
                | Builtin::Tuple
                | Builtin::Enumerate
                | Builtin::Zip
                | Builtin::Reversed
        )
    }
}

/// Immutable table of the builtins a source unit may call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilitySet {
    builtins: FxHashMap<&'static str, Builtin>,
}

impl CapabilitySet {
    /// Exactly: abs all any bool dict enumerate float int len list max min
    /// range set str sum tuple isinstance.
    pub fn standard() -> Self {
        Self::from_builtins(Builtin::STANDARD)
    }

    /// The standard set plus `sorted`, `reversed`, `zip` and `round`.
    pub fn extended() -> Self {
        Self::from_builtins(Builtin::STANDARD.into_iter().chain(Builtin::EXTENDED))
    }

    pub fn from_builtins(builtins: impl IntoIterator<Item = Builtin>) -> Self {
        CapabilitySet {
            builtins: builtins.into_iter().map(|b| (b.name(), b)).collect(),
        }
    }

    /// Resolve a builtin by name. `None` means the name is not reachable.
    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.builtins.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }

    /// Builtin names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.builtins.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Call arguments after evaluation.
#[derive(Default)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keywords: Vec<(Rc<str>, Value)>,
}

impl Args {
    pub fn positional(values: Vec<Value>) -> Self {
        Args {
            positional: values,
            keywords: Vec::new(),
        }
    }

    /// Remove and return a keyword argument.
    pub fn take_keyword(&mut self, name: &str) -> Option<Value> {
        let pos = self.keywords.iter().position(|(k, _)| &**k == name)?;
        Some(self.keywords.remove(pos).1)
    }

    /// Fail on leftover keywords.
    pub fn no_keywords(&self, function: &str) -> EvalResult<()> {
        match self.keywords.first() {
            Some((name, _)) => Err(type_error(format!(
                "{function}() got an unexpected keyword argument '{name}'"
            ))),
            None => Ok(()),
        }
    }

    pub(crate) fn expect_between(&self, function: &str, min: usize, max: usize) -> EvalResult<()> {
        let n = self.positional.len();
        if n < min || n > max {
            let expected = if min == max {
                format!("exactly {min} argument{}", if min == 1 { "" } else { "s" })
            } else if n < min {
                format!("at least {min} argument{}", if min == 1 { "" } else { "s" })
            } else {
                format!("at most {max} arguments")
            };
            return Err(arity(function, &expected, n));
        }
        Ok(())
    }
}

fn int_arg(value: &Value, function: &str) -> EvalResult<i64> {
    value.as_int().ok_or_else(|| {
        type_error(format!(
            "'{}' object cannot be interpreted as an integer (in {function}())",
            value.type_name()
        ))
    })
}

/// Parse `int("...")` text with optional sign, underscores and base prefix.
fn parse_int_text(text: &str, base: u32) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let lower = digits.to_ascii_lowercase();
    let (base, digits) = match (base, lower.get(..2)) {
        (0 | 16, Some("0x")) => (16, &lower[2..]),
        (0 | 8, Some("0o")) => (8, &lower[2..]),
        (0 | 2, Some("0b")) => (2, &lower[2..]),
        (0, _) => (10, lower.as_str()),
        (b, _) => (b, lower.as_str()),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__")
    {
        return None;
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    let magnitude = i128::from_str_radix(&cleaned, base).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

fn parse_float_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    let unsigned = lower.trim_start_matches(['+', '-']);
    match unsigned {
        "inf" | "infinity" => {
            return Some(if lower.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });
        }
        "nan" => return Some(f64::NAN),
        _ => {}
    }
    if trimmed.contains("__") || trimmed.starts_with('_') || trimmed.ends_with('_') {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|&c| c != '_').collect();
    cleaned.parse::<f64>().ok()
}

/// Round half to even at `digits` decimal places.
fn round_float(x: f64, digits: i64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let Ok(digits) = i32::try_from(digits.clamp(-308, 308)) else {
        return x;
    };
    let scale = 10f64.powi(digits);
    let scaled = x * scale;
    if !scaled.is_finite() {
        return x;
    }
    let rounded = scaled.round();
    let result = if (scaled - scaled.trunc()).abs() == 0.5 {
        2.0 * (scaled / 2.0).round()
    } else {
        rounded
    };
    result / scale
}

/// Round an integer to a negative number of decimal places, half to even.
fn round_int(i: i64, digits: i64) -> EvalResult<i64> {
    let Some(factor) = u32::try_from(-digits)
        .ok()
        .and_then(|e| 10i64.checked_pow(e))
    else {
        return Ok(0);
    };
    let rem = i.rem_euclid(factor);
    let down = i - rem;
    let half = factor / 2;
    let up = rem > half || (rem == half && (down / factor) % 2 != 0);
    if up {
        down.checked_add(factor).ok_or_else(overflow)
    } else {
        Ok(down)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_int(f: f64) -> EvalResult<i64> {
    if f.is_nan() {
        return Err(value_error("cannot convert float NaN to integer"));
    }
    if f.is_infinite() {
        return Err(EvalError::new(EvalErrorKind::Overflow(
            "cannot convert float infinity to integer".into(),
        )));
    }
    let truncated = f.trunc();
    if truncated.abs() >= 9_223_372_036_854_775_808.0 {
        return Err(overflow());
    }
    Ok(truncated as i64)
}

impl Interpreter<'_> {
    /// Invoke a builtin.
    pub(crate) fn call_builtin(&mut self, builtin: Builtin, mut args: Args) -> EvalResult {
        let name = builtin.name();
        match builtin {
            Builtin::Abs => {
                args.no_keywords(name)?;
                args.expect_between(name, 1, 1)?;
                match &args.positional[0] {
                    Value::Float(f) => Ok(Value::Float(f.abs())),
                    v => match v.as_int() {
                        Some(i) => i.checked_abs().map(Value::Int).ok_or_else(overflow),
                        None => Err(type_error(format!(
                            "bad operand type for abs(): '{}'",
                            v.type_name()
                        ))),
                    },
                }
            }
            Builtin::All | Builtin::Any => {
                args.no_keywords(name)?;
                args.expect_between(name, 1, 1)?;
                let want = builtin == Builtin::Any;
                let mut iter = args.positional[0].iter()?;
                while let Some(item) = iter.next() {
                    self.tick_element()?;
                    if item.is_truthy() == want {
                        return Ok(Value::Bool(want));
                    }
                }
                Ok(Value::Bool(!want))
            }
            Builtin::Bool => {
                args.no_keywords(name)?;
                args.expect_between(name, 0, 1)?;
                Ok(Value::Bool(
                    args.positional.first().is_some_and(Value::is_truthy),
                ))
            }
            Builtin::Int => self.builtin_int(args),
            Builtin::Float => {
                args.no_keywords(name)?;
                args.expect_between(name, 0, 1)?;
                let Some(v) = args.positional.first() else {
                    return Ok(Value::Float(0.0));
                };
                match v {
                    Value::Str(s) => parse_float_text(s).map(Value::Float).ok_or_else(|| {
                        value_error(format!(
                            "could not convert string to float: {}",
                            format::quote_str(s)
                        ))
                    }),
                    other => other.as_f64().map(Value::Float).ok_or_else(|| {
                        type_error(format!(
                            "float() argument must be a string or a real number, not '{}'",
                            other.type_name()
                        ))
                    }),
                }
            }
            Builtin::Str => {
                args.no_keywords(name)?;
                args.expect_between(name, 0, 1)?;
                match args.positional.first() {
                    Some(v) => Ok(Value::str(&format::str_checked(v, self.budget_mut())?)),
                    None => Ok(Value::str("")),
                }
            }
            Builtin::Len => {
                args.no_keywords(name)?;
                args.expect_between(name, 1, 1)?;
                let v = &args.positional[0];
                let len = match v {
                    Value::Str(s) => s.chars().count(),
                    Value::List(items) => items.borrow().len(),
                    Value::Tuple(items) => items.len(),
                    Value::Dict(d) => d.borrow().len(),
                    Value::Set(s) => s.borrow().len(),
                    Value::Range(r) => usize::try_from(r.len()).unwrap_or(usize::MAX),
                    other => {
                        return Err(type_error(format!(
                            "object of type '{}' has no len()",
                            other.type_name()
                        )));
                    }
                };
                Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
            }
            Builtin::List | Builtin::Tuple | Builtin::Set => {
                args.no_keywords(name)?;
                args.expect_between(name, 0, 1)?;
                let items = match args.positional.first() {
                    Some(v) => self.collect(v)?,
                    None => Vec::new(),
                };
                match builtin {
                    Builtin::List => Ok(Value::list(items)),
                    Builtin::Tuple => Ok(Value::tuple(items)),
                    _ => {
                        let mut set = Set::new();
                        for item in items {
                            set.insert_value(item)?;
                        }
                        Ok(Value::set(set))
                    }
                }
            }
            Builtin::Dict => self.builtin_dict(args),
            Builtin::Enumerate => {
                let start = match args.take_keyword("start") {
                    Some(v) => Some(v),
                    None if args.positional.len() > 1 => args.positional.pop(),
                    None => None,
                };
                args.no_keywords(name)?;
                args.expect_between(name, 1, 1)?;
                let count = start.map_or(Ok(0), |v| int_arg(&v, name))?;
                let inner = args.positional[0].iter()?;
                Ok(Value::iterator(
                    "enumerate",
                    ValueIter::Enumerate {
                        inner: Box::new(inner),
                        count,
                    },
                ))
            }
            Builtin::Range => {
                args.no_keywords(name)?;
                args.expect_between(name, 1, 3)?;
                let ints = args
                    .positional
                    .iter()
                    .map(|v| int_arg(v, name))
                    .collect::<EvalResult<Vec<i64>>>()?;
                let (start, stop, step) = match ints.as_slice() {
                    [stop] => (0, *stop, 1),
                    [start, stop] => (*start, *stop, 1),
                    [start, stop, step] => (*start, *stop, *step),
                    _ => (0, 0, 1),
                };
                if step == 0 {
                    return Err(value_error("range() arg 3 must not be zero"));
                }
                Ok(Value::Range(RangeValue { start, stop, step }))
            }
            Builtin::Max | Builtin::Min => self.builtin_min_max(builtin, args),
            Builtin::Sum => {
                let start = match args.take_keyword("start") {
                    Some(v) => Some(v),
                    None if args.positional.len() > 1 => args.positional.pop(),
                    None => None,
                };
                args.no_keywords(name)?;
                args.expect_between(name, 1, 1)?;
                let mut total = start.unwrap_or(Value::Int(0));
                if matches!(total, Value::Str(_)) {
                    return Err(type_error(
                        "sum() can't sum strings [use ''.join(seq) instead]",
                    ));
                }
                let mut iter = args.positional[0].iter()?;
                while let Some(item) = iter.next() {
                    self.tick_element()?;
                    total = binary_op(BinaryOp::Add, &total, &item)?;
                }
                Ok(total)
            }
            Builtin::IsInstance => {
                args.no_keywords(name)?;
                args.expect_between(name, 2, 2)?;
                let matched = operators::isinstance(&args.positional[0], &args.positional[1])?;
                Ok(Value::Bool(matched))
            }
            Builtin::Sorted => {
                let key = args.take_keyword("key").filter(|k| !matches!(k, Value::None));
                let reverse = args.take_keyword("reverse").is_some_and(|r| r.is_truthy());
                args.no_keywords(name)?;
                args.expect_between(name, 1, 1)?;
                let mut items = self.collect(&args.positional[0])?;
                self.sort_values(&mut items, key.as_ref(), reverse)?;
                Ok(Value::list(items))
            }
            Builtin::Reversed => {
                args.no_keywords(name)?;
                args.expect_between(name, 1, 1)?;
                match &args.positional[0] {
                    Value::Range(r) => {
                        let len = r.len();
                        let reversed = if len == 0 {
                            RangeValue { start: 0, stop: 0, step: 1 }
                        } else {
                            let last = r.at(len - 1);
                            RangeValue {
                                start: last,
                                stop: r.start.saturating_sub(r.step),
                                step: r.step.saturating_neg(),
                            }
                        };
                        Ok(Value::iterator("range_iterator", ValueIter::range(reversed)))
                    }
                    v @ (Value::List(_) | Value::Tuple(_) | Value::Str(_)) => {
                        let mut items = self.collect(v)?;
                        items.reverse();
                        let label = match v {
                            Value::List(_) => "list_reverseiterator",
                            _ => "reversed",
                        };
                        Ok(Value::iterator(label, ValueIter::items(items)))
                    }
                    Value::Dict(d) => {
                        let mut keys: Vec<Value> = d.borrow().keys().cloned().collect();
                        keys.reverse();
                        Ok(Value::iterator("dict_reversekeyiterator", ValueIter::items(keys)))
                    }
                    other => Err(type_error(format!(
                        "'{}' object is not reversible",
                        other.type_name()
                    ))),
                }
            }
            Builtin::Zip => {
                args.no_keywords(name)?;
                let iters = args
                    .positional
                    .iter()
                    .map(Value::iter)
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::iterator("zip", ValueIter::Zip(iters)))
            }
            Builtin::Round => self.builtin_round(args),
        }
    }

    fn builtin_int(&mut self, mut args: Args) -> EvalResult {
        let base = args.take_keyword("base");
        args.no_keywords("int")?;
        args.expect_between("int", 0, 2)?;
        let base = match base.as_ref().or(args.positional.get(1)) {
            Some(b) => Some(int_arg(b, "int")?),
            None => None,
        };
        let Some(v) = args.positional.first() else {
            return Ok(Value::Int(0));
        };
        if let Some(base) = base {
            let Value::Str(s) = v else {
                return Err(type_error("int() can't convert non-string with explicit base"));
            };
            if base != 0 && !(2..=36).contains(&base) {
                return Err(value_error("int() base must be >= 2 and <= 36, or 0"));
            }
            let radix = u32::try_from(base).unwrap_or(10);
            return parse_int_text(s, radix).map(Value::Int).ok_or_else(|| {
                value_error(format!(
                    "invalid literal for int() with base {base}: {}",
                    format::quote_str(s)
                ))
            });
        }
        match v {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Float(f) => float_to_int(*f).map(Value::Int),
            Value::Str(s) => parse_int_text(s, 10).map(Value::Int).ok_or_else(|| {
                value_error(format!(
                    "invalid literal for int() with base 10: {}",
                    format::quote_str(s)
                ))
            }),
            other => Err(type_error(format!(
                "int() argument must be a string, a bytes-like object or a real number, not '{}'",
                other.type_name()
            ))),
        }
    }

    fn builtin_dict(&mut self, args: Args) -> EvalResult {
        args.expect_between("dict", 0, 1)?;
        let mut dict = Dict::new();
        if let Some(source) = args.positional.first() {
            if let Value::Dict(other) = source {
                for (hash, key, value) in other.borrow().iter_hashed() {
                    dict.insert(hash.clone(), key.clone(), value.clone());
                }
            } else {
                let mut iter = source.iter()?;
                let mut index = 0usize;
                while let Some(item) = iter.next() {
                    self.tick_element()?;
                    let pair = self.collect(&item).map_err(|_| {
                        type_error(format!(
                            "cannot convert dictionary update sequence element #{index} to a sequence"
                        ))
                    })?;
                    let [key, value]: [Value; 2] = pair.try_into().map_err(|p: Vec<Value>| {
                        value_error(format!(
                            "dictionary update sequence element #{index} has length {}; 2 is required",
                            p.len()
                        ))
                    })?;
                    dict.insert_value(key, value)?;
                    index += 1;
                }
            }
        }
        for (key, value) in args.keywords {
            dict.insert_value(Value::Str(key), value)?;
        }
        Ok(Value::dict(dict))
    }

    fn builtin_min_max(&mut self, builtin: Builtin, mut args: Args) -> EvalResult {
        let name = builtin.name();
        let key = args.take_keyword("key").filter(|k| !matches!(k, Value::None));
        let default = args.take_keyword("default");
        args.no_keywords(name)?;
        if args.positional.is_empty() {
            return Err(type_error(format!(
                "{name} expected at least 1 argument, got 0"
            )));
        }
        let candidates = if args.positional.len() == 1 {
            self.collect(&args.positional[0])?
        } else {
            if default.is_some() {
                return Err(type_error(format!(
                    "Cannot specify a default for {name}() with multiple positional arguments"
                )));
            }
            std::mem::take(&mut args.positional)
        };

        let mut best: Option<(Value, Value)> = None;
        for item in candidates {
            self.tick_element()?;
            let k = match &key {
                Some(f) => self.call_value(f, Args::positional(vec![item.clone()]))?,
                None => item.clone(),
            };
            let replace = match &best {
                None => true,
                Some((best_key, _)) => {
                    let op = if builtin == Builtin::Max { ">" } else { "<" };
                    let ord = operators::compare_values(&k, best_key, op)?;
                    if builtin == Builtin::Max {
                        ord == Some(Ordering::Greater)
                    } else {
                        ord == Some(Ordering::Less)
                    }
                }
            };
            if replace {
                best = Some((k, item));
            }
        }
        match (best, default) {
            (Some((_, item)), _) => Ok(item),
            (None, Some(d)) => Ok(d),
            (None, None) => Err(value_error(format!("{name}() arg is an empty sequence"))),
        }
    }

    fn builtin_round(&mut self, mut args: Args) -> EvalResult {
        let ndigits = args.take_keyword("ndigits");
        args.no_keywords("round")?;
        args.expect_between("round", 1, 2)?;
        let ndigits = match ndigits.or_else(|| args.positional.get(1).cloned()) {
            None | Some(Value::None) => None,
            Some(v) => Some(int_arg(&v, "round")?),
        };
        match (&args.positional[0], ndigits) {
            (Value::Float(f), None) => float_to_int(round_float(*f, 0)).map(Value::Int),
            (Value::Float(f), Some(d)) => Ok(Value::Float(round_float(*f, d))),
            (v, digits) if v.as_int().is_some() => {
                let i = v.as_int().unwrap_or_default();
                match digits {
                    Some(d) if d < 0 => round_int(i, d).map(Value::Int),
                    _ => Ok(Value::Int(i)),
                }
            }
            (v, _) => Err(type_error(format!(
                "type {} doesn't define __round__ method",
                v.type_name()
            ))),
        }
    }

    /// Materialize an iterable, enforcing the step budget and size cap.
    pub(crate) fn collect(&mut self, value: &Value) -> EvalResult<Vec<Value>> {
        match value {
            Value::Tuple(items) => return Ok(items.to_vec()),
            Value::List(items) => return Ok(items.borrow().clone()),
            Value::Range(r) if r.len() > i64::try_from(MAX_SEQUENCE_LEN).unwrap_or(i64::MAX) => {
                return Err(too_large("range"));
            }
            _ => {}
        }
        let mut out = Vec::new();
        let mut iter = value.iter()?;
        while let Some(item) = iter.next() {
            self.tick_element()?;
            if out.len() >= MAX_SEQUENCE_LEN {
                return Err(too_large("sequence"));
            }
            out.push(item);
        }
        Ok(out)
    }

    /// Stable sort with an optional key function. Comparison errors abort
    /// the sort and are returned.
    pub(crate) fn sort_values(
        &mut self,
        items: &mut Vec<Value>,
        key: Option<&Value>,
        reverse: bool,
    ) -> EvalResult<()> {
        let keys = match key {
            Some(f) => {
                let mut keys = Vec::with_capacity(items.len());
                for item in items.iter() {
                    self.tick()?;
                    keys.push(self.call_value(f, Args::positional(vec![item.clone()]))?);
                }
                keys
            }
            None => items.clone(),
        };
        let mut order: Vec<usize> = (0..items.len()).collect();
        let error = RefCell::new(None);
        order.sort_by(|&a, &b| {
            if error.borrow().is_some() {
                return Ordering::Equal;
            }
            let (x, y) = if reverse { (&keys[b], &keys[a]) } else { (&keys[a], &keys[b]) };
            match operators::compare_values(x, y, "<") {
                Ok(Some(ord)) => ord,
                Ok(None) => Ordering::Equal,
                Err(e) => {
                    *error.borrow_mut() = Some(e);
                    Ordering::Equal
                }
            }
        });
        if let Some(e) = error.into_inner() {
            return Err(e);
        }
        let sorted: Vec<Value> = order.into_iter().map(|i| items[i].clone()).collect();
        *items = sorted;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
