//! Methods on builtin types: `list.append`, `dict.get`, `str.split`, ...
//!
//! Attribute access only ever yields methods. `obj.name` produces a bound
//! method value; `str.lower` (attribute of a type) produces an unbound one
//! that takes its receiver as the first argument.

use std::rc::Rc;

use crate::builtins::{Args, Builtin};
use crate::errors::{
    index_error, key_error, no_attribute, type_error, value_error, EvalError, EvalErrorKind,
    EvalResult,
};
use crate::format;
use crate::interpreter::Interpreter;
use crate::operators::py_eq;
use crate::value::{BoundMethod, HashKey, Set, Value};

const LIST_METHODS: &[&str] = &[
    "append", "pop", "extend", "insert", "index", "count", "sort", "reverse", "copy", "clear",
    "remove",
];
const DICT_METHODS: &[&str] = &[
    "get",
    "keys",
    "values",
    "items",
    "setdefault",
    "pop",
    "popitem",
    "update",
    "copy",
    "clear",
];
const SET_METHODS: &[&str] = &[
    "add",
    "remove",
    "discard",
    "update",
    "union",
    "intersection",
    "difference",
    "copy",
    "clear",
];
const STR_METHODS: &[&str] = &[
    "join",
    "split",
    "strip",
    "lstrip",
    "rstrip",
    "lower",
    "upper",
    "startswith",
    "endswith",
    "replace",
    "find",
    "count",
    "isdigit",
    "isalpha",
];
const TUPLE_METHODS: &[&str] = &["index", "count"];

/// Methods available on values of the given type.
fn methods_of(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "list" => LIST_METHODS,
        "dict" => DICT_METHODS,
        "set" => SET_METHODS,
        "str" => STR_METHODS,
        "tuple" => TUPLE_METHODS,
        _ => &[],
    }
}

fn find_method(type_name: &str, attr: &str) -> Option<&'static str> {
    methods_of(type_name).iter().copied().find(|m| *m == attr)
}

/// `object.attr`.
pub fn get_attribute(object: &Value, attr: &str) -> EvalResult {
    if let Value::Builtin(b) = object {
        return match find_method(b.name(), attr) {
            Some(name) if b.is_type() => Ok(Value::Method(Rc::new(BoundMethod {
                receiver: object.clone(),
                name: Rc::from(name),
            }))),
            _ if b.is_type() => Err(EvalError::new(EvalErrorKind::Attribute(format!(
                "type object '{}' has no attribute '{attr}'",
                b.name()
            )))),
            _ => Err(no_attribute(object.type_name(), attr)),
        };
    }
    match find_method(object.type_name(), attr) {
        Some(name) => Ok(Value::Method(Rc::new(BoundMethod {
            receiver: object.clone(),
            name: Rc::from(name),
        }))),
        None => Err(no_attribute(object.type_name(), attr)),
    }
}

/// Normalize a possibly negative index against `len`, without clamping.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let i = if index < 0 { index + len } else { index };
    if (0..len).contains(&i) {
        usize::try_from(i).ok()
    } else {
        None
    }
}

/// Normalize an insertion point, clamping into `0..=len`.
fn clamp_index(index: i64, len: usize) -> usize {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let i = if index < 0 { (index + len_i).max(0) } else { index.min(len_i) };
    usize::try_from(i).unwrap_or(len)
}

fn int_arg(value: &Value, what: &str) -> EvalResult<i64> {
    value.as_int().ok_or_else(|| {
        type_error(format!(
            "'{}' object cannot be interpreted as an integer ({what})",
            value.type_name()
        ))
    })
}

fn str_arg<'v>(value: &'v Value, method: &str) -> EvalResult<&'v str> {
    value.as_str().ok_or_else(|| {
        type_error(format!(
            "{method}() argument must be str, not {}",
            value.type_name()
        ))
    })
}

/// Byte offset to character index.
fn char_index(s: &str, byte: usize) -> i64 {
    i64::try_from(s[..byte].chars().count()).unwrap_or(i64::MAX)
}

fn count_items(items: &[Value], needle: &Value) -> EvalResult {
    let mut n = 0;
    for item in items {
        if py_eq(item, needle)? {
            n += 1;
        }
    }
    Ok(Value::Int(n))
}

fn position(items: &[Value], needle: &Value) -> EvalResult<Option<usize>> {
    for (i, item) in items.iter().enumerate() {
        if py_eq(item, needle)? {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

impl Interpreter<'_> {
    /// Call `method.name(*args)`.
    pub(crate) fn call_method(&mut self, method: &BoundMethod, mut args: Args) -> EvalResult {
        let receiver = match &method.receiver {
            Value::Builtin(b) => {
                if args.positional.is_empty() {
                    return Err(type_error(format!(
                        "unbound method {}.{}() needs an argument",
                        b.name(),
                        method.name
                    )));
                }
                let receiver = args.positional.remove(0);
                if receiver.type_name() != b.name() {
                    return Err(type_error(format!(
                        "descriptor '{}' for '{}' objects doesn't apply to a '{}' object",
                        method.name,
                        b.name(),
                        receiver.type_name()
                    )));
                }
                receiver
            }
            other => other.clone(),
        };
        let name = &*method.name;
        let qualified = format!("{}.{name}", receiver.type_name());
        match &receiver {
            Value::List(_) => self.list_method(&receiver, name, &qualified, args),
            Value::Dict(_) => self.dict_method(&receiver, name, &qualified, args),
            Value::Set(_) => self.set_method(&receiver, name, &qualified, args),
            Value::Str(s) => self.str_method(s, name, &qualified, args),
            Value::Tuple(items) => {
                args.no_keywords(&qualified)?;
                args.expect_between(&qualified, 1, 1)?;
                let needle = &args.positional[0];
                match name {
                    "count" => count_items(items, needle),
                    _ => match position(items, needle)? {
                        Some(i) => Ok(Value::Int(i64::try_from(i).unwrap_or(i64::MAX))),
                        None => Err(value_error("tuple.index(x): x not in tuple")),
                    },
                }
            }
            other => Err(no_attribute(other.type_name(), name)),
        }
    }

    fn list_method(&mut self, receiver: &Value, name: &str, qualified: &str, mut args: Args) -> EvalResult {
        let Value::List(list) = receiver else {
            return Err(no_attribute(receiver.type_name(), name));
        };
        if name == "sort" {
            let key = args.take_keyword("key").filter(|k| !matches!(k, Value::None));
            let reverse = args.take_keyword("reverse").is_some_and(|r| r.is_truthy());
            args.no_keywords(qualified)?;
            args.expect_between(qualified, 0, 0)?;
            let mut items = std::mem::take(&mut *list.borrow_mut());
            let sorted = self.sort_values(&mut items, key.as_ref(), reverse);
            *list.borrow_mut() = items;
            sorted?;
            return Ok(Value::None);
        }
        args.no_keywords(qualified)?;
        match name {
            "append" => {
                args.expect_between(qualified, 1, 1)?;
                let item = args.positional.remove(0);
                list.borrow_mut().push(item);
                Ok(Value::None)
            }
            "extend" => {
                args.expect_between(qualified, 1, 1)?;
                let items = self.collect(&args.positional[0])?;
                list.borrow_mut().extend(items);
                Ok(Value::None)
            }
            "insert" => {
                args.expect_between(qualified, 2, 2)?;
                let index = int_arg(&args.positional[0], "list.insert")?;
                let item = args.positional.remove(1);
                let mut items = list.borrow_mut();
                let at = clamp_index(index, items.len());
                items.insert(at, item);
                Ok(Value::None)
            }
            "pop" => {
                args.expect_between(qualified, 0, 1)?;
                let index = match args.positional.first() {
                    Some(v) => int_arg(v, "list.pop")?,
                    None => -1,
                };
                let mut items = list.borrow_mut();
                if items.is_empty() {
                    return Err(index_error("pop from empty list"));
                }
                let at = resolve_index(index, items.len())
                    .ok_or_else(|| index_error("pop index out of range"))?;
                Ok(items.remove(at))
            }
            "index" => {
                args.expect_between(qualified, 1, 3)?;
                let items = list.borrow().clone();
                let len = items.len();
                let start = match args.positional.get(1) {
                    Some(v) => clamp_index(int_arg(v, "list.index")?, len),
                    None => 0,
                };
                let end = match args.positional.get(2) {
                    Some(v) => clamp_index(int_arg(v, "list.index")?, len),
                    None => len,
                };
                let needle = &args.positional[0];
                if start < end {
                    if let Some(i) = position(&items[start..end], needle)? {
                        return Ok(Value::Int(i64::try_from(start + i).unwrap_or(i64::MAX)));
                    }
                }
                Err(value_error(format!("{} is not in list", format::repr(needle))))
            }
            "count" => {
                args.expect_between(qualified, 1, 1)?;
                let items = list.borrow().clone();
                count_items(&items, &args.positional[0])
            }
            "remove" => {
                args.expect_between(qualified, 1, 1)?;
                let items = list.borrow().clone();
                match position(&items, &args.positional[0])? {
                    Some(i) => {
                        list.borrow_mut().remove(i);
                        Ok(Value::None)
                    }
                    None => Err(value_error("list.remove(x): x not in list")),
                }
            }
            "reverse" | "copy" | "clear" => {
                args.expect_between(qualified, 0, 0)?;
                match name {
                    "reverse" => list.borrow_mut().reverse(),
                    "clear" => list.borrow_mut().clear(),
                    _ => return Ok(Value::list(list.borrow().clone())),
                }
                Ok(Value::None)
            }
            _ => Err(no_attribute("list", name)),
        }
    }

    fn dict_method(&mut self, receiver: &Value, name: &str, qualified: &str, mut args: Args) -> EvalResult {
        let Value::Dict(dict) = receiver else {
            return Err(no_attribute(receiver.type_name(), name));
        };
        if name == "update" {
            args.expect_between(qualified, 0, 1)?;
            let mut incoming: Vec<(Value, Value)> = Vec::new();
            if let Some(source) = args.positional.first() {
                let built = self.call_builtin(Builtin::Dict, Args::positional(vec![source.clone()]))?;
                if let Value::Dict(other) = built {
                    incoming.extend(other.borrow().iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
            incoming.extend(args.keywords.drain(..).map(|(k, v)| (Value::Str(k), v)));
            let mut target = dict.borrow_mut();
            for (k, v) in incoming {
                target.insert_value(k, v)?;
            }
            return Ok(Value::None);
        }
        args.no_keywords(qualified)?;
        match name {
            "get" => {
                args.expect_between(qualified, 1, 2)?;
                let hash = HashKey::from_value(&args.positional[0])?;
                let found = dict.borrow().get(&hash).cloned();
                Ok(found.unwrap_or_else(|| args.positional.get(1).cloned().unwrap_or(Value::None)))
            }
            "setdefault" => {
                args.expect_between(qualified, 1, 2)?;
                let key = args.positional[0].clone();
                let hash = HashKey::from_value(&key)?;
                let mut d = dict.borrow_mut();
                if let Some(existing) = d.get(&hash) {
                    return Ok(existing.clone());
                }
                let default = args.positional.get(1).cloned().unwrap_or(Value::None);
                d.insert(hash, key, default.clone());
                Ok(default)
            }
            "pop" => {
                args.expect_between(qualified, 1, 2)?;
                let hash = HashKey::from_value(&args.positional[0])?;
                let removed = dict.borrow_mut().remove(&hash);
                match (removed, args.positional.get(1)) {
                    (Some((_, v)), _) => Ok(v),
                    (None, Some(default)) => Ok(default.clone()),
                    (None, None) => Err(key_error(&args.positional[0])),
                }
            }
            "popitem" => {
                args.expect_between(qualified, 0, 0)?;
                let last = dict.borrow_mut().pop_last();
                match last {
                    Some((k, v)) => Ok(Value::tuple(vec![k, v])),
                    None => Err(EvalError::new(EvalErrorKind::Key(
                        "'popitem(): dictionary is empty'".to_owned(),
                    ))),
                }
            }
            "clear" => {
                args.expect_between(qualified, 0, 0)?;
                dict.borrow_mut().clear();
                Ok(Value::None)
            }
            "keys" | "values" | "items" | "copy" => {
                args.expect_between(qualified, 0, 0)?;
                let d = dict.borrow();
                Ok(match name {
                    "keys" => Value::list(d.keys().cloned().collect()),
                    "values" => Value::list(d.values().cloned().collect()),
                    "items" => Value::list(
                        d.iter()
                            .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
                            .collect(),
                    ),
                    _ => Value::dict(d.clone()),
                })
            }
            _ => Err(no_attribute("dict", name)),
        }
    }

    fn set_method(&mut self, receiver: &Value, name: &str, qualified: &str, args: Args) -> EvalResult {
        let Value::Set(set) = receiver else {
            return Err(no_attribute(receiver.type_name(), name));
        };
        args.no_keywords(qualified)?;
        match name {
            "add" | "remove" | "discard" => {
                args.expect_between(qualified, 1, 1)?;
                let item = &args.positional[0];
                let hash = HashKey::from_value(item)?;
                let mut s = set.borrow_mut();
                match name {
                    "add" => {
                        s.insert(hash, item.clone());
                    }
                    "remove" => {
                        if !s.remove(&hash) {
                            return Err(key_error(item));
                        }
                    }
                    _ => {
                        s.remove(&hash);
                    }
                }
                Ok(Value::None)
            }
            "copy" | "clear" => {
                args.expect_between(qualified, 0, 0)?;
                if name == "clear" {
                    set.borrow_mut().clear();
                    return Ok(Value::None);
                }
                Ok(Value::set(set.borrow().clone()))
            }
            "update" | "union" => {
                let mut incoming = Vec::new();
                for other in &args.positional {
                    incoming.extend(self.collect(other)?);
                }
                if name == "update" {
                    let mut s = set.borrow_mut();
                    for item in incoming {
                        s.insert_value(item)?;
                    }
                    return Ok(Value::None);
                }
                let mut result = set.borrow().clone();
                for item in incoming {
                    result.insert_value(item)?;
                }
                Ok(Value::set(result))
            }
            "intersection" | "difference" => {
                let mut result: Set = set.borrow().clone();
                for other in &args.positional {
                    let mut keep = Set::new();
                    for item in self.collect(other)? {
                        keep.insert_value(item)?;
                    }
                    let mut next = Set::new();
                    for (hash, value) in result.iter_hashed() {
                        if keep.contains(hash) == (name == "intersection") {
                            next.insert(hash.clone(), value.clone());
                        }
                    }
                    result = next;
                }
                Ok(Value::set(result))
            }
            _ => Err(no_attribute("set", name)),
        }
    }

    fn str_method(&mut self, s: &Rc<str>, name: &str, qualified: &str, args: Args) -> EvalResult {
        args.no_keywords(qualified)?;
        let p = &args.positional;
        match name {
            "lower" | "upper" | "isdigit" | "isalpha" => {
                args.expect_between(qualified, 0, 0)?;
                Ok(match name {
                    "lower" => Value::str(&s.to_lowercase()),
                    "upper" => Value::str(&s.to_uppercase()),
                    "isdigit" => Value::Bool(!s.is_empty() && s.chars().all(char::is_numeric)),
                    _ => Value::Bool(!s.is_empty() && s.chars().all(char::is_alphabetic)),
                })
            }
            "strip" | "lstrip" | "rstrip" => {
                args.expect_between(qualified, 0, 1)?;
                let chars: Option<Vec<char>> = match p.first() {
                    None | Some(Value::None) => None,
                    Some(v) => Some(str_arg(v, qualified)?.chars().collect()),
                };
                let strip = |c: char| match &chars {
                    Some(set) => set.contains(&c),
                    None => c.is_whitespace(),
                };
                let out = match name {
                    "strip" => s.trim_matches(strip),
                    "lstrip" => s.trim_start_matches(strip),
                    _ => s.trim_end_matches(strip),
                };
                Ok(Value::str(out))
            }
            "join" => {
                args.expect_between(qualified, 1, 1)?;
                let items = self.collect(&p[0])?;
                let mut out = String::new();
                for (i, item) in items.iter().enumerate() {
                    let Value::Str(part) = item else {
                        return Err(type_error(format!(
                            "sequence item {i}: expected str instance, {} found",
                            item.type_name()
                        )));
                    };
                    if i > 0 {
                        out.push_str(s);
                    }
                    out.push_str(part);
                }
                Ok(Value::str(&out))
            }
            "split" => {
                args.expect_between(qualified, 0, 2)?;
                let maxsplit = match p.get(1) {
                    Some(v) => int_arg(v, "str.split")?,
                    None => -1,
                };
                let limit = usize::try_from(maxsplit).ok();
                let parts: Vec<Value> = match p.first() {
                    None | Some(Value::None) => split_whitespace(s, limit),
                    Some(sep) => {
                        let sep = str_arg(sep, qualified)?;
                        if sep.is_empty() {
                            return Err(value_error("empty separator"));
                        }
                        match limit {
                            Some(n) => s.splitn(n + 1, sep).map(Value::str).collect(),
                            None => s.split(sep).map(Value::str).collect(),
                        }
                    }
                };
                Ok(Value::list(parts))
            }
            "startswith" | "endswith" => {
                args.expect_between(qualified, 1, 1)?;
                let candidates: Vec<Value> = match &p[0] {
                    Value::Tuple(items) => items.to_vec(),
                    other => vec![other.clone()],
                };
                for candidate in &candidates {
                    let affix = candidate.as_str().ok_or_else(|| {
                        type_error(format!(
                            "{name} first arg must be str or a tuple of str, not {}",
                            candidate.type_name()
                        ))
                    })?;
                    let hit = if name == "startswith" {
                        s.starts_with(affix)
                    } else {
                        s.ends_with(affix)
                    };
                    if hit {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            "replace" => {
                args.expect_between(qualified, 2, 3)?;
                let old = str_arg(&p[0], qualified)?;
                let new = str_arg(&p[1], qualified)?;
                let count = match p.get(2) {
                    Some(v) => int_arg(v, "str.replace")?,
                    None => -1,
                };
                Ok(Value::str(&match usize::try_from(count) {
                    Ok(n) => s.replacen(old, new, n),
                    Err(_) => s.replace(old, new),
                }))
            }
            "find" => {
                args.expect_between(qualified, 1, 1)?;
                let needle = str_arg(&p[0], qualified)?;
                Ok(Value::Int(s.find(needle).map_or(-1, |b| char_index(s, b))))
            }
            "count" => {
                args.expect_between(qualified, 1, 1)?;
                let needle = str_arg(&p[0], qualified)?;
                let n = if needle.is_empty() {
                    s.chars().count() + 1
                } else {
                    s.matches(needle).count()
                };
                Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
            }
            _ => Err(no_attribute("str", name)),
        }
    }
}

/// `str.split()` with no separator: runs of whitespace separate, leading
/// and trailing whitespace is dropped.
fn split_whitespace(s: &str, limit: Option<usize>) -> Vec<Value> {
    let Some(limit) = limit else {
        return s.split_whitespace().map(Value::str).collect();
    };
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if parts.len() == limit {
            parts.push(Value::str(rest));
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(Value::str(&rest[..end]));
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(Value::str(rest));
                break;
            }
        }
    }
    parts
}
