use super::*;
use crate::value::Dict;
use pretty_assertions::assert_eq;

#[test]
fn float_repr_matches_python() {
    assert_eq!(float_repr(1.0), "1.0");
    assert_eq!(float_repr(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(float_repr(2.5), "2.5");
    assert_eq!(float_repr(1e16), "1e+16");
    assert_eq!(float_repr(1.5e-7), "1.5e-07");
    assert_eq!(float_repr(0.0001), "0.0001");
    assert_eq!(float_repr(123_456_789.0), "123456789.0");
    assert_eq!(float_repr(-0.0), "-0.0");
    assert_eq!(float_repr(f64::INFINITY), "inf");
    assert_eq!(float_repr(f64::NAN), "nan");
}

#[test]
fn string_quoting() {
    assert_eq!(quote_str("abc"), "'abc'");
    assert_eq!(quote_str("it's"), "\"it's\"");
    assert_eq!(quote_str("a\nb"), "'a\\nb'");
}

#[test]
fn container_reprs() {
    let list = Value::list(vec![Value::Int(1), Value::str("a"), Value::None]);
    assert_eq!(repr(&list), "[1, 'a', None]");
    assert_eq!(repr(&Value::tuple(vec![Value::Int(1)])), "(1,)");
    assert_eq!(repr(&Value::tuple(vec![])), "()");

    let mut dict = Dict::new();
    dict.insert_value(Value::str("k"), Value::Bool(true)).unwrap();
    assert_eq!(repr(&Value::dict(dict)), "{'k': True}");
    assert_eq!(repr(&Value::set(crate::value::Set::new())), "set()");
}

#[test]
fn self_referencing_list() {
    let list = Value::list(vec![Value::Int(1)]);
    if let Value::List(items) = &list {
        items.borrow_mut().push(list.clone());
    }
    assert_eq!(repr(&list), "[1, [...]]");
    if let Value::List(items) = &list {
        items.borrow_mut().clear();
    }
}

#[test]
fn str_of_string_is_unquoted() {
    assert_eq!(to_str(&Value::str("hi")), "hi");
    assert_eq!(to_str(&Value::Float(3.0)), "3.0");
}

fn doubled(times: usize) -> Value {
    let mut value = Value::list(vec![]);
    for _ in 0..times {
        value = Value::list(vec![value.clone(), value]);
    }
    value
}

#[test]
fn message_reprs_are_truncated() {
    let text = repr(&doubled(20));
    assert!(text.ends_with("..."), "{}", &text[text.len() - 20..]);
    assert!(text.len() < MESSAGE_REPR_LIMIT + 100);
}

#[test]
fn checked_rendering_spends_steps() {
    let mut budget = Budget::new(crate::budget::Limits::default());
    let text = str_checked(&doubled(2), &mut budget).unwrap();
    assert_eq!(text, "[[[], []], [[], []]]");
    assert_eq!(budget.steps(), 7);
    assert_eq!(str_checked(&Value::str("x"), &mut budget).unwrap(), "x");
}

#[test]
fn checked_rendering_stops_at_the_step_limit() {
    let mut budget = Budget::new(crate::budget::Limits {
        max_steps: 1000,
        ..crate::budget::Limits::default()
    });
    let err = repr_checked(&doubled(30), &mut budget).unwrap_err();
    assert!(err.kind.is_resource_limit(), "{err}");
}
