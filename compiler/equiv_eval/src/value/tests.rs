use super::*;
use pretty_assertions::assert_eq;

fn range(start: i64, stop: i64, step: i64) -> RangeValue {
    RangeValue { start, stop, step }
}

#[test]
fn range_length_and_membership() {
    assert_eq!(range(0, 10, 1).len(), 10);
    assert_eq!(range(0, 10, 3).len(), 4);
    assert_eq!(range(10, 0, -2).len(), 5);
    assert_eq!(range(5, 5, 1).len(), 0);
    assert_eq!(range(i64::MIN, i64::MAX, 1).len(), i64::MAX);

    let r = range(1, 10, 3);
    assert!(r.contains(7));
    assert!(!r.contains(8));
    assert!(!r.contains(10));
    assert!(range(10, 0, -2).contains(2));
    assert!(!range(10, 0, -2).contains(0));
}

#[test]
fn equal_numbers_share_a_hash_key() {
    let one = HashKey::from_value(&Value::Int(1)).unwrap();
    assert_eq!(HashKey::from_value(&Value::Bool(true)).unwrap(), one);
    assert_eq!(HashKey::from_value(&Value::Float(1.0)).unwrap(), one);
    assert_ne!(HashKey::from_value(&Value::Float(1.5)).unwrap(), one);
}

#[test]
fn mutable_containers_are_unhashable() {
    let err = HashKey::from_value(&Value::list(vec![])).unwrap_err();
    assert_eq!(err.to_string(), "TypeError: unhashable type: 'list'");
    let nested = Value::tuple(vec![Value::Int(1), Value::set(Set::new())]);
    assert!(HashKey::from_value(&nested).is_err());
}

#[test]
fn dict_keeps_insertion_order_and_first_key() {
    let mut dict = Dict::new();
    dict.insert_value(Value::Int(1), Value::str("a")).unwrap();
    dict.insert_value(Value::str("b"), Value::str("b")).unwrap();
    dict.insert_value(Value::Float(1.0), Value::str("c")).unwrap();
    assert_eq!(dict.len(), 2);
    let entries: Vec<String> = dict
        .iter()
        .map(|(k, v)| format!("{k:?}={v:?}"))
        .collect();
    assert_eq!(entries, vec!["1='c'", "'b'='b'"]);

    let removed = dict.remove(&HashKey::Int(1));
    assert!(removed.is_some());
    assert!(dict.get(&HashKey::Str("b".into())).is_some());
    assert_eq!(dict.len(), 1);
}

#[test]
fn set_removal_keeps_index_consistent() {
    let mut set = Set::new();
    for i in 0..5 {
        set.insert_value(Value::Int(i)).unwrap();
    }
    assert!(set.remove(&HashKey::Int(1)));
    assert!(!set.remove(&HashKey::Int(1)));
    assert!(set.contains(&HashKey::Int(4)));
    assert!(set.remove(&HashKey::Int(4)));
    let left: Vec<i64> = set.iter().filter_map(Value::as_int).collect();
    assert_eq!(left, vec![0, 2, 3]);
}

#[test]
fn truthiness() {
    assert!(!Value::None.is_truthy());
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::Float(0.0).is_truthy());
    assert!(!Value::str("").is_truthy());
    assert!(!Value::list(vec![]).is_truthy());
    assert!(!Value::Range(range(3, 3, 1)).is_truthy());
    assert!(Value::tuple(vec![Value::None]).is_truthy());
    assert!(Value::Builtin(Builtin::Len).is_truthy());
}

#[test]
fn list_iteration_sees_appends() {
    let list = Value::list(vec![Value::Int(1)]);
    let mut iter = list.iter().unwrap();
    assert_eq!(iter.next().and_then(|v| v.as_int()), Some(1));
    if let Value::List(items) = &list {
        items.borrow_mut().push(Value::Int(2));
    }
    assert_eq!(iter.next().and_then(|v| v.as_int()), Some(2));
    assert!(iter.next().is_none());
}

#[test]
fn iterator_values_are_single_pass() {
    let it = Value::iterator("zip", ValueIter::items(vec![Value::Int(1), Value::Int(2)]));
    let first: Vec<Value> = it.iter().unwrap().collect();
    let second: Vec<Value> = it.iter().unwrap().collect();
    assert_eq!(first.len(), 2);
    assert!(second.is_empty());
    assert_eq!(it.type_name(), "zip");
}

#[test]
fn identity_versus_equality() {
    let a = Value::list(vec![]);
    let b = Value::list(vec![]);
    assert!(a.is_same(&a.clone()));
    assert!(!a.is_same(&b));
    assert!(Value::None.is_same(&Value::None));
}

#[test]
fn type_names() {
    assert_eq!(Value::Builtin(Builtin::Int).type_name(), "type");
    assert_eq!(Value::Builtin(Builtin::Len).type_name(), "builtin_function_or_method");
    assert_eq!(Value::Range(range(0, 1, 1)).type_name(), "range");
}
