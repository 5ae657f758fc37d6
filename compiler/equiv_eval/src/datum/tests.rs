use super::*;
use crate::budget::Limits;
use pretty_assertions::assert_eq;

fn convert(value: &Value) -> Datum {
    Datum::from_value(value, &mut Budget::new(Limits::default())).unwrap()
}

#[test]
fn json_numbers_split_into_int_and_float() {
    let datum: Datum = serde_json::from_str("[1, 2.5, -3, 9223372036854775807]").unwrap();
    assert_eq!(
        datum,
        Datum::List(vec![
            Datum::Int(1),
            Datum::Float(2.5),
            Datum::Int(-3),
            Datum::Int(i64::MAX),
        ])
    );
}

#[test]
fn json_integers_past_64_bits_are_rejected() {
    let err = serde_json::from_str::<Datum>("[18446744073709551615]").unwrap_err();
    assert!(
        err.to_string()
            .starts_with("integer 18446744073709551615 does not fit in 64 bits"),
        "{err}"
    );
}

#[test]
fn json_objects_become_string_keyed_dicts() {
    let datum: Datum = serde_json::from_str(r#"{"b": null, "a": [true]}"#).unwrap();
    assert_eq!(
        datum,
        Datum::Dict(vec![
            (Datum::Str("b".into()), Datum::None),
            (Datum::Str("a".into()), Datum::List(vec![Datum::Bool(true)])),
        ])
    );
}

#[test]
fn serializes_non_string_keys_by_repr() {
    let datum = Datum::Dict(vec![
        (Datum::Int(1), Datum::Tuple(vec![Datum::Int(2)])),
        (Datum::Str("x".into()), Datum::Float(f64::INFINITY)),
    ]);
    assert_eq!(
        serde_json::to_string(&datum).unwrap(),
        r#"{"1":[2],"x":"inf"}"#
    );
}

#[test]
fn display_is_python_repr() {
    let datum = Datum::List(vec![
        Datum::Tuple(vec![Datum::Int(0)]),
        Datum::Str("a".into()),
        Datum::Float(3.0),
        Datum::Set(vec![]),
        Datum::Dict(vec![(Datum::Str("k".into()), Datum::None)]),
    ]);
    assert_eq!(datum.to_string(), "[(0,), 'a', 3.0, set(), {'k': None}]");
}

#[test]
fn values_round_trip_through_datums() {
    let datum = Datum::Dict(vec![
        (
            Datum::Tuple(vec![Datum::Int(1), Datum::Int(2)]),
            Datum::Set(vec![Datum::Str("s".into())]),
        ),
        (Datum::Str("l".into()), Datum::List(vec![Datum::Bool(false)])),
    ]);
    let value = datum.to_value().unwrap();
    assert_eq!(convert(&value), datum);
}

#[test]
fn unhashable_dict_key_is_rejected() {
    let datum = Datum::Dict(vec![(Datum::List(vec![]), Datum::None)]);
    let err = datum.to_value().unwrap_err();
    assert_eq!(err.to_string(), "TypeError: unhashable type: 'list'");
}

#[test]
fn cyclic_list_is_cut() {
    let list = Value::list(vec![Value::Int(1)]);
    if let Value::List(items) = &list {
        items.borrow_mut().push(list.clone());
    }
    assert_eq!(
        convert(&list),
        Datum::List(vec![Datum::Int(1), Datum::Opaque("[...]".into())])
    );
    if let Value::List(items) = &list {
        items.borrow_mut().clear();
    }
}

#[test]
fn non_data_values_are_opaque() {
    let range = Value::Range(crate::value::RangeValue {
        start: 0,
        stop: 3,
        step: 1,
    });
    assert_eq!(
        convert(&range),
        Datum::Opaque("range(0, 3)".into())
    );
}

#[test]
fn conversion_spends_one_step_per_node() {
    let mut budget = Budget::new(Limits::default());
    let value = Value::list(vec![Value::Int(1), Value::tuple(vec![Value::None])]);
    Datum::from_value(&value, &mut budget).unwrap();
    assert_eq!(budget.steps(), 4);
}

#[test]
fn oversized_results_are_refused() {
    let mut value = Value::list(vec![]);
    for _ in 0..21 {
        value = Value::list(vec![value.clone(), value]);
    }
    let err = Datum::from_value(&value, &mut Budget::new(Limits::default())).unwrap_err();
    assert_eq!(err.to_string(), "MemoryError: result too large");
}
