use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn value(datum: Datum) -> InvocationResult {
    InvocationResult::Value(datum)
}

fn failure(message: &str) -> InvocationResult {
    InvocationResult::Failure(message.to_owned())
}

#[test]
fn resource_limits_never_match() {
    let overflow = failure("OverflowError: integer result does not fit in 64 bits (line 4)");
    let timeout = failure("TimeoutError: step limit of 100 exceeded (line 2)");
    for policy in [FailurePolicy::StatusOnly, FailurePolicy::ExactMessage] {
        let options = CompareOptions::default().with_failure_policy(policy);
        assert!(!compare(&overflow, &overflow, &options), "{policy}");
        assert!(!compare(&timeout, &timeout, &options), "{policy}");
        assert!(!compare(&timeout, &value(Datum::Int(1)), &options), "{policy}");
    }
    let program = failure("ZeroDivisionError: division by zero (line 2)");
    assert!(compare(&program, &program, &CompareOptions::default()));
}

fn ints(values: &[i64]) -> Datum {
    Datum::List(values.iter().copied().map(Datum::Int).collect())
}

fn matches(a: Datum, b: Datum) -> bool {
    compare(&value(a), &value(b), &CompareOptions::default())
}

#[test]
fn float_sums_within_tolerance() {
    assert!(matches(Datum::Float(0.1 + 0.2), Datum::Float(0.3)));
    assert!(!matches(Datum::Float(1.0), Datum::Float(1.0001)));
}

#[test]
fn ints_and_floats_mix() {
    assert!(matches(Datum::Int(10), Datum::Float(10.0)));
    assert!(matches(Datum::Float(3.000_000_000_1), Datum::Int(3)));
    assert!(!matches(Datum::Int(10), Datum::Float(10.5)));
    assert!(!matches(Datum::Int(10), Datum::Int(11)));
}

#[test]
fn large_ints_compare_exactly() {
    assert!(!matches(
        Datum::Int(9_007_199_254_740_993),
        Datum::Int(9_007_199_254_740_992)
    ));
}

#[test]
fn values_near_zero_use_the_scale_floor() {
    assert!(matches(Datum::Float(0.0), Datum::Float(1e-25)));
    assert!(!matches(Datum::Float(0.0), Datum::Float(1e-15)));
    assert!(matches(Datum::Float(-0.0), Datum::Float(0.0)));
}

#[test]
fn infinities_and_nan() {
    assert!(matches(Datum::Float(f64::INFINITY), Datum::Float(f64::INFINITY)));
    assert!(!matches(Datum::Float(f64::INFINITY), Datum::Float(f64::NEG_INFINITY)));
    assert!(!matches(Datum::Float(f64::NAN), Datum::Float(f64::NAN)));
}

#[test]
fn numbers_do_not_match_other_kinds() {
    assert!(!matches(Datum::Float(1.0), Datum::Str("1.0".to_owned())));
    assert!(!matches(Datum::Float(1.0), Datum::Bool(true)));
    assert!(!matches(Datum::Int(1), Datum::Bool(true)));
    assert!(!matches(Datum::Int(0), Datum::None));
}

#[test]
fn sequences_are_ordered() {
    assert!(matches(ints(&[1, 2, 3]), ints(&[1, 2, 3])));
    assert!(!matches(ints(&[1, 2, 3]), ints(&[1, 3, 2])));
    assert!(!matches(ints(&[1, 2]), ints(&[1, 2, 3])));
}

#[test]
fn list_and_tuple_are_different_shapes() {
    assert!(!matches(
        ints(&[1, 2]),
        Datum::Tuple(vec![Datum::Int(1), Datum::Int(2)])
    ));
}

#[test]
fn nested_numbers_use_tolerance() {
    let a = Datum::List(vec![Datum::Tuple(vec![Datum::Float(0.1 + 0.2), Datum::Int(1)])]);
    let b = Datum::List(vec![Datum::Tuple(vec![Datum::Float(0.3), Datum::Float(1.0)])]);
    assert!(matches(a, b));
}

#[test]
fn mappings_ignore_insertion_order() {
    let a = Datum::Dict(vec![
        (Datum::Str("a".into()), Datum::Int(1)),
        (Datum::Str("b".into()), Datum::Float(0.5)),
    ]);
    let b = Datum::Dict(vec![
        (Datum::Str("b".into()), Datum::Float(0.5)),
        (Datum::Str("a".into()), Datum::Int(1)),
    ]);
    assert!(matches(a.clone(), b));
    let c = Datum::Dict(vec![
        (Datum::Str("a".into()), Datum::Int(1)),
        (Datum::Str("b".into()), Datum::Int(2)),
    ]);
    assert!(!matches(a.clone(), c));
    assert!(!matches(a, Datum::Dict(vec![])));
}

#[test]
fn sets_ignore_order() {
    let a = Datum::Set(vec![Datum::Int(1), Datum::Int(2)]);
    let b = Datum::Set(vec![Datum::Int(2), Datum::Int(1)]);
    assert!(matches(a.clone(), b));
    assert!(!matches(a, Datum::Set(vec![Datum::Int(1), Datum::Int(3)])));
    assert!(!matches(
        Datum::Set(vec![Datum::Int(1), Datum::Int(1)]),
        Datum::Set(vec![Datum::Int(1), Datum::Int(2)])
    ));
}

#[test]
fn scalars_compare_directly() {
    assert!(matches(Datum::None, Datum::None));
    assert!(matches(Datum::Str("x".into()), Datum::Str("x".into())));
    assert!(!matches(Datum::Str("x".into()), Datum::Str("y".into())));
    assert!(matches(Datum::Bool(false), Datum::Bool(false)));
    assert!(matches(
        Datum::Opaque("range(0, 3)".into()),
        Datum::Opaque("range(0, 3)".into())
    ));
}

#[test]
fn failure_policies() {
    let status = CompareOptions::default();
    let exact = CompareOptions::default().with_failure_policy(FailurePolicy::ExactMessage);
    let a = failure("ZeroDivisionError: division by zero (line 2)");
    let b = failure("TypeError: bad operand (line 3)");

    assert!(compare(&a, &b, &status));
    assert!(!compare(&a, &b, &exact));
    assert!(compare(&a, &a.clone(), &exact));
    assert!(!compare(&a, &value(Datum::Int(1)), &status));
    assert!(!compare(&value(Datum::Int(1)), &a, &status));
}

#[test]
fn tolerance_is_configurable() {
    let loose = CompareOptions::default().with_tolerance(1e-3);
    assert!(compare(
        &value(Datum::Float(1.0)),
        &value(Datum::Float(1.0001)),
        &loose
    ));
}

#[test]
fn policy_names_round_trip_through_text() {
    for policy in [FailurePolicy::StatusOnly, FailurePolicy::ExactMessage] {
        assert_eq!(policy.to_string().parse::<FailurePolicy>(), Ok(policy));
    }
    assert!("strict".parse::<FailurePolicy>().is_err());
}

fn datum_strategy() -> impl Strategy<Value = Datum> {
    let leaf = prop_oneof![
        Just(Datum::None),
        any::<bool>().prop_map(Datum::Bool),
        (-50i64..50).prop_map(Datum::Int),
        prop::num::f64::ANY.prop_map(Datum::Float),
        "[ab]{0,2}".prop_map(Datum::Str),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Datum::List),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Datum::Tuple),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Datum::Set),
            prop::collection::vec((inner.clone(), inner), 0..3).prop_map(Datum::Dict),
        ]
    })
}

fn result_strategy() -> impl Strategy<Value = InvocationResult> {
    prop_oneof![
        4 => datum_strategy().prop_map(InvocationResult::Value),
        1 => "[A-Z][a-z]{0,4}Error: .{0,6}".prop_map(InvocationResult::Failure),
    ]
}

proptest! {
    #[test]
    fn compare_is_symmetric(
        a in result_strategy(),
        b in result_strategy(),
        exact in any::<bool>(),
    ) {
        let policy = if exact { FailurePolicy::ExactMessage } else { FailurePolicy::StatusOnly };
        let options = CompareOptions::default().with_failure_policy(policy);
        prop_assert_eq!(compare(&a, &b, &options), compare(&b, &a, &options));
    }

    #[test]
    fn ints_match_themselves(a in any::<i64>()) {
        prop_assert!(values_match(&Datum::Int(a), &Datum::Int(a), DEFAULT_TOLERANCE));
    }
}
