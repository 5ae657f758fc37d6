use super::*;
use crate::format::repr;
use pretty_assertions::assert_eq;

fn int(i: i64) -> Value {
    Value::Int(i)
}

fn op(op: BinaryOp, l: Value, r: Value) -> String {
    match binary_op(op, &l, &r) {
        Ok(v) => repr(&v),
        Err(e) => e.to_string(),
    }
}

#[test]
fn floor_division_and_modulo_follow_the_divisor_sign() {
    assert_eq!(op(BinaryOp::FloorDiv, int(7), int(2)), "3");
    assert_eq!(op(BinaryOp::FloorDiv, int(-7), int(2)), "-4");
    assert_eq!(op(BinaryOp::FloorDiv, int(7), int(-2)), "-4");
    assert_eq!(op(BinaryOp::Mod, int(-7), int(2)), "1");
    assert_eq!(op(BinaryOp::Mod, int(7), int(-2)), "-1");
    assert_eq!(op(BinaryOp::Mod, Value::Float(-7.5), int(2)), "0.5");
    assert_eq!(op(BinaryOp::FloorDiv, Value::Float(7.5), int(-2)), "-4.0");
}

#[test]
fn true_division_yields_float() {
    assert_eq!(op(BinaryOp::Div, int(6), int(3)), "2.0");
    assert_eq!(op(BinaryOp::Div, int(1), int(4)), "0.25");
}

#[test]
fn division_by_zero_messages() {
    assert_eq!(
        op(BinaryOp::Div, int(1), int(0)),
        "ZeroDivisionError: division by zero"
    );
    assert_eq!(
        op(BinaryOp::Div, Value::Float(1.0), int(0)),
        "ZeroDivisionError: float division by zero"
    );
    assert_eq!(
        op(BinaryOp::FloorDiv, int(1), int(0)),
        "ZeroDivisionError: integer division or modulo by zero"
    );
    assert_eq!(
        op(BinaryOp::Mod, int(1), int(0)),
        "ZeroDivisionError: integer modulo by zero"
    );
}

#[test]
fn integer_overflow_is_reported() {
    let err = op(BinaryOp::Add, int(i64::MAX), int(1));
    assert!(err.starts_with("OverflowError"), "{err}");
    let err = op(BinaryOp::Pow, int(10), int(19));
    assert!(err.starts_with("OverflowError"), "{err}");
    assert_eq!(op(BinaryOp::Pow, int(10), int(18)), "1000000000000000000");
    let err = op(BinaryOp::FloorDiv, int(i64::MIN), int(-1));
    assert!(err.starts_with("OverflowError"), "{err}");
}

#[test]
fn float_products_and_quotients_overflow_to_infinity() {
    let big = || Value::Float(1e308);
    assert_eq!(op(BinaryOp::Mul, big(), Value::Float(10.0)), "inf");
    assert_eq!(op(BinaryOp::Mul, big(), int(-10)), "-inf");
    assert_eq!(op(BinaryOp::Div, big(), Value::Float(0.1)), "inf");
    let err = op(BinaryOp::Pow, Value::Float(10.0), Value::Float(400.0));
    assert_eq!(err, "OverflowError: (34, 'Numerical result out of range')");
}

#[test]
fn power_rules() {
    assert_eq!(op(BinaryOp::Pow, int(2), int(-1)), "0.5");
    assert_eq!(op(BinaryOp::Pow, int(-1), int(1 << 40)), "1");
    assert_eq!(op(BinaryOp::Pow, Value::Float(4.0), Value::Float(0.5)), "2.0");
    assert_eq!(
        op(BinaryOp::Pow, int(0), int(-1)),
        "ZeroDivisionError: 0.0 cannot be raised to a negative power"
    );
}

#[test]
fn shifts() {
    assert_eq!(op(BinaryOp::Shl, int(1), int(10)), "1024");
    assert_eq!(op(BinaryOp::Shr, int(-5), int(1)), "-3");
    assert_eq!(op(BinaryOp::Shr, int(-5), int(100)), "-1");
    assert_eq!(
        op(BinaryOp::Shl, int(1), int(-1)),
        "ValueError: negative shift count"
    );
    assert!(op(BinaryOp::Shl, int(1), int(64)).starts_with("OverflowError"));
}

#[test]
fn sequences_concatenate_and_repeat() {
    let list = || Value::list(vec![int(1), int(2)]);
    assert_eq!(op(BinaryOp::Add, list(), list()), "[1, 2, 1, 2]");
    assert_eq!(op(BinaryOp::Mul, list(), int(2)), "[1, 2, 1, 2]");
    assert_eq!(op(BinaryOp::Mul, int(3), Value::str("ab")), "'ababab'");
    assert_eq!(op(BinaryOp::Mul, Value::str("ab"), int(-1)), "''");
    assert_eq!(
        op(BinaryOp::Add, Value::str("a"), int(1)),
        "TypeError: can only concatenate str (not \"int\") to str"
    );
    assert_eq!(
        op(BinaryOp::Mul, Value::str("a"), Value::str("b")),
        "TypeError: can't multiply sequence by non-int of type 'str'"
    );
    assert!(op(BinaryOp::Mul, list(), int(i64::MAX)).starts_with("MemoryError"));
}

#[test]
fn set_and_dict_operators() {
    let set = |items: &[i64]| {
        let mut s = Set::new();
        for &i in items {
            s.insert_value(int(i)).unwrap();
        }
        Value::set(s)
    };
    assert_eq!(op(BinaryOp::BitOr, set(&[1, 2]), set(&[2, 3])), "{1, 2, 3}");
    assert_eq!(op(BinaryOp::BitAnd, set(&[1, 2]), set(&[2, 3])), "{2}");
    assert_eq!(op(BinaryOp::Sub, set(&[1, 2]), set(&[2, 3])), "{1}");
    assert_eq!(op(BinaryOp::BitXor, set(&[1, 2]), set(&[2, 3])), "{1, 3}");
    assert_eq!(op(BinaryOp::BitAnd, Value::Bool(true), Value::Bool(false)), "False");

    let mut a = Dict::new();
    a.insert_value(Value::str("k"), int(1)).unwrap();
    let mut b = Dict::new();
    b.insert_value(Value::str("k"), int(2)).unwrap();
    b.insert_value(Value::str("j"), int(3)).unwrap();
    assert_eq!(
        op(BinaryOp::BitOr, Value::dict(a), Value::dict(b)),
        "{'k': 2, 'j': 3}"
    );
}

#[test]
fn unary_operators() {
    assert_eq!(repr(&unary_op(UnaryOp::Neg, &Value::Bool(true)).unwrap()), "-1");
    assert_eq!(repr(&unary_op(UnaryOp::Invert, &int(5)).unwrap()), "-6");
    assert_eq!(repr(&unary_op(UnaryOp::Not, &Value::str("")).unwrap()), "True");
    assert!(unary_op(UnaryOp::Neg, &int(i64::MIN)).is_err());
    assert_eq!(
        unary_op(UnaryOp::Neg, &Value::str("x")).unwrap_err().to_string(),
        "TypeError: bad operand type for unary -: 'str'"
    );
}

#[test]
fn equality_across_numeric_types() {
    assert!(py_eq(&int(1), &Value::Float(1.0)).unwrap());
    assert!(py_eq(&Value::Bool(true), &int(1)).unwrap());
    assert!(!py_eq(&Value::Float(f64::NAN), &Value::Float(f64::NAN)).unwrap());
    assert!(!py_eq(&int(i64::MAX), &Value::Float(9_223_372_036_854_775_807.0)).unwrap());
    assert!(!py_eq(&Value::list(vec![]), &Value::tuple(vec![])).unwrap());
    assert!(py_eq(
        &Value::tuple(vec![int(1), Value::str("a")]),
        &Value::tuple(vec![Value::Float(1.0), Value::str("a")])
    )
    .unwrap());
}

#[test]
fn ordering() {
    let lt = |l: Value, r: Value| compare(CmpOp::Lt, &l, &r).unwrap();
    assert!(lt(int(1), Value::Float(1.5)));
    assert!(lt(Value::str("abc"), Value::str("abd")));
    assert!(lt(
        Value::list(vec![int(1), int(2)]),
        Value::list(vec![int(1), int(2), int(0)])
    ));
    assert!(!lt(Value::Float(f64::NAN), int(1)));
    assert_eq!(
        compare(CmpOp::Lt, &int(1), &Value::str("a"))
            .unwrap_err()
            .to_string(),
        "TypeError: '<' not supported between instances of 'int' and 'str'"
    );
}

#[test]
fn set_comparisons_are_subset_tests() {
    let mut small = Set::new();
    small.insert_value(int(1)).unwrap();
    let mut big = small.clone();
    big.insert_value(int(2)).unwrap();
    let (small, big) = (Value::set(small), Value::set(big));
    assert!(compare(CmpOp::Lt, &small, &big).unwrap());
    assert!(compare(CmpOp::LtEq, &small, &small).unwrap());
    assert!(!compare(CmpOp::Lt, &small, &small).unwrap());
    assert!(compare(CmpOp::GtEq, &big, &small).unwrap());
}

#[test]
fn membership() {
    assert!(contains(&Value::str("hello"), &Value::str("ell")).unwrap());
    assert_eq!(
        contains(&Value::str("hello"), &int(1)).unwrap_err().to_string(),
        "TypeError: 'in <string>' requires string as left operand, not int"
    );
    let range = Value::Range(crate::value::RangeValue {
        start: 0,
        stop: 10,
        step: 2,
    });
    assert!(contains(&range, &Value::Float(4.0)).unwrap());
    assert!(!contains(&range, &int(5)).unwrap());
    assert!(contains(&Value::list(vec![Value::Float(2.0)]), &int(2)).unwrap());
    assert!(contains(&int(3), &int(3)).is_err());
}

#[test]
fn self_referencing_lists_raise_recursion_error() {
    let a = Value::list(vec![]);
    let b = Value::list(vec![]);
    if let (Value::List(x), Value::List(y)) = (&a, &b) {
        x.borrow_mut().push(a.clone());
        y.borrow_mut().push(b.clone());
    }
    let err = py_eq(&a, &b).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Recursion);
    for v in [&a, &b] {
        if let Value::List(items) = v {
            items.borrow_mut().clear();
        }
    }
}
