use super::*;
use crate::{execute, Datum, InvocationResult};
use pretty_assertions::assert_eq;

/// `repr` of `expr` evaluated inside a function, with extended builtins.
fn eval(expr: &str) -> String {
    let source = format!("def f():\n    return {expr}\n");
    match execute(&source, &CapabilitySet::extended(), &[]) {
        InvocationResult::Value(datum) => datum.to_string(),
        InvocationResult::Failure(message) => panic!("{expr}: {message}"),
    }
}

fn fail(expr: &str) -> String {
    let source = format!("def f():\n    return {expr}\n");
    match execute(&source, &CapabilitySet::extended(), &[]) {
        InvocationResult::Value(datum) => panic!("{expr} returned {datum}"),
        InvocationResult::Failure(message) => message,
    }
}

#[test]
fn standard_set_is_exact() {
    let standard = CapabilitySet::standard();
    assert_eq!(
        standard.names(),
        vec![
            "abs", "all", "any", "bool", "dict", "enumerate", "float", "int", "isinstance",
            "len", "list", "max", "min", "range", "set", "str", "sum", "tuple",
        ]
    );
    assert!(!standard.contains("sorted"));
    assert_eq!(CapabilitySet::extended().len(), 22);
    assert_eq!(CapabilitySet::default(), standard);
}

#[test]
fn capability_set_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CapabilitySet>();
}

#[test]
fn builtin_names_round_trip() {
    for builtin in Builtin::STANDARD.into_iter().chain(Builtin::EXTENDED) {
        assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
    }
    assert_eq!(Builtin::from_name("open"), None);
}

#[test]
fn conversions() {
    assert_eq!(eval("int('  -42 ')"), "-42");
    assert_eq!(eval("int('1_000')"), "1000");
    assert_eq!(eval("int('ff', 16)"), "255");
    assert_eq!(eval("int('0b101', 0)"), "5");
    assert_eq!(eval("int(-3.9)"), "-3");
    assert_eq!(eval("int(True)"), "1");
    assert_eq!(eval("float('1e3')"), "1000.0");
    assert_eq!(eval("float('-inf')"), "-inf");
    assert_eq!(eval("str(1.0) + str(None) + str([1, 'a'])"), "\"1.0None[1, 'a']\"");
    assert_eq!(eval("bool([]), bool(' ')"), "(False, True)");
    assert_eq!(eval("tuple('ab')"), "('a', 'b')");
    assert_eq!(eval("list(range(2, 11, 4))"), "[2, 6, 10]");
    assert_eq!(eval("dict([(1, 'a'), ('b', 2)], c=3)"), "{1: 'a', 'b': 2, 'c': 3}");
}

#[test]
fn conversion_errors() {
    assert_eq!(
        fail("int('abc')"),
        "ValueError: invalid literal for int() with base 10: 'abc' (line 2)"
    );
    assert_eq!(
        fail("float('x')"),
        "ValueError: could not convert string to float: 'x' (line 2)"
    );
    assert_eq!(
        fail("int(float('nan'))"),
        "ValueError: cannot convert float NaN to integer (line 2)"
    );
    assert_eq!(
        fail("dict([(1, 2, 3)])"),
        "ValueError: dictionary update sequence element #0 has length 3; 2 is required (line 2)"
    );
}

#[test]
fn aggregates() {
    assert_eq!(eval("sum([1, 2, 3], 10)"), "16");
    assert_eq!(eval("sum([0.5, 0.25])"), "0.75");
    assert_eq!(eval("min(3, 1, 2), max([3, 1, 2])"), "(1, 3)");
    assert_eq!(eval("max(['aa', 'b', 'ccc'], key=len)"), "'ccc'");
    assert_eq!(eval("min([], default=-1)"), "-1");
    assert_eq!(eval("all([]), any([]), any([0, '', 3])"), "(True, False, True)");
    assert_eq!(eval("abs(-7), abs(-2.5)"), "(7, 2.5)");
    assert_eq!(eval("len({'a': 1}), len('héllo'), len(range(0, 10, 3))"), "(1, 5, 4)");
}

#[test]
fn aggregate_errors() {
    assert_eq!(
        fail("max([])"),
        "ValueError: max() arg is an empty sequence (line 2)"
    );
    assert_eq!(
        fail("sum(['a'])"),
        "TypeError: unsupported operand type(s) for +: 'int' and 'str' (line 2)"
    );
    assert_eq!(
        fail("len(5)"),
        "TypeError: object of type 'int' has no len() (line 2)"
    );
    assert_eq!(
        fail("min(1, 'a')"),
        "TypeError: '<' not supported between instances of 'str' and 'int' (line 2)"
    );
}

#[test]
fn iteration_helpers() {
    assert_eq!(eval("list(enumerate('ab', 1))"), "[(1, 'a'), (2, 'b')]");
    assert_eq!(eval("list(zip([1, 2, 3], 'ab'))"), "[(1, 'a'), (2, 'b')]");
    assert_eq!(eval("list(reversed(range(4)))"), "[3, 2, 1, 0]");
    assert_eq!(eval("list(reversed([1, 2]))"), "[2, 1]");
    assert_eq!(eval("sorted([3, 1, 2], reverse=True)"), "[3, 2, 1]");
    assert_eq!(
        eval("sorted(['bb', 'a', 'ccc', 'dd'], key=len)"),
        "['a', 'bb', 'dd', 'ccc']"
    );
    assert_eq!(eval("sorted({3: 'x', 1: 'y'})"), "[1, 3]");
}

#[test]
fn round_is_half_even() {
    assert_eq!(eval("round(2.5), round(3.5), round(-2.5)"), "(2, 4, -2)");
    assert_eq!(eval("round(3.14159, 2)"), "3.14");
    assert_eq!(eval("round(1250, -2), round(1350, -2)"), "(1200, 1400)");
    assert_eq!(eval("round(7)"), "7");
}

#[test]
fn isinstance_checks() {
    assert_eq!(eval("isinstance(True, int)"), "True");
    assert_eq!(eval("isinstance(1, bool)"), "False");
    assert_eq!(eval("isinstance(1.0, (int, float))"), "True");
    assert_eq!(eval("isinstance([], tuple)"), "False");
    assert_eq!(
        fail("isinstance(1, 2)"),
        "TypeError: isinstance() arg 2 must be a type, a tuple of types, or a union (line 2)"
    );
}

#[test]
fn arity_and_keywords_are_checked() {
    assert_eq!(
        fail("len()"),
        "TypeError: len() takes exactly 1 argument (0 given) (line 2)"
    );
    assert_eq!(
        fail("abs(1, x=2)"),
        "TypeError: abs() got an unexpected keyword argument 'x' (line 2)"
    );
}

#[test]
fn range_rejects_zero_step() {
    assert_eq!(
        fail("range(1, 2, 0)"),
        "ValueError: range() arg 3 must not be zero (line 2)"
    );
}

#[test]
fn datum_arguments_reach_builtins() {
    let source = "def f(xs):\n    return sum(xs) / len(xs)\n";
    let args = [Datum::List(vec![Datum::Int(1), Datum::Int(2)])];
    assert_eq!(
        execute(source, &CapabilitySet::standard(), &args),
        InvocationResult::Value(Datum::Float(1.5))
    );
}
