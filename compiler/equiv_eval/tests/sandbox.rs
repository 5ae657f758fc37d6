//! End-to-end behavior of the sandboxed executor on realistic submissions.
//!
//! Covers the isolation guarantees (capabilities, imports, budgets) and the
//! property that running the same source twice gives the same result.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use equiv_eval::{
    execute, execute_with_limits, Builtin, CapabilitySet, Datum, InvocationResult, Limits,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::time::Duration;

fn ints(values: &[i64]) -> Datum {
    Datum::List(values.iter().copied().map(Datum::Int).collect())
}

#[test]
fn word_frequency_submission() {
    let source = r#"
        def word_counts(text):
            counts = {}
            for word in text.lower().split():
                word = word.strip(".,!?")
                if not word:
                    continue
                counts[word] = counts.get(word, 0) + 1
            return counts
    "#;
    let result = execute(
        source,
        &CapabilitySet::standard(),
        &[Datum::Str("The cat. the hat!".to_owned())],
    );
    assert_eq!(
        result,
        InvocationResult::Value(Datum::Dict(vec![
            (Datum::Str("the".to_owned()), Datum::Int(2)),
            (Datum::Str("cat".to_owned()), Datum::Int(1)),
            (Datum::Str("hat".to_owned()), Datum::Int(1)),
        ]))
    );
}

#[test]
fn comprehension_heavy_submission() {
    let source = "
def pairs(n):
    evens = [i for i in range(n) if i % 2 == 0]
    table = {i: i * i for i in evens}
    return sum(table.values()), sorted({v % 3 for v in table.values()})
";
    let result = execute(source, &CapabilitySet::extended(), &[Datum::Int(7)]);
    assert_eq!(
        result,
        InvocationResult::Value(Datum::Tuple(vec![
            Datum::Int(56),
            ints(&[0, 1]),
        ]))
    );
}

#[test]
fn float_results_keep_their_type() {
    let source = "def mean(xs):\n    return sum(xs) / len(xs)\n";
    let result = execute(source, &CapabilitySet::standard(), &[ints(&[1, 2, 3, 4])]);
    assert_eq!(result, InvocationResult::Value(Datum::Float(2.5)));
}

#[test]
fn narrowed_capabilities_hide_builtins() {
    let caps = CapabilitySet::from_builtins([Builtin::Len, Builtin::Range]);
    let source = "def f(xs):\n    return max(xs)\n";
    assert_eq!(
        execute(source, &caps, &[ints(&[1])]),
        InvocationResult::Failure("NameError: name 'max' is not defined (line 2)".to_owned())
    );
    let source = "def f(xs):\n    return len(xs)\n";
    assert_eq!(
        execute(source, &caps, &[ints(&[1, 2])]),
        InvocationResult::Value(Datum::Int(2))
    );
}

#[test]
fn io_builtins_do_not_exist() {
    for call in ["open('/etc/passwd')", "eval('1')", "exec('x = 1')", "print(1)", "input()"] {
        let source = format!("def f():\n    return {call}\n");
        let result = execute(&source, &CapabilitySet::extended(), &[]);
        let message = result.failure().unwrap();
        assert!(message.starts_with("NameError: "), "{call}: {message}");
    }
}

#[test]
fn unsupported_statements_are_syntax_errors() {
    let sources = [
        "class A:\n    pass\n",
        "def f():\n    try:\n        return 1\n    except:\n        return 2\n",
        "def f():\n    with x:\n        pass\n",
        "def f():\n    yield 1\n",
        "def f():\n    global x\n",
    ];
    for source in sources {
        let result = execute(source, &CapabilitySet::standard(), &[]);
        let message = result.failure().unwrap();
        assert!(message.starts_with("SyntaxError: "), "{source:?}: {message}");
    }
}

#[test]
fn budgets_apply_per_invocation() {
    let limits = Limits {
        max_steps: 5_000,
        timeout: Duration::from_secs(5),
        max_depth: 50,
    };
    let caps = CapabilitySet::standard();
    let deep = "def f(n):\n    return 0 if n == 0 else 1 + f(n - 1)\n";
    assert_eq!(
        execute_with_limits(deep, &caps, &[Datum::Int(40)], limits),
        InvocationResult::Value(Datum::Int(40))
    );
    assert_eq!(
        execute_with_limits(deep, &caps, &[Datum::Int(60)], limits),
        InvocationResult::Failure(
            "RecursionError: maximum recursion depth exceeded (line 2)".to_owned()
        )
    );
    // A fresh invocation gets a fresh step budget.
    let looping = "def f():\n    t = 0\n    for i in range(1000):\n        t += i\n    return t\n";
    for _ in 0..3 {
        assert_eq!(
            execute_with_limits(looping, &caps, &[], limits),
            InvocationResult::Value(Datum::Int(499_500))
        );
    }
}

fn arg_strategy() -> impl Strategy<Value = Datum> {
    let leaf = prop_oneof![
        Just(Datum::None),
        any::<bool>().prop_map(Datum::Bool),
        (-1000i64..1000).prop_map(Datum::Int),
        (-1.0e6f64..1.0e6).prop_map(Datum::Float),
        "[a-z ]{0,8}".prop_map(Datum::Str),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Datum::List),
            prop::collection::vec(inner, 0..4).prop_map(Datum::Tuple),
        ]
    })
}

const SUBMISSIONS: &[&str] = &[
    "def f(x):\n    return x\n",
    "def f(x):\n    return [x, x]\n",
    "def f(x):\n    return str(x)\n",
    "def f(x):\n    return len(x)\n",
    "def f(x):\n    return x + x\n",
    "def f(x):\n    return sorted(x) if isinstance(x, list) else x\n",
    "def f(x):\n    return {str(i): v for i, v in enumerate(x)} if isinstance(x, (list, tuple)) else None\n",
];

proptest! {
    #[test]
    fn execution_is_deterministic(
        index in 0..SUBMISSIONS.len(),
        arg in arg_strategy(),
    ) {
        let caps = CapabilitySet::extended();
        let args = [arg];
        let first = execute(SUBMISSIONS[index], &caps, &args);
        let second = execute(SUBMISSIONS[index], &caps, &args);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn identity_returns_its_argument(arg in arg_strategy()) {
        let result = execute("def f(x):\n    return x\n", &CapabilitySet::standard(), &[arg.clone()]);
        prop_assert_eq!(result, InvocationResult::Value(arg));
    }
}

#[test]
fn builtin_iteration_is_cheaper_than_a_loop() {
    let limits = Limits {
        max_steps: 20_000,
        ..Limits::default()
    };
    let caps = CapabilitySet::standard();
    assert_eq!(
        execute_with_limits(
            "def f(n):\n    return sum(range(n))\n",
            &caps,
            &[Datum::Int(100_000)],
            limits
        ),
        InvocationResult::Value(Datum::Int(4_999_950_000))
    );
    let looped = execute_with_limits(
        "def f(n):\n    t = 0\n    for i in range(n):\n        t += i\n    return t\n",
        &caps,
        &[Datum::Int(100_000)],
        limits,
    );
    assert!(looped.hit_resource_limit(), "{looped:?}");
}
