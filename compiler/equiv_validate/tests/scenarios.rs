//! End-to-end validation of original/candidate pairs.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use equiv_eval::{CapabilitySet, Datum, InvocationResult, Limits};
use equiv_validate::{
    compare_all, CompareOptions, FailurePolicy, Job, Report, TestCase, Validator,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

const BRUTE_FORCE_TWO_SUM: &str = "
def brute_force_two_sum(nums, target):
    n = len(nums)
    for i in range(n):
        for j in range(i + 1, n):
            if nums[i] + nums[j] == target:
                return (i, j)
    return None
";

const HASH_MAP_TWO_SUM: &str = "
def optimized_two_sum(nums, target):
    num_map = {}
    for i, num in enumerate(nums):
        complement = target - num
        if complement in num_map:
            return (num_map[complement], i)
        num_map[num] = i
    return None
";

const LOOP_SUM: &str = "
def arr_sum(arr):
    total = 0
    for num in arr:
        total += num
    return total
";

fn ints(values: &[i64]) -> Datum {
    Datum::List(values.iter().copied().map(Datum::Int).collect())
}

fn pair(a: i64, b: i64) -> InvocationResult {
    InvocationResult::Value(Datum::Tuple(vec![Datum::Int(a), Datum::Int(b)]))
}

fn run(original: &str, candidate: &str, cases: &[TestCase]) -> Report {
    compare_all(
        cases,
        original,
        candidate,
        &CapabilitySet::standard(),
        &CompareOptions::default(),
    )
}

#[test]
fn two_sum_with_a_single_pair_matches() {
    let cases = vec![vec![ints(&[1, 3, 5, 9]), Datum::Int(8)]];
    let report = run(BRUTE_FORCE_TWO_SUM, HASH_MAP_TWO_SUM, &cases);
    assert!(report.all_matched);
    assert_eq!(report.outcomes[0].original, pair(1, 2));
    assert_eq!(report.outcomes[0].candidate, pair(1, 2));
}

/// Both answers are valid index pairs, but results are compared literally,
/// so a different pair is reported as a mismatch.
#[test]
fn two_sum_with_several_pairs_is_a_literal_mismatch() {
    let cases = vec![vec![ints(&[1, 3, 5, 7]), Datum::Int(8)]];
    let report = run(BRUTE_FORCE_TWO_SUM, HASH_MAP_TWO_SUM, &cases);
    assert!(!report.all_matched);
    assert_eq!(report.outcomes[0].original, pair(0, 3));
    assert_eq!(report.outcomes[0].candidate, pair(1, 2));
}

#[test]
fn identical_summations_match() {
    let cases = vec![vec![ints(&[1, 2, 3, 4])]];
    let report = run(LOOP_SUM, LOOP_SUM, &cases);
    assert!(report.all_matched);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.original, InvocationResult::Value(Datum::Int(10)));
    assert_eq!(outcome.candidate, InvocationResult::Value(Datum::Int(10)));
}

#[test]
fn builtin_sum_matches_loop_sum() {
    let candidate = "def optimized_sum(numbers):\n    return sum(numbers)\n";
    let cases = vec![
        vec![ints(&[1, 2, 3, 4])],
        vec![ints(&(0..100).collect::<Vec<_>>())],
        vec![ints(&[0, 0, 0])],
    ];
    let report = run(LOOP_SUM, candidate, &cases);
    assert!(report.all_matched);
    assert_eq!((report.passed, report.failed), (3, 0));
    let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn syntax_error_in_candidate_is_a_mismatch_under_both_policies() {
    let broken = "def arr_sum(arr)\n    return sum(arr)\n";
    let cases = vec![vec![ints(&[1, 2, 3, 4])]];
    let caps = CapabilitySet::standard();
    for policy in [FailurePolicy::StatusOnly, FailurePolicy::ExactMessage] {
        let options = CompareOptions::default().with_failure_policy(policy);
        let report = compare_all(&cases, LOOP_SUM, broken, &caps, &options);
        assert!(!report.all_matched, "{policy}");
        let candidate = report.outcomes[0].candidate.failure().unwrap();
        assert!(candidate.starts_with("SyntaxError: "), "{candidate}");
    }
}

#[test]
fn both_failing_matches_only_by_status() {
    let original = "def f(x):\n    return x // 0\n";
    let candidate = "def f(x):\n    return x[0]\n";
    let cases = vec![vec![Datum::Int(3)]];
    let caps = CapabilitySet::standard();

    let status = compare_all(&cases, original, candidate, &caps, &CompareOptions::default());
    assert!(status.all_matched);

    let exact = CompareOptions::default().with_failure_policy(FailurePolicy::ExactMessage);
    let report = compare_all(&cases, original, candidate, &caps, &exact);
    assert!(!report.all_matched);
}

#[test]
fn float_rewrites_match_within_tolerance() {
    let original = "def mean(xs):\n    t = 0.0\n    for x in xs:\n        t += x\n    return t / len(xs)\n";
    let candidate = "def mean(xs):\n    return sum(xs) / len(xs)\n";
    let cases = vec![vec![Datum::List(vec![
        Datum::Float(0.1),
        Datum::Float(0.2),
        Datum::Float(0.3),
    ])]];
    assert!(run(original, candidate, &cases).all_matched);
}

#[test]
fn infinite_loop_candidate_times_out() {
    let candidate = "def arr_sum(arr):\n    while True:\n        pass\n";
    let caps = CapabilitySet::standard();
    let validator = Validator::new(&caps).with_limits(Limits {
        max_steps: 10_000,
        timeout: Duration::from_secs(5),
        max_depth: 100,
    });
    let report = validator.compare_all(&[vec![ints(&[1])]], LOOP_SUM, candidate);
    assert!(!report.all_matched);
    let message = report.outcomes[0].candidate.failure().unwrap();
    assert!(message.starts_with("TimeoutError: "), "{message}");
}

#[test]
fn restricted_candidates_fail() {
    let caps = CapabilitySet::standard();
    let cases = vec![vec![ints(&[2, 1])]];
    for candidate in [
        "import os\ndef arr_sum(arr):\n    return 3\n",
        "def arr_sum(arr):\n    return sorted(arr)[0] + 2\n",
    ] {
        let report = compare_all(&cases, LOOP_SUM, candidate, &caps, &CompareOptions::default());
        assert!(!report.all_matched, "{candidate}");
        assert!(report.outcomes[0].candidate.is_failure());
    }
}

#[test]
fn batch_reports_come_back_in_job_order() {
    let caps = CapabilitySet::standard();
    let jobs: Vec<Job> = (0..8)
        .map(|n| Job {
            original_code: LOOP_SUM.to_owned(),
            candidate_code: if n % 2 == 0 {
                "def s(arr):\n    return sum(arr)\n".to_owned()
            } else {
                "def s(arr):\n    return sum(arr) + 1\n".to_owned()
            },
            test_cases: vec![vec![ints(&[n, n])]],
            tolerance: None,
        })
        .collect();
    let reports = Validator::new(&caps).compare_batch(&jobs);
    assert_eq!(reports.len(), jobs.len());
    for (n, report) in reports.iter().enumerate() {
        assert_eq!(report.all_matched, n % 2 == 0, "job {n}");
        let expected = i64::try_from(2 * n).unwrap();
        assert_eq!(report.outcomes[0].original, InvocationResult::Value(Datum::Int(expected)));
    }
}

#[test]
fn job_tolerance_overrides_the_default() {
    let caps = CapabilitySet::standard();
    let job = Job {
        original_code: "def f():\n    return 1.0\n".to_owned(),
        candidate_code: "def f():\n    return 1.0001\n".to_owned(),
        test_cases: vec![vec![]],
        tolerance: Some(1e-3),
    };
    let strict = Job {
        tolerance: None,
        ..job.clone()
    };
    let reports = Validator::new(&caps).compare_batch(&[job, strict]);
    assert!(reports[0].all_matched);
    assert!(!reports[1].all_matched);
}

const FIB: &str = "
def fib(n):
    a, b = 0, 1
    for _ in range(n):
        a, b = b, a + b
    return a
";

const FIB_OFF_BY_ONE: &str = "
def fib(n):
    a, b = 0, 1
    for _ in range(n):
        a, b = b, a + b + 1
    return a
";

#[test]
fn integer_overflow_on_both_sides_is_not_equivalence() {
    for policy in [FailurePolicy::StatusOnly, FailurePolicy::ExactMessage] {
        let options = CompareOptions::default().with_failure_policy(policy);
        let caps = CapabilitySet::standard();
        let report = compare_all(&[vec![Datum::Int(100)]], FIB, FIB_OFF_BY_ONE, &caps, &options);
        assert!(!report.all_matched, "{policy}");
        assert_eq!(report.inconclusive, 1);
        let message = report.outcomes[0].original.failure().unwrap();
        assert!(message.starts_with("OverflowError: "), "{message}");
    }
    let report = run(FIB, FIB_OFF_BY_ONE, &[vec![Datum::Int(10)]]);
    assert!(!report.all_matched);
    assert_eq!(report.inconclusive, 0);
    let report = run(FIB, FIB, &[vec![Datum::Int(90)]]);
    assert!(report.all_matched);
}

#[test]
fn float_overflow_is_a_value_not_a_failure() {
    let original = "def f(a, b):\n    return a * b\n";
    let cases = vec![vec![Datum::Float(1e308), Datum::Float(10.0)]];
    let report = run(original, "def f(a, b):\n    return a * b * 2\n", &cases);
    assert_eq!(
        report.outcomes[0].original,
        InvocationResult::Value(Datum::Float(f64::INFINITY))
    );
    assert!(report.all_matched);
    let report = run(original, "def f(a, b):\n    return a + b\n", &cases);
    assert!(!report.all_matched);
}

#[test]
fn outcomes_record_what_each_side_spent() {
    let cases = vec![vec![ints(&[1, 2, 3, 4, 5, 6, 7, 8])]];
    let report = run(LOOP_SUM, "def arr_sum(arr):\n    return sum(arr)\n", &cases);
    assert!(report.all_matched);
    let outcome = &report.outcomes[0];
    assert!(
        outcome.original_cost.steps > outcome.candidate_cost.steps,
        "{:?} vs {:?}",
        outcome.original_cost,
        outcome.candidate_cost
    );
    assert_eq!(
        report.total_steps(),
        (outcome.original_cost.steps, outcome.candidate_cost.steps)
    );
}
