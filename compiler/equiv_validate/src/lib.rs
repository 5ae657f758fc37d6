//! Equivalence checking for a pair of function implementations.
//!
//! Both implementations run through the sandboxed executor once per test
//! case; their results are compared with [`compare`] and folded into a
//! [`Report`].
//!
//! - `kind`: value-kind dispatch for comparison
//! - `compare`: the matching rule and its options
//! - `report`: per-case outcomes and the aggregate
//! - `validator`: running test cases, sequentially or as a parallel batch

mod compare;
mod kind;
mod report;
mod validator;

pub use compare::{
    compare, values_match, CompareOptions, FailurePolicy, ParsePolicyError, DEFAULT_TOLERANCE,
};
pub use kind::ValueKind;
pub use report::{ComparisonOutcome, Report, TestCase};
pub use validator::{compare_all, Job, Validator};
