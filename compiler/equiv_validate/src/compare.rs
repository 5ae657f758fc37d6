//! The matching rule between two invocation results.

use equiv_eval::{Datum, InvocationResult};
use equiv_stack::ensure_sufficient_stack;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::kind::ValueKind;

/// Relative tolerance used when none is configured.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Lower bound on the magnitude the tolerance is scaled by, so that values
/// near zero are not held to an exact match.
const SCALE_FLOOR: f64 = 1e-12;

/// How two failures are compared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Two failures match whatever their messages say, unless either one
    /// hit an interpreter limit.
    #[default]
    StatusOnly,
    /// Two failures match only if their messages are identical.
    ExactMessage,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::StatusOnly => "status-only",
            FailurePolicy::ExactMessage => "exact-message",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown failure policy '{0}' (expected 'status-only' or 'exact-message')")]
pub struct ParsePolicyError(String);

impl FromStr for FailurePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status-only" => Ok(FailurePolicy::StatusOnly),
            "exact-message" => Ok(FailurePolicy::ExactMessage),
            other => Err(ParsePolicyError(other.to_owned())),
        }
    }
}

/// Knobs of the matching rule.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompareOptions {
    /// Relative tolerance for float comparison.
    pub tolerance: f64,
    pub failure_policy: FailurePolicy,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            tolerance: DEFAULT_TOLERANCE,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl CompareOptions {
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Whether a candidate result is equivalent to the original one.
///
/// A side cut short by an interpreter limit never matches, whatever the
/// failure policy: its real result is unknown.
pub fn compare(
    original: &InvocationResult,
    candidate: &InvocationResult,
    options: &CompareOptions,
) -> bool {
    if original.hit_resource_limit() || candidate.hit_resource_limit() {
        return false;
    }
    match (original, candidate) {
        (InvocationResult::Failure(a), InvocationResult::Failure(b)) => {
            match options.failure_policy {
                FailurePolicy::StatusOnly => true,
                FailurePolicy::ExactMessage => a == b,
            }
        }
        (InvocationResult::Value(a), InvocationResult::Value(b)) => {
            values_match(a, b, options.tolerance)
        }
        _ => false,
    }
}

/// Structural comparison of two values.
///
/// Numbers are compared with the tolerance rule wherever they appear;
/// sequences element-wise; mappings and sets ignore order.
pub fn values_match(a: &Datum, b: &Datum, tolerance: f64) -> bool {
    let kind = ValueKind::of_datum(a);
    if kind != ValueKind::of_datum(b) {
        return false;
    }
    ensure_sufficient_stack(|| match kind {
        ValueKind::Number => numbers_match(a, b, tolerance),
        ValueKind::Sequence => match (a, b) {
            (Datum::List(x), Datum::List(y)) | (Datum::Tuple(x), Datum::Tuple(y)) => {
                x.len() == y.len()
                    && x.iter().zip(y).all(|(p, q)| values_match(p, q, tolerance))
            }
            _ => false,
        },
        ValueKind::Mapping => match (a, b) {
            (Datum::Dict(x), Datum::Dict(y)) => unordered_match(x, y, |(k1, v1), (k2, v2)| {
                values_match(k1, k2, tolerance) && values_match(v1, v2, tolerance)
            }),
            _ => false,
        },
        ValueKind::Set => match (a, b) {
            (Datum::Set(x), Datum::Set(y)) => {
                unordered_match(x, y, |p, q| values_match(p, q, tolerance))
            }
            _ => false,
        },
        ValueKind::Null
        | ValueKind::Boolean
        | ValueKind::Text
        | ValueKind::Opaque
        | ValueKind::Error => a == b,
    })
}

/// Two `int`s compare exactly. Otherwise the pair is close when
/// `|a - b| <= tolerance * max(|a|, |b|, 1e-12)`; equal infinities match.
#[allow(clippy::cast_precision_loss, reason = "float comparison of an int")]
fn numbers_match(a: &Datum, b: &Datum, tolerance: f64) -> bool {
    let as_f64 = |d: &Datum| match d {
        Datum::Int(i) => Some(*i as f64),
        Datum::Float(f) => Some(*f),
        _ => None,
    };
    match (a, b) {
        (Datum::Int(x), Datum::Int(y)) => x == y,
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => floats_close(x, y, tolerance),
            _ => false,
        },
    }
}

#[allow(clippy::float_cmp, reason = "exact shortcut before the tolerance check")]
fn floats_close(a: f64, b: f64, tolerance: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(SCALE_FLOOR)
}

/// Pair every element of `xs` with a distinct element of `ys`.
fn unordered_match<T>(xs: &[T], ys: &[T], matches: impl Fn(&T, &T) -> bool) -> bool {
    if xs.len() != ys.len() {
        return false;
    }
    let mut used = vec![false; ys.len()];
    xs.iter().all(|x| {
        let hit = ys
            .iter()
            .enumerate()
            .find(|(i, y)| !used[*i] && matches(x, y))
            .map(|(i, _)| i);
        match hit {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

#[cfg(test)]
mod tests;
