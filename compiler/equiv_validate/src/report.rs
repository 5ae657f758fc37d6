//! Comparison outcomes and their aggregate.

use equiv_eval::{Cost, Datum, InvocationResult};
use serde::{Deserialize, Serialize};

/// One ordered argument tuple.
pub type TestCase = Vec<Datum>;

/// Result of running one test case against both implementations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutcome {
    /// Position of the test case in the input.
    pub index: usize,
    pub input: TestCase,
    pub original: InvocationResult,
    pub candidate: InvocationResult,
    pub matched: bool,
    #[serde(default)]
    pub original_cost: Cost,
    #[serde(default)]
    pub candidate_cost: Cost,
}

impl ComparisonOutcome {
    /// Either side stopped at an interpreter limit, so the verdict says
    /// nothing about equivalence.
    pub fn inconclusive(&self) -> bool {
        self.original.hit_resource_limit() || self.candidate.hit_resource_limit()
    }
}

/// Ordered outcomes of a validation run.
///
/// `all_matched` is the conjunction of every outcome's `matched`, so an
/// empty report is vacuously matched. `inconclusive` counts the failed
/// outcomes where a side hit an interpreter limit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub outcomes: Vec<ComparisonOutcome>,
    pub all_matched: bool,
    pub passed: usize,
    pub failed: usize,
    #[serde(default)]
    pub inconclusive: usize,
}

impl Default for Report {
    fn default() -> Self {
        Report {
            outcomes: Vec::new(),
            all_matched: true,
            passed: 0,
            failed: 0,
            inconclusive: 0,
        }
    }
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    pub fn add_outcome(&mut self, outcome: ComparisonOutcome) {
        if outcome.matched {
            self.passed += 1;
        } else {
            self.failed += 1;
            self.all_matched = false;
            if outcome.inconclusive() {
                self.inconclusive += 1;
            }
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Total steps spent by each side, original first.
    pub fn total_steps(&self) -> (u64, u64) {
        self.outcomes.iter().fold((0, 0), |(o, c), outcome| {
            (
                o.saturating_add(outcome.original_cost.steps),
                c.saturating_add(outcome.candidate_cost.steps),
            )
        })
    }

    /// Outcomes that did not match, in input order.
    pub fn mismatches(&self) -> impl Iterator<Item = &ComparisonOutcome> {
        self.outcomes.iter().filter(|o| !o.matched)
    }
}

impl FromIterator<ComparisonOutcome> for Report {
    fn from_iter<I: IntoIterator<Item = ComparisonOutcome>>(iter: I) -> Self {
        let mut report = Report::new();
        for outcome in iter {
            report.add_outcome(outcome);
        }
        report
    }
}
