//! Running test cases against an original and a candidate implementation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use equiv_eval::{execute_measured, CapabilitySet, Limits};

use crate::compare::{compare, CompareOptions};
use crate::kind::ValueKind;
use crate::report::{ComparisonOutcome, Report, TestCase};

/// Stack size of batch worker threads. The interpreter grows its stack on
/// demand; a larger initial stack keeps deep recursion off the slow path.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// One independent validation request in a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub original_code: String,
    pub candidate_code: String,
    pub test_cases: Vec<TestCase>,
    /// Overrides the validator's tolerance for this job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

/// Runs both implementations under one capability set and set of limits.
#[derive(Clone, Copy, Debug)]
pub struct Validator<'caps> {
    capabilities: &'caps CapabilitySet,
    options: CompareOptions,
    limits: Limits,
}

impl<'caps> Validator<'caps> {
    pub fn new(capabilities: &'caps CapabilitySet) -> Self {
        Validator {
            capabilities,
            options: CompareOptions::default(),
            limits: Limits::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Run every test case against `original` then `candidate`, in order.
    pub fn compare_all(&self, test_cases: &[TestCase], original: &str, candidate: &str) -> Report {
        self.run(test_cases, original, candidate, &self.options)
    }

    fn run(
        &self,
        test_cases: &[TestCase],
        original: &str,
        candidate: &str,
        options: &CompareOptions,
    ) -> Report {
        let span = info_span!("compare_all", cases = test_cases.len());
        let _guard = span.enter();

        let report: Report = test_cases
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let original_run =
                    execute_measured(original, self.capabilities, input, self.limits);
                let candidate_run =
                    execute_measured(candidate, self.capabilities, input, self.limits);
                let matched = compare(&original_run.result, &candidate_run.result, options);
                let outcome = ComparisonOutcome {
                    index,
                    input: input.clone(),
                    original: original_run.result,
                    candidate: candidate_run.result,
                    matched,
                    original_cost: original_run.cost,
                    candidate_cost: candidate_run.cost,
                };
                if !matched {
                    debug!(
                        index,
                        original = %ValueKind::of(&outcome.original),
                        candidate = %ValueKind::of(&outcome.candidate),
                        inconclusive = outcome.inconclusive(),
                        "outcome mismatch"
                    );
                }
                outcome
            })
            .collect();

        let (original_steps, candidate_steps) = report.total_steps();
        info!(
            all_matched = report.all_matched,
            passed = report.passed,
            failed = report.failed,
            inconclusive = report.inconclusive,
            original_steps,
            candidate_steps,
            "validation finished"
        );
        report
    }

    fn run_job(&self, job: &Job) -> Report {
        let options = match job.tolerance {
            Some(tolerance) => self.options.with_tolerance(tolerance),
            None => self.options,
        };
        self.run(&job.test_cases, &job.original_code, &job.candidate_code, &options)
    }

    /// Validate independent jobs in parallel. Reports come back in job order.
    ///
    /// Each job still runs its own test cases one after another.
    pub fn compare_batch(&self, jobs: &[Job]) -> Vec<Report> {
        match rayon::ThreadPoolBuilder::new()
            .stack_size(WORKER_STACK_SIZE)
            .build()
        {
            Ok(pool) => pool.install(|| jobs.par_iter().map(|job| self.run_job(job)).collect()),
            Err(e) => {
                warn!(error = %e, "thread pool unavailable, validating jobs sequentially");
                jobs.iter().map(|job| self.run_job(job)).collect()
            }
        }
    }
}

/// Run `test_cases` against both sources with default limits.
pub fn compare_all(
    test_cases: &[TestCase],
    original: &str,
    candidate: &str,
    capabilities: &CapabilitySet,
    options: &CompareOptions,
) -> Report {
    Validator::new(capabilities)
        .with_options(*options)
        .compare_all(test_cases, original, candidate)
}
