//! Request boundary.
//!
//! Requests are decoded and validated here, before any source is executed.
//! A rejected request is a [`BoundaryError`]; a broken submission is not,
//! it comes back as a `Failure` inside a normal response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use equiv_eval::{Cost, Datum, Execution, InvocationResult};
use equiv_validate::{Job, TestCase};

/// Why a request was rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BoundaryError {
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("'{0}' is required and must not be empty")]
    MissingField(&'static str),
    #[error("tolerance must be a finite, non-negative number, got {0}")]
    InvalidTolerance(f64),
}

impl BoundaryError {
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

/// Body returned for a rejected request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, BoundaryError> {
    serde_json::from_str(text).map_err(|e| BoundaryError::Malformed(e.to_string()))
}

fn require_code(field: &'static str, code: &str) -> Result<(), BoundaryError> {
    if code.trim().is_empty() {
        return Err(BoundaryError::MissingField(field));
    }
    Ok(())
}

fn reject<T>(result: Result<T, BoundaryError>) -> Result<T, BoundaryError> {
    if let Err(e) = &result {
        warn!(error = %e, "request rejected");
    }
    result
}

/// One invocation of each implementation with the same arguments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestCodeRequest {
    pub original_code: String,
    pub optimized_code: String,
    /// Argument tuple for the single invocation.
    pub test_case_inputs: TestCase,
}

impl TestCodeRequest {
    pub fn from_json(text: &str) -> Result<Self, BoundaryError> {
        reject(decode::<Self>(text).and_then(|request| {
            request.validate()?;
            Ok(request)
        }))
    }

    pub fn validate(&self) -> Result<(), BoundaryError> {
        require_code("originalCode", &self.original_code)?;
        require_code("optimizedCode", &self.optimized_code)?;
        if self.test_case_inputs.is_empty() {
            return Err(BoundaryError::MissingField("testCaseInputs"));
        }
        Ok(())
    }
}

/// A result as shown to the caller: the value itself, or `"Error: <message>"`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    Value(Datum),
    Error(String),
}

impl From<&InvocationResult> for Output {
    fn from(result: &InvocationResult) -> Self {
        match result {
            InvocationResult::Value(datum) => Output::Value(datum.clone()),
            InvocationResult::Failure(message) => Output::Error(format!("Error: {message}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCodeResponse {
    pub status: bool,
    pub original_output: Output,
    pub optimized_output: Output,
    pub outputs_match: bool,
    /// Steps and time each side spent.
    pub original_cost: Cost,
    pub optimized_cost: Cost,
}

impl TestCodeResponse {
    pub fn new(original: &Execution, optimized: &Execution, matched: bool) -> Self {
        TestCodeResponse {
            status: true,
            original_output: (&original.result).into(),
            optimized_output: (&optimized.result).into(),
            outputs_match: matched,
            original_cost: original.cost,
            optimized_cost: optimized.cost,
        }
    }
}

/// Several argument tuples against the same pair of implementations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchRequest {
    pub original_code: String,
    pub optimized_code: String,
    pub test_cases: Vec<TestCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl BatchRequest {
    pub fn from_json(text: &str) -> Result<Self, BoundaryError> {
        reject(decode::<Self>(text).and_then(|request| {
            request.validate()?;
            Ok(request)
        }))
    }

    pub fn validate(&self) -> Result<(), BoundaryError> {
        require_code("originalCode", &self.original_code)?;
        require_code("optimizedCode", &self.optimized_code)?;
        if self.test_cases.is_empty() {
            return Err(BoundaryError::MissingField("testCases"));
        }
        match self.tolerance {
            Some(t) if !t.is_finite() || t < 0.0 => Err(BoundaryError::InvalidTolerance(t)),
            _ => Ok(()),
        }
    }

    pub fn into_job(self) -> Job {
        Job {
            original_code: self.original_code,
            candidate_code: self.optimized_code,
            test_cases: self.test_cases,
            tolerance: self.tolerance,
        }
    }
}

/// Decode a `--args` value: a JSON array holding one argument tuple.
pub fn parse_args(text: &str) -> Result<Vec<Datum>, BoundaryError> {
    reject(decode(text))
}

#[cfg(test)]
mod tests;
