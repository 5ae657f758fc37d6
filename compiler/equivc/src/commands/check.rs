//! The `check` command: run one argument tuple against both implementations.

use std::path::Path;
use tracing::info;

use equiv_eval::execute_measured;
use equiv_validate::compare;

use super::{read_file, CliError, CommandOutput};
use crate::boundary::{TestCodeRequest, TestCodeResponse};
use crate::config::Settings;

/// Read a [`TestCodeRequest`] from `path` and compare both outputs.
pub fn check_file(path: &Path, settings: &Settings) -> Result<CommandOutput, CliError> {
    let text = read_file(path)?;
    let request = TestCodeRequest::from_json(&text)?;
    let response = check_request(&request, settings);
    CommandOutput::new(&response, response.outputs_match)
}

/// Execute a validated request.
pub fn check_request(request: &TestCodeRequest, settings: &Settings) -> TestCodeResponse {
    let run = |code: &str| {
        execute_measured(
            code,
            &settings.capabilities,
            &request.test_case_inputs,
            settings.limits,
        )
    };
    let original = run(&request.original_code);
    let optimized = run(&request.optimized_code);
    let matched = compare(&original.result, &optimized.result, &settings.options);
    info!(
        matched,
        original_steps = original.cost.steps,
        optimized_steps = optimized.cost.steps,
        "check finished"
    );
    TestCodeResponse::new(&original, &optimized, matched)
}
