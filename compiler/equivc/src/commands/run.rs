//! The `run` command: execute a single source file.

use std::path::Path;
use tracing::info;

use equiv_eval::execute_with_limits;

use super::{read_file, CliError, CommandOutput};
use crate::boundary::parse_args;
use crate::config::Settings;

/// Execute the first function in `path` with the JSON argument tuple `args`.
pub fn run_file(path: &Path, args: &str, settings: &Settings) -> Result<CommandOutput, CliError> {
    let source = read_file(path)?;
    let args = parse_args(args)?;
    let result = execute_with_limits(&source, &settings.capabilities, &args, settings.limits);
    info!(ok = result.is_value(), "run finished");
    CommandOutput::new(&result, result.is_value())
}
