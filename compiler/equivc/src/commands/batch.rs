//! The `batch` command: one report per request file, files validated in
//! parallel.

use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use equiv_validate::{Report, Validator};

use super::{read_file, CliError, CommandOutput};
use crate::boundary::BatchRequest;
use crate::config::Settings;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub report: Report,
}

/// Validate every request file. Any unreadable or rejected file stops the
/// whole batch before execution starts.
pub fn batch_files(paths: &[PathBuf], settings: &Settings) -> Result<CommandOutput, CliError> {
    let mut jobs = Vec::with_capacity(paths.len());
    for path in paths {
        let text = read_file(path)?;
        jobs.push(BatchRequest::from_json(&text)?.into_job());
    }

    let reports = Validator::new(&settings.capabilities)
        .with_options(settings.options)
        .with_limits(settings.limits)
        .compare_batch(&jobs);

    let all_matched = reports.iter().all(|r| r.all_matched);
    info!(files = paths.len(), all_matched, "batch finished");
    let files: Vec<FileReport> = paths
        .iter()
        .zip(reports)
        .map(|(path, report)| FileReport {
            file: path.display().to_string(),
            report,
        })
        .collect();
    CommandOutput::new(&files, all_matched)
}
