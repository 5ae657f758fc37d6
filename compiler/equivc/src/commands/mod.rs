//! Command handlers for the `equiv` CLI.
//!
//! Each handler returns the JSON to print and the exit code to use; the
//! binary only does the printing. Shared helpers live here in the module
//! root.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::boundary::BoundaryError;
use crate::config::ConfigError;
use crate::exit_codes;

mod batch;
mod check;
mod run;

pub use batch::{batch_files, FileReport};
pub use check::{check_file, check_request};
pub use run::run_file;

/// Errors that stop a command before it produces a result.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Boundary(_) => exit_codes::BOUNDARY,
            CliError::Config(_) | CliError::Io { .. } | CliError::Render(_) => exit_codes::IO,
        }
    }
}

/// What a command prints and how the process exits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutput {
    pub json: String,
    pub exit_code: i32,
}

impl CommandOutput {
    fn new(value: &impl Serialize, matched: bool) -> Result<Self, CliError> {
        Ok(CommandOutput {
            json: serde_json::to_string_pretty(value)?,
            exit_code: if matched {
                exit_codes::OK
            } else {
                exit_codes::MISMATCH
            },
        })
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
