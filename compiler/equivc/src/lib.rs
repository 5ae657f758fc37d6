//! Equiv CLI library.
//!
//! - `boundary`: JSON request decoding, validation and response rendering
//! - `config`: `equiv.toml` settings and command-line overrides
//! - `commands`: the `check`, `batch` and `run` subcommands
//! - `logging`: tracing subscriber setup
//! - `exit_codes`: process exit statuses

pub mod boundary;
pub mod commands;
pub mod config;
pub mod exit_codes;
pub mod logging;

pub use boundary::{BatchRequest, BoundaryError, Output, TestCodeRequest, TestCodeResponse};
pub use commands::{batch_files, check_file, run_file, CliError, CommandOutput};
pub use config::{ConfigError, EquivConfig, Overrides, Settings};
