//! Stable exit codes for `equiv` commands.

/// Every comparison matched, or `run` returned a value.
pub const OK: i32 = 0;
/// At least one comparison mismatched, or `run` returned a failure.
pub const MISMATCH: i32 = 1;
/// The request was rejected before anything was executed.
pub const BOUNDARY: i32 = 2;
/// A file could not be read or the configuration is invalid.
pub const IO: i32 = 3;
