//! Sandboxed execution of untrusted function source.
//!
//! [`execute`] runs a source unit written in a Python-compatible subset:
//! it defines the unit in an isolated namespace whose only builtins are a
//! [`CapabilitySet`], calls the first function it defines, and returns an
//! [`InvocationResult`]. Imports, file handles and the network are not part
//! of the language surface at all.

mod budget;
mod builtins;
mod datum;
mod environment;
mod errors;
mod executor;
pub mod format;
mod interpreter;
mod methods;
mod operators;
mod value;

pub use budget::{Budget, Limits};
pub use builtins::{Builtin, CapabilitySet};
pub use datum::Datum;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use executor::{
    execute, execute_measured, execute_with_limits, Cost, Execution, InvocationResult,
    NO_FUNCTION,
};
pub use value::Value;
