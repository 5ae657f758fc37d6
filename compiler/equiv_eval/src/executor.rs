//! Executes a source unit's first function against one argument tuple.
//!
//! Every failure, from a syntax error to a panic inside the interpreter,
//! comes back as [`InvocationResult::Failure`]. Nothing is shared between
//! calls: each one lexes, parses and runs in its own namespace.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, debug_span};

use equiv_ir::{LineIndex, Module, StringInterner};
use equiv_lexer::dedent;
use equiv_parse::parse_source;

use crate::budget::Limits;
use crate::builtins::{Args, CapabilitySet};
use crate::datum::Datum;
use crate::errors::{is_resource_limit_message, EvalError, EvalResult};
use crate::interpreter::Interpreter;

/// Message when a source unit binds nothing callable.
pub const NO_FUNCTION: &str = "no function defined in code";

/// Outcome of one invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationResult {
    Value(Datum),
    /// Error category and message, e.g. `ZeroDivisionError: division by zero (line 2)`.
    Failure(String),
}

impl InvocationResult {
    pub fn is_value(&self) -> bool {
        matches!(self, InvocationResult::Value(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, InvocationResult::Failure(_))
    }

    pub fn value(&self) -> Option<&Datum> {
        match self {
            InvocationResult::Value(datum) => Some(datum),
            InvocationResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            InvocationResult::Value(_) => None,
            InvocationResult::Failure(message) => Some(message),
        }
    }

    /// The invocation was cut short by [`Limits`] or by 64-bit integer
    /// width rather than failing on its own terms.
    pub fn hit_resource_limit(&self) -> bool {
        self.failure().is_some_and(is_resource_limit_message)
    }
}

/// What one invocation spent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cost {
    /// Interpreter steps, defining the source unit included.
    pub steps: u64,
    /// Wall-clock time in microseconds, parsing included.
    pub elapsed_us: u64,
}

/// An [`InvocationResult`] with its [`Cost`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub result: InvocationResult,
    pub cost: Cost,
}

/// Run `source` with default [`Limits`].
pub fn execute(source: &str, capabilities: &CapabilitySet, args: &[Datum]) -> InvocationResult {
    execute_with_limits(source, capabilities, args, Limits::default())
}

/// Define `source` in a fresh namespace, find its first callable binding and
/// call it with `args`.
pub fn execute_with_limits(
    source: &str,
    capabilities: &CapabilitySet,
    args: &[Datum],
    limits: Limits,
) -> InvocationResult {
    execute_measured(source, capabilities, args, limits).result
}

/// [`execute_with_limits`], also reporting the steps and time spent.
pub fn execute_measured(
    source: &str,
    capabilities: &CapabilitySet,
    args: &[Datum],
    limits: Limits,
) -> Execution {
    let span = debug_span!("execute", source_len = source.len(), args = args.len());
    let _guard = span.enter();

    let started = Instant::now();
    let mut steps = 0;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run(source, capabilities, args, limits, &mut steps)
    }));
    let result = match outcome {
        Ok(Ok(datum)) => InvocationResult::Value(datum),
        Ok(Err(message)) => InvocationResult::Failure(message),
        Err(payload) => InvocationResult::Failure(format!(
            "SystemError: {}",
            panic_message(payload.as_ref())
        )),
    };
    let cost = Cost {
        steps,
        elapsed_us: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
    };
    debug!(
        ok = result.is_value(),
        steps = cost.steps,
        elapsed_us = cost.elapsed_us,
        "execution finished"
    );
    Execution { result, cost }
}

fn run(
    source: &str,
    capabilities: &CapabilitySet,
    args: &[Datum],
    limits: Limits,
    steps: &mut u64,
) -> Result<Datum, String> {
    let text = dedent(source);
    let lines = LineIndex::new(&text);
    let mut interner = StringInterner::new();
    let module = parse_source(&text, &mut interner).map_err(|e| {
        debug!(error = %e, "syntax error");
        format!("SyntaxError: {e} ({})", lines.line_col(e.span.start))
    })?;
    debug!(statements = module.body.len(), "parsed");

    let describe = |e: EvalError| match e.span {
        Some(span) => format!("{e} (line {})", lines.line(span.start)),
        None => e.to_string(),
    };

    let mut interpreter = Interpreter::new(&module, &interner, capabilities, limits);
    let outcome = invoke(&mut interpreter, &module, &interner, args, describe);
    *steps = interpreter.steps();
    outcome
}

fn invoke(
    interpreter: &mut Interpreter<'_>,
    module: &Module,
    interner: &StringInterner,
    args: &[Datum],
    describe: impl Fn(EvalError) -> String,
) -> Result<Datum, String> {
    interpreter.run_module(module).map_err(&describe)?;

    let Some((name, callee)) = interpreter
        .module_bindings()
        .into_iter()
        .find(|(_, value)| value.is_callable())
    else {
        return Err(NO_FUNCTION.to_owned());
    };
    debug!(function = interner.lookup(name), "discovered callable");

    let args = args
        .iter()
        .map(Datum::to_value)
        .collect::<EvalResult<Vec<_>>>()
        .map_err(&describe)?;
    let result = interpreter
        .call_value(&callee, Args::positional(args))
        .map_err(&describe)?;
    debug!(steps = interpreter.steps(), "invocation returned");
    Datum::from_value(&result, interpreter.budget_mut()).map_err(&describe)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "interpreter panicked".to_owned()
    }
}
