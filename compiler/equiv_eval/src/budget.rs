//! Execution limits.
//!
//! Every statement, loop iteration and call spends one step. Builtins that
//! walk an iterable spend one step per [`ELEMENTS_PER_STEP`] elements, so
//! `sum(range(10 ** 7))` costs about as much as a loop a sixteenth as long.
//! Exceeding the step budget or the wall-clock deadline aborts the
//! invocation with `TimeoutError`; exceeding the call depth raises
//! `RecursionError`.

use std::time::{Duration, Instant};

use crate::errors::{EvalError, EvalErrorKind, EvalResult};

/// Steps between wall-clock checks.
const CLOCK_INTERVAL: u64 = 1024;

/// Builtin iteration elements charged as one step.
pub const ELEMENTS_PER_STEP: u64 = 16;

/// Resource limits for one invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_steps: u64,
    pub timeout: Duration,
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_steps: 10_000_000,
            timeout: Duration::from_secs(5),
            max_depth: 1000,
        }
    }
}

/// Running counters against a set of [`Limits`].
#[derive(Debug)]
pub struct Budget {
    limits: Limits,
    steps: u64,
    elements: u64,
    deadline: Option<Instant>,
}

impl Budget {
    pub fn new(limits: Limits) -> Self {
        Budget {
            limits,
            steps: 0,
            elements: 0,
            deadline: Instant::now().checked_add(limits.timeout),
        }
    }

    #[inline]
    pub fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(EvalError::new(EvalErrorKind::Timeout(format!(
                "step limit of {} exceeded",
                self.limits.max_steps
            ))));
        }
        if self.steps % CLOCK_INTERVAL == 0 {
            self.check_deadline()?;
        }
        Ok(())
    }

    /// Charge one element of builtin iteration.
    #[inline]
    pub fn tick_element(&mut self) -> EvalResult<()> {
        self.elements += 1;
        if self.elements % ELEMENTS_PER_STEP == 0 {
            self.tick()
        } else {
            Ok(())
        }
    }

    pub fn check_deadline(&self) -> EvalResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err(EvalError::new(EvalErrorKind::Timeout(format!(
                    "execution exceeded {:?}",
                    self.limits.timeout
                ))))
            }
            _ => Ok(()),
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn max_depth(&self) -> usize {
        self.limits.max_depth
    }
}
