//! Stack growth for deeply nested source units.
//!
//! Untrusted source can nest expressions (`((((...))))`) or recurse through
//! user functions far deeper than the host thread's stack allows. The parser
//! and the interpreter wrap their recursive entry points in
//! [`ensure_sufficient_stack`] so that nesting is bounded by the configured
//! recursion limit, never by a host stack overflow that would abort the
//! whole process.
//!
//! On native targets the `stacker` crate allocates a new stack segment when
//! the remaining space drops below the red zone. On `wasm32` the closure is
//! called directly.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each additional stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
