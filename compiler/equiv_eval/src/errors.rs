//! Runtime error types.
//!
//! `EvalErrorKind` mirrors the error categories a Python programmer expects
//! (`TypeError`, `KeyError`, ...). Its `Display` output is the category name
//! followed by the message, which is what ends up in a `Failure`.

use equiv_ir::Span;
use thiserror::Error;

/// Result of evaluation.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    #[error("NameError: name '{0}' is not defined")]
    UndefinedName(String),
    #[error(
        "UnboundLocalError: cannot access local variable '{0}' where it is not associated with a value"
    )]
    UnboundLocal(String),
    #[error("TypeError: {0}")]
    Type(String),
    #[error("ValueError: {0}")]
    Value(String),
    #[error("ZeroDivisionError: {0}")]
    ZeroDivision(&'static str),
    #[error("IndexError: {0}")]
    Index(String),
    /// Carries the `repr` of the missing key.
    #[error("KeyError: {0}")]
    Key(String),
    #[error("AttributeError: {0}")]
    Attribute(String),
    #[error("OverflowError: {0}")]
    Overflow(String),
    #[error("MemoryError: {0}")]
    Memory(String),
    #[error("RecursionError: maximum recursion depth exceeded")]
    Recursion,
    #[error("TimeoutError: {0}")]
    Timeout(String),
    #[error("ImportError: __import__ not found")]
    Import,
    #[error("AssertionError{}", .0.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Assertion(Option<String>),
    #[error("RuntimeError: {0}")]
    Runtime(String),
    /// A panic caught inside the interpreter.
    #[error("SystemError: {0}")]
    Internal(String),
}

/// A runtime error with the location of the innermost node that raised it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Option<Span>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError { kind, span: None }
    }

    /// Attach `span` unless a more precise one is already set.
    #[must_use]
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Type(message.into()))
}

pub fn value_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Value(message.into()))
}

pub fn index_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Index(message.into()))
}

pub fn key_error(key: &crate::Value) -> EvalError {
    EvalError::new(EvalErrorKind::Key(crate::format::repr(key)))
}

const INT_OVERFLOW: &str = "integer result does not fit in 64 bits";

/// Failure prefixes of the errors [`EvalErrorKind::is_resource_limit`] accepts.
const RESOURCE_LIMIT_PREFIXES: [&str; 4] = [
    "TimeoutError: ",
    "RecursionError: ",
    "MemoryError: ",
    "OverflowError: integer result does not fit in 64 bits",
];

impl EvalErrorKind {
    /// Raised because this interpreter ran out of steps, time, depth, memory
    /// or integer width, where CPython could have gone on.
    pub fn is_resource_limit(&self) -> bool {
        match self {
            EvalErrorKind::Timeout(_) | EvalErrorKind::Recursion | EvalErrorKind::Memory(_) => {
                true
            }
            EvalErrorKind::Overflow(message) => message == INT_OVERFLOW,
            _ => false,
        }
    }
}

/// Whether a rendered failure came from a resource-limit error.
pub fn is_resource_limit_message(message: &str) -> bool {
    RESOURCE_LIMIT_PREFIXES
        .iter()
        .any(|prefix| message.starts_with(prefix))
}

pub fn overflow() -> EvalError {
    EvalError::new(EvalErrorKind::Overflow(INT_OVERFLOW.to_owned()))
}

pub fn undefined_name(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedName(name.to_owned()))
}

pub fn no_attribute(type_name: &str, attr: &str) -> EvalError {
    EvalError::new(EvalErrorKind::Attribute(format!(
        "'{type_name}' object has no attribute '{attr}'"
    )))
}

pub fn not_callable(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object is not callable"))
}

pub fn not_iterable(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object is not iterable"))
}

pub fn unhashable(type_name: &str) -> EvalError {
    type_error(format!("unhashable type: '{type_name}'"))
}

pub fn unsupported_operands(op: &str, left: &str, right: &str) -> EvalError {
    type_error(format!(
        "unsupported operand type(s) for {op}: '{left}' and '{right}'"
    ))
}

pub fn not_orderable(op: &str, left: &str, right: &str) -> EvalError {
    type_error(format!(
        "'{op}' not supported between instances of '{left}' and '{right}'"
    ))
}

/// `name() takes N arguments (M given)` style arity errors.
pub fn arity(name: &str, expected: &str, got: usize) -> EvalError {
    type_error(format!("{name}() takes {expected} ({got} given)"))
}

pub fn too_large(what: &str) -> EvalError {
    EvalError::new(EvalErrorKind::Memory(format!("{what} too large")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_lead_with_category() {
        assert_eq!(
            undefined_name("sorted").to_string(),
            "NameError: name 'sorted' is not defined"
        );
        assert_eq!(
            EvalError::new(EvalErrorKind::ZeroDivision("division by zero")).to_string(),
            "ZeroDivisionError: division by zero"
        );
        assert_eq!(
            EvalError::new(EvalErrorKind::Assertion(None)).to_string(),
            "AssertionError"
        );
        assert_eq!(
            EvalError::new(EvalErrorKind::Assertion(Some("bad".into()))).to_string(),
            "AssertionError: bad"
        );
    }

    #[test]
    fn resource_limits_are_recognised_from_their_message() {
        let limits = [
            EvalErrorKind::Timeout("step limit of 10 exceeded".into()),
            EvalErrorKind::Recursion,
            EvalErrorKind::Memory("list too large".into()),
            overflow().kind,
        ];
        for kind in limits {
            assert!(kind.is_resource_limit(), "{kind}");
            assert!(is_resource_limit_message(&format!("{kind} (line 4)")), "{kind}");
        }
        let program_errors = [
            EvalErrorKind::Overflow("(34, 'Numerical result out of range')".into()),
            EvalErrorKind::ZeroDivision("division by zero"),
            EvalErrorKind::Assertion(Some("TimeoutError: spoofed".into())),
        ];
        for kind in program_errors {
            assert!(!kind.is_resource_limit(), "{kind}");
            assert!(!is_resource_limit_message(&kind.to_string()), "{kind}");
        }
    }

    #[test]
    fn innermost_span_wins() {
        let err = type_error("x")
            .or_span(Span::new(3, 4))
            .or_span(Span::new(0, 10));
        assert_eq!(err.span, Some(Span::new(3, 4)));
    }
}
