//! Lexer errors.
//!
//! A lexer error aborts the whole unit: the executor reports it as a
//! `SyntaxError` failure with the span's line and column.

use equiv_ir::Span;
use thiserror::Error;

/// A lexer error and where it happened.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { span, kind }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("invalid character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    /// Integer literal does not fit in 64 bits.
    #[error("integer literal too large")]
    IntegerTooLarge,
    #[error("invalid numeric literal")]
    InvalidNumber,
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent,
    #[error("unmatched '{0}'")]
    UnmatchedBracket(char),
    #[error("'{0}' was never closed")]
    UnclosedBracket(char),
}
