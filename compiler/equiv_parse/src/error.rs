//! Parse errors, and the combined syntax error reported for a source unit.

use equiv_ir::{Span, TokenKind};
use equiv_lexer::LexError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
    },
    /// Construct outside the accepted language subset.
    #[error("unsupported syntax: {0}")]
    Unsupported(&'static str),
    #[error("cannot assign to {0}")]
    InvalidTarget(&'static str),
    #[error("expected an indented block")]
    ExpectedIndent,
    #[error("unexpected indent")]
    UnexpectedIndent,
    #[error("'{0}' outside function")]
    OutsideFunction(&'static str),
    #[error("'{0}' outside loop")]
    OutsideLoop(&'static str),
    #[error("non-default argument follows default argument")]
    NonDefaultAfterDefault,
    #[error("duplicate argument '{0}' in function definition")]
    DuplicateParameter(String),
    #[error("positional argument follows keyword argument")]
    PositionalAfterKeyword,
    #[error("Generator expression must be parenthesized")]
    UnparenthesizedGenerator,
}

/// A lex or parse failure, flattened for reporting.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        SyntaxError {
            message: err.to_string(),
            span: err.span,
        }
    }
}

impl From<ParseError> for SyntaxError {
    fn from(err: ParseError) -> Self {
        SyntaxError {
            message: err.to_string(),
            span: err.span,
        }
    }
}
