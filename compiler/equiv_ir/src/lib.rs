//! Equiv IR - shared front-end types.
//!
//! - `Span`, `LineIndex`: source locations
//! - `Name`, `StringInterner`: per-unit interned identifiers and literals
//! - `Token`, `TokenKind`, `TokenList`: cooked token stream
//! - `Arena`, `Module` and node types: flat syntax tree

mod ast;
mod interner;
mod operators;
mod span;
mod token;

pub use ast::{
    Arena, CallArg, Comprehension, ComprehensionKind, Expr, ExprId, ExprKind, FunctionBody,
    FunctionDef, FunctionId, Generator, Module, Param, Stmt, StmtId, StmtKind, Target,
};
pub use interner::{Name, StringInterner};
pub use operators::{BinaryOp, BoolOp, CmpOp, UnaryOp};
pub use span::{LineCol, LineIndex, Span};
pub use token::{Token, TokenKind, TokenList};
