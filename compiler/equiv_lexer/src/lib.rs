//! Equiv lexer.
//!
//! Two layers: logos recognizes raw tokens (`raw_token`), and the cooker
//! decodes literals, interns names and synthesizes indentation tokens.
//! Callers normally run [`dedent`] first so that block-indented snippets lex
//! as top-level code.

mod cooker;
mod dedent;
mod escape;
mod lex_error;
mod raw_token;

pub use dedent::dedent;
pub use lex_error::{LexError, LexErrorKind};

use equiv_ir::{StringInterner, TokenList};

/// Lex `source` into a token stream terminated by `Eof`.
///
/// # Errors
/// Returns the first [`LexError`]; lexing does not recover.
pub fn lex(source: &str, interner: &mut StringInterner) -> Result<TokenList, LexError> {
    cooker::Cooker::new(source, interner).run()
}

#[cfg(test)]
mod tests;
