use super::*;
use equiv_ir::{Span, TokenKind};
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> (Vec<TokenKind>, StringInterner) {
    let mut interner = StringInterner::new();
    let tokens = lex(source, &mut interner).unwrap();
    (tokens.kinds(), interner)
}

fn error_kind(source: &str) -> LexErrorKind {
    let mut interner = StringInterner::new();
    lex(source, &mut interner).unwrap_err().kind
}

#[test]
fn empty_source_is_just_eof() {
    let (k, _) = kinds("");
    assert_eq!(k, vec![TokenKind::Eof]);
}

#[test]
fn simple_assignment() {
    let (k, mut interner) = kinds("x = 42");
    let x = interner.intern("x");
    assert_eq!(
        k,
        vec![
            TokenKind::Ident(x),
            TokenKind::Eq,
            TokenKind::Int(42),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn function_block_indents_and_dedents() {
    let (k, mut interner) = kinds("def f(a):\n    return a\nf(1)\n");
    let f = interner.intern("f");
    let a = interner.intern("a");
    assert_eq!(
        k,
        vec![
            TokenKind::Def,
            TokenKind::Ident(f),
            TokenKind::LParen,
            TokenKind::Ident(a),
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Return,
            TokenKind::Ident(a),
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Ident(f),
            TokenKind::LParen,
            TokenKind::Int(1),
            TokenKind::RParen,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn open_blocks_close_at_eof() {
    let (k, _) = kinds("if True:\n    if True:\n        pass");
    let tail: Vec<_> = k[k.len() - 4..].to_vec();
    assert_eq!(
        tail,
        vec![
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Dedent,
            TokenKind::Eof
        ]
    );
}

#[test]
fn blank_and_comment_lines_are_not_significant() {
    let (k, _) = kinds("x = 1\n\n    # note\n\ny = 2\n");
    assert_eq!(
        k.iter().filter(|t| **t == TokenKind::Newline).count(),
        2,
        "{k:?}"
    );
    assert!(!k.contains(&TokenKind::Indent));
}

#[test]
fn newlines_inside_brackets_are_ignored() {
    let (k, _) = kinds("x = [\n    1,\n  2,\n]\n");
    assert_eq!(
        k,
        vec![
            k[0],
            TokenKind::Eq,
            TokenKind::LBracket,
            TokenKind::Int(1),
            TokenKind::Comma,
            TokenKind::Int(2),
            TokenKind::Comma,
            TokenKind::RBracket,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn tabs_advance_to_next_tab_stop() {
    let (k, _) = kinds("if True:\n\tx = 1\n        y = 2\n");
    assert_eq!(k.iter().filter(|t| **t == TokenKind::Indent).count(), 1);
}

#[test]
fn inconsistent_dedent_is_an_error() {
    assert_eq!(
        error_kind("if True:\n    x = 1\n  y = 2\n"),
        LexErrorKind::InconsistentDedent
    );
}

#[test]
fn numeric_literals() {
    let (k, _) = kinds("1_000 0x1F 0o17 0b101 2.5 1e3 .5");
    assert_eq!(
        &k[..7],
        &[
            TokenKind::Int(1000),
            TokenKind::Int(31),
            TokenKind::Int(15),
            TokenKind::Int(5),
            TokenKind::Float(2.5),
            TokenKind::Float(1000.0),
            TokenKind::Float(0.5),
        ]
    );
}

#[test]
fn oversized_integer_literal() {
    assert_eq!(
        error_kind("99999999999999999999"),
        LexErrorKind::IntegerTooLarge
    );
}

#[test]
fn string_literals_are_unescaped_and_interned() {
    let (k, interner) = kinds(r#"'a\tb' "c" r"\d""#);
    let strings: Vec<&str> = k
        .iter()
        .filter_map(|t| match t {
            TokenKind::Str(name) => Some(interner.lookup(*name)),
            _ => None,
        })
        .collect();
    assert_eq!(strings, vec!["a\tb", "c", "\\d"]);
}

#[test]
fn triple_quoted_string_spans_lines() {
    let (k, interner) = kinds("s = \"\"\"one\ntwo\"\"\"\n");
    let TokenKind::Str(name) = k[2] else {
        panic!("expected string, got {:?}", k[2]);
    };
    assert_eq!(interner.lookup(name), "one\ntwo");
    assert_eq!(k[3], TokenKind::Newline);
}

#[test]
fn unterminated_strings() {
    assert_eq!(error_kind("x = 'abc"), LexErrorKind::UnterminatedString);
    assert_eq!(error_kind("x = '''abc"), LexErrorKind::UnterminatedString);
}

#[test]
fn unexpected_character_has_span() {
    let mut interner = StringInterner::new();
    let err = lex("x = 1 $ 2", &mut interner).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('$'));
    assert_eq!(err.span, Span::new(6, 7));
}

#[test]
fn bracket_mismatches() {
    assert_eq!(error_kind("f(1]"), LexErrorKind::UnmatchedBracket(']'));
    assert_eq!(error_kind("f(1"), LexErrorKind::UnclosedBracket('('));
}

#[test]
fn reserved_keywords_lex_as_keywords() {
    let (k, _) = kinds("class try yield");
    assert_eq!(&k[..3], &[TokenKind::Class, TokenKind::Try, TokenKind::Yield]);
}

#[test]
fn augmented_operators() {
    let (k, _) = kinds("a //= 2; b **= 3");
    assert!(k.contains(&TokenKind::DoubleSlashEq));
    assert!(k.contains(&TokenKind::DoubleStarEq));
    assert!(k.contains(&TokenKind::Semicolon));
}

#[test]
fn backslash_continuation_joins_lines() {
    let (k, _) = kinds("x = 1 + \\\n    2\n");
    assert_eq!(k.iter().filter(|t| **t == TokenKind::Newline).count(), 1);
    assert!(!k.contains(&TokenKind::Indent));
}

#[test]
fn dedent_then_lex_block_snippet() {
    let source = dedent("    def f():\n        return 1\n");
    let (k, _) = kinds(&source);
    assert_eq!(k[0], TokenKind::Def);
}
