//! Token cooking: raw logos tokens to the parser's token stream.
//!
//! Cooking decodes literal payloads, interns identifiers and strings, and
//! turns line structure into `Newline` / `Indent` / `Dedent` tokens. Line
//! breaks inside brackets are not significant.

use crate::escape::unescape;
use crate::lex_error::{LexError, LexErrorKind};
use crate::raw_token::RawToken;
use equiv_ir::{Span, StringInterner, Token, TokenKind, TokenList};
use logos::Logos;
use std::num::IntErrorKind;

const TAB_STOP: u32 = 8;

pub(crate) struct Cooker<'src, 'int> {
    source: &'src str,
    interner: &'int mut StringInterner,
    tokens: TokenList,
    /// Indentation widths of the open blocks; the bottom entry is always 0.
    indents: Vec<u32>,
    /// Open brackets with their spans.
    brackets: Vec<(char, Span)>,
    at_line_start: bool,
}

impl<'src, 'int> Cooker<'src, 'int> {
    pub(crate) fn new(source: &'src str, interner: &'int mut StringInterner) -> Self {
        Cooker {
            source,
            interner,
            tokens: TokenList::new(),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
        }
    }

    pub(crate) fn run(mut self) -> Result<TokenList, LexError> {
        let mut raw = RawToken::lexer(self.source);
        while let Some(result) = raw.next() {
            let range = raw.span();
            let span = Span::from_range(range.clone());
            let slice = raw.slice();
            let Ok(token) = result else {
                return Err(self.unrecognized(range.start, span));
            };

            if token == RawToken::Newline {
                if self.brackets.is_empty() {
                    self.end_line(span);
                }
                continue;
            }

            if self.at_line_start {
                self.at_line_start = false;
                self.apply_indentation(range.start)?;
            }

            let kind = self.cook(token, slice, span)?;
            self.tokens.push(Token::new(kind, span));
        }
        self.finish()
    }

    fn unrecognized(&self, offset: usize, span: Span) -> LexError {
        let rest = self.source.get(offset..).unwrap_or("");
        let mut chars = rest.chars();
        let first = chars.next().unwrap_or('\0');
        let second = chars.next();
        let opens_string = matches!(first, '"' | '\'')
            || (matches!(first, 'r' | 'R') && matches!(second, Some('"' | '\'')));
        if opens_string {
            LexError::new(LexErrorKind::UnterminatedString, span)
        } else {
            LexError::new(
                LexErrorKind::UnexpectedCharacter(first),
                Span::from_range(offset..offset + first.len_utf8()),
            )
        }
    }

    fn end_line(&mut self, span: Span) {
        if !matches!(self.tokens.last_kind(), None | Some(TokenKind::Newline)) {
            self.tokens.push(Token::new(TokenKind::Newline, Span::point(span.start)));
        }
        self.at_line_start = true;
    }

    /// Width of the whitespace between the start of the line and `offset`.
    fn indent_width(&self, offset: usize) -> u32 {
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let mut width = 0;
        for c in self.source[line_start..offset].chars() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / TAB_STOP + 1) * TAB_STOP,
                '\x0C' => width = 0,
                _ => {}
            }
        }
        width
    }

    fn apply_indentation(&mut self, offset: usize) -> Result<(), LexError> {
        let width = self.indent_width(offset);
        let at = Span::point(u32::try_from(offset).unwrap_or(u32::MAX));
        let current = self.indents.last().copied().unwrap_or(0);

        if width > current {
            self.indents.push(width);
            self.tokens.push(Token::new(TokenKind::Indent, at));
            return Ok(());
        }
        while self.indents.last().is_some_and(|&top| top > width) {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, at));
        }
        if self.indents.last().copied().unwrap_or(0) != width {
            return Err(LexError::new(LexErrorKind::InconsistentDedent, at));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<TokenList, LexError> {
        if let Some(&(open, span)) = self.brackets.last() {
            return Err(LexError::new(LexErrorKind::UnclosedBracket(open), span));
        }
        let end = Span::point(u32::try_from(self.source.len()).unwrap_or(u32::MAX));
        if !matches!(self.tokens.last_kind(), None | Some(TokenKind::Newline)) {
            self.tokens.push(Token::new(TokenKind::Newline, end));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, end));
        }
        self.tokens.push(Token::new(TokenKind::Eof, end));
        Ok(self.tokens)
    }

    fn open(&mut self, c: char, span: Span) {
        self.brackets.push((c, span));
    }

    fn close(&mut self, c: char, span: Span) -> Result<(), LexError> {
        let expected = match c {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        match self.brackets.pop() {
            Some((open, _)) if open == expected => Ok(()),
            _ => Err(LexError::new(LexErrorKind::UnmatchedBracket(c), span)),
        }
    }

    fn cook(&mut self, token: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
        let kind = match token {
            RawToken::Int => TokenKind::Int(parse_int(slice, 10, span)?),
            RawToken::HexInt => TokenKind::Int(parse_int(&slice[2..], 16, span)?),
            RawToken::OctInt => TokenKind::Int(parse_int(&slice[2..], 8, span)?),
            RawToken::BinInt => TokenKind::Int(parse_int(&slice[2..], 2, span)?),
            RawToken::Float => TokenKind::Float(parse_float(slice, span)?),
            RawToken::Str => TokenKind::Str(self.string(slice, 1)),
            RawToken::TripleStr => TokenKind::Str(self.string(slice, 3)),
            RawToken::Ident => TokenKind::Ident(self.interner.intern(slice)),
            RawToken::LParen => {
                self.open('(', span);
                TokenKind::LParen
            }
            RawToken::LBracket => {
                self.open('[', span);
                TokenKind::LBracket
            }
            RawToken::LBrace => {
                self.open('{', span);
                TokenKind::LBrace
            }
            RawToken::RParen => {
                self.close(')', span)?;
                TokenKind::RParen
            }
            RawToken::RBracket => {
                self.close(']', span)?;
                TokenKind::RBracket
            }
            RawToken::RBrace => {
                self.close('}', span)?;
                TokenKind::RBrace
            }
            other => fixed_kind(other),
        };
        Ok(kind)
    }

    /// Strip prefix and quotes, process escapes unless raw, and intern.
    fn string(&mut self, slice: &str, quote_len: usize) -> equiv_ir::Name {
        let raw = slice.starts_with(['r', 'R']);
        let inner = if raw { &slice[1..] } else { slice };
        let body = inner
            .get(quote_len..inner.len().saturating_sub(quote_len))
            .unwrap_or("");
        if raw {
            self.interner.intern(body)
        } else {
            let value = unescape(body);
            self.interner.intern(&value)
        }
    }
}

fn parse_int(digits: &str, radix: u32, span: Span) -> Result<i64, LexError> {
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    i64::from_str_radix(&cleaned, radix).map_err(|e| {
        let kind = match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => LexErrorKind::IntegerTooLarge,
            _ => LexErrorKind::InvalidNumber,
        };
        LexError::new(kind, span)
    })
}

fn parse_float(text: &str, span: Span) -> Result<f64, LexError> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| LexError::new(LexErrorKind::InvalidNumber, span))
}

/// Kinds for tokens that carry no payload.
fn fixed_kind(token: RawToken) -> TokenKind {
    match token {
        RawToken::Def => TokenKind::Def,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::While => TokenKind::While,
        RawToken::In => TokenKind::In,
        RawToken::Not => TokenKind::Not,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Is => TokenKind::Is,
        RawToken::None => TokenKind::None,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Pass => TokenKind::Pass,
        RawToken::Lambda => TokenKind::Lambda,
        RawToken::Import => TokenKind::Import,
        RawToken::From => TokenKind::From,
        RawToken::As => TokenKind::As,
        RawToken::Del => TokenKind::Del,
        RawToken::Assert => TokenKind::Assert,
        RawToken::Raise => TokenKind::Raise,
        RawToken::Class => TokenKind::Class,
        RawToken::Try => TokenKind::Try,
        RawToken::Except => TokenKind::Except,
        RawToken::Finally => TokenKind::Finally,
        RawToken::With => TokenKind::With,
        RawToken::Yield => TokenKind::Yield,
        RawToken::Global => TokenKind::Global,
        RawToken::Nonlocal => TokenKind::Nonlocal,
        RawToken::Async => TokenKind::Async,
        RawToken::Await => TokenKind::Await,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::DoubleStar => TokenKind::DoubleStar,
        RawToken::Slash => TokenKind::Slash,
        RawToken::DoubleSlash => TokenKind::DoubleSlash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::DoubleStarEq => TokenKind::DoubleStarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::DoubleSlashEq => TokenKind::DoubleSlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::ShlEq => TokenKind::ShlEq,
        RawToken::ShrEq => TokenKind::ShrEq,
        // Payload-carrying and layout tokens are handled by the caller.
        RawToken::Newline
        | RawToken::Int
        | RawToken::HexInt
        | RawToken::OctInt
        | RawToken::BinInt
        | RawToken::Float
        | RawToken::Str
        | RawToken::TripleStr
        | RawToken::Ident => TokenKind::Newline,
    }
}
