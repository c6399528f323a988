//! Position-tracking CSS tokenizer.
//!
//! Produces the token model consumed by declaration/selector parsers. This is
//! a practical subset of CSS Syntax Level 3 tokenization.
//!
//! Known limitations:
//! - Escapes are only recognized as standalone tokens; an escape inside an
//!   identifier ends the identifier.
//! - Numbers are scanned textually; no numeric value is computed.
//! - Bad-string/bad-url tokens are not produced; unterminated strings end at
//!   the newline or end of input.
//!
//! Whitespace runs and commas map to the shared singleton tokens, so they
//! carry no source position.

use crate::token::{COMMA, CssToken, CssTokenKind, WHITESPACE};
use core_types::TextPosition;
use std::borrow::Cow;

/// A token either shared (`Cow::Borrowed` singleton) or freshly built.
pub type TokenRef = Cow<'static, CssToken>;

pub fn tokenize(input: &str) -> Vec<TokenRef> {
    let mut tokenizer = CssTokenizer::new(input);
    let mut out = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let done = token.kind() == CssTokenKind::Eof;
        out.push(token);
        if done {
            break;
        }
    }
    out
}

pub struct CssTokenizer<'a> {
    input: &'a str,
    pos: TextPosition,
}

impl<'a> CssTokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: TextPosition::START,
        }
    }

    pub fn position(&self) -> TextPosition {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    fn slice_from(&self, start: TextPosition) -> &'a str {
        &self.input[start.offset..self.pos.offset]
    }

    fn fresh(&self, kind: CssTokenKind, data: &str, start: TextPosition) -> TokenRef {
        let token = CssToken::new(kind, data.to_string(), start);
        log::trace!(target: "css.tokenizer", "token {:?} {:?} at {}", kind, data, start);
        Cow::Owned(token)
    }

    pub fn next_token(&mut self) -> TokenRef {
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Cow::Owned(CssToken::new(CssTokenKind::Eof, "", start));
        };

        match ch {
            c if is_whitespace(c) => {
                self.bump_while(is_whitespace);
                Cow::Borrowed(&WHITESPACE)
            }
            ',' => Cow::Borrowed(&COMMA),
            ':' => self.fresh(CssTokenKind::Colon, ":", start),
            ';' => self.fresh(CssTokenKind::Semicolon, ";", start),
            '{' => self.fresh(CssTokenKind::CurlyOpen, "{", start),
            '}' => self.fresh(CssTokenKind::CurlyClose, "}", start),
            '(' => self.fresh(CssTokenKind::RoundOpen, "(", start),
            ')' => self.fresh(CssTokenKind::RoundClose, ")", start),
            '[' => self.fresh(CssTokenKind::SquareOpen, "[", start),
            ']' => self.fresh(CssTokenKind::SquareClose, "]", start),
            '/' if self.peek() == Some('*') => self.consume_comment(start),
            '"' | '\'' => self.consume_string(ch, start),
            '#' if self.peek().is_some_and(is_name_char) => {
                let name_start = self.pos;
                self.bump_while(is_name_char);
                let name = self.slice_from(name_start);
                self.fresh(CssTokenKind::Hash, name, start)
            }
            '@' if self.starts_ident() => {
                let name_start = self.pos;
                self.bump_while(is_name_char);
                let name = self.slice_from(name_start);
                self.fresh(CssTokenKind::AtKeyword, name, start)
            }
            '\\' if self.peek().is_some_and(|c| c != '\n') => self.consume_escape(start),
            c if c.is_ascii_digit() => self.consume_numeric(start),
            '.' | '+' | '-' if self.starts_number(ch) => self.consume_numeric(start),
            c if is_name_start(c) || (c == '-' && self.starts_ident()) => {
                self.bump_while(is_name_char);
                self.consume_ident_like(start)
            }
            other => {
                let mut buf = [0u8; 4];
                let data: &str = other.encode_utf8(&mut buf);
                self.fresh(CssTokenKind::Delim, data, start)
            }
        }
    }

    fn starts_ident(&self) -> bool {
        match (self.peek(), self.peek_nth(1)) {
            (Some('-'), Some(c)) => is_name_start(c) || c == '-',
            (Some(c), _) => is_name_start(c),
            _ => false,
        }
    }

    /// Called after `first` was consumed.
    fn starts_number(&self, first: char) -> bool {
        match first {
            '.' => self.peek().is_some_and(|c| c.is_ascii_digit()),
            '+' | '-' => match self.peek() {
                Some(c) if c.is_ascii_digit() => true,
                Some('.') => self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            },
            _ => false,
        }
    }

    fn consume_numeric(&mut self, start: TextPosition) -> TokenRef {
        self.bump_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }
        if self.peek() == Some('%') {
            self.bump();
            let data = self.slice_from(start);
            return self.fresh(CssTokenKind::Percentage, data, start);
        }
        if self.starts_ident() {
            self.bump_while(is_name_char);
            let data = self.slice_from(start);
            return self.fresh(CssTokenKind::Dimension, data, start);
        }
        let data = self.slice_from(start);
        self.fresh(CssTokenKind::Number, data, start)
    }

    fn consume_ident_like(&mut self, start: TextPosition) -> TokenRef {
        let name = self.slice_from(start);
        if self.peek() != Some('(') {
            return self.fresh(CssTokenKind::Ident, name, start);
        }
        self.bump();
        if name.eq_ignore_ascii_case("url") {
            self.bump_while(is_whitespace);
            if !matches!(self.peek(), Some('"') | Some('\'')) {
                return self.consume_url(start);
            }
        }
        self.fresh(CssTokenKind::Function, name, start)
    }

    fn consume_url(&mut self, start: TextPosition) -> TokenRef {
        let body_start = self.pos;
        self.bump_while(|c| c != ')' && !is_whitespace(c));
        let body = self.slice_from(body_start);
        self.bump_while(is_whitespace);
        if self.peek() == Some(')') {
            self.bump();
        }
        self.fresh(CssTokenKind::Url, body, start)
    }

    fn consume_string(&mut self, quote: char, start: TextPosition) -> TokenRef {
        let body_start = self.pos;
        let mut escaped = false;
        while let Some(c) = self.peek() {
            if c == '\n' && !escaped {
                break;
            }
            if c == quote && !escaped {
                let body = self.slice_from(body_start);
                self.bump();
                return self.fresh(CssTokenKind::String, body, start);
            }
            escaped = c == '\\' && !escaped;
            self.bump();
        }
        let body = self.slice_from(body_start);
        self.fresh(CssTokenKind::String, body, start)
    }

    fn consume_comment(&mut self, start: TextPosition) -> TokenRef {
        self.bump();
        match self.rest().find("*/") {
            Some(end) => {
                let target = self.pos.offset + end + 2;
                while self.pos.offset < target {
                    self.bump();
                }
            }
            None => self.bump_while(|_| true),
        }
        let data = self.slice_from(start);
        self.fresh(CssTokenKind::Comment, data, start)
    }

    fn consume_escape(&mut self, start: TextPosition) -> TokenRef {
        if self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            let mut digits = 0;
            self.bump_while(|c| {
                digits += 1;
                digits <= 6 && c.is_ascii_hexdigit()
            });
            if self.peek().is_some_and(is_whitespace) {
                self.bump();
            }
        } else {
            self.bump();
        }
        let raw = self.slice_from(start);
        self.fresh(CssTokenKind::Escape, raw, start)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}')
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}
