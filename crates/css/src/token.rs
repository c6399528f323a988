//! CSS token model.
//!
//! Tokens are immutable value carriers: a kind, the raw source text, and the
//! position the text started at. No validation is done on kind/data
//! combinations; the tokenizer is responsible for producing consistent tokens.

use core_types::TextPosition;
use std::borrow::Cow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CssTokenKind {
    Ident,
    Function,
    AtKeyword,
    Hash,
    String,
    Url,
    Number,
    Percentage,
    Dimension,
    Delim,
    Whitespace,
    Comma,
    Colon,
    Semicolon,
    CurlyOpen,
    CurlyClose,
    RoundOpen,
    RoundClose,
    SquareOpen,
    SquareClose,
    Comment,
    /// A standalone escape such as `\41 `; `data` keeps the raw sequence.
    Escape,
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssToken {
    kind: CssTokenKind,
    data: Cow<'static, str>,
    position: TextPosition,
}

/// Shared whitespace token. Its position is `TextPosition::EMPTY`.
pub static WHITESPACE: CssToken = CssToken {
    kind: CssTokenKind::Whitespace,
    data: Cow::Borrowed(" "),
    position: TextPosition::EMPTY,
};

/// Shared comma token. Its position is `TextPosition::EMPTY`.
pub static COMMA: CssToken = CssToken {
    kind: CssTokenKind::Comma,
    data: Cow::Borrowed(","),
    position: TextPosition::EMPTY,
};

impl CssToken {
    pub fn new(
        kind: CssTokenKind,
        data: impl Into<Cow<'static, str>>,
        position: TextPosition,
    ) -> Self {
        Self {
            kind,
            data: data.into(),
            position,
        }
    }

    pub fn whitespace() -> &'static CssToken {
        &WHITESPACE
    }

    pub fn comma() -> &'static CssToken {
        &COMMA
    }

    pub fn kind(&self) -> CssTokenKind {
        self.kind
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// The textual value this token stands for.
    ///
    /// This is the raw data for every kind except `Escape`, which yields the
    /// decoded character.
    pub fn to_value(&self) -> Cow<'_, str> {
        match self.kind {
            CssTokenKind::Escape => Cow::Owned(decode_escape(&self.data).to_string()),
            _ => Cow::Borrowed(&self.data),
        }
    }
}

/// Decode a raw escape sequence (including the leading backslash).
///
/// Hex escapes take up to six digits; zero, surrogates and values above
/// U+10FFFF decode to U+FFFD. Any other escaped character stands for itself.
pub(crate) fn decode_escape(raw: &str) -> char {
    let body = raw.strip_prefix('\\').unwrap_or(raw);
    let hex: String = body
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .take(6)
        .collect();
    if hex.is_empty() {
        return body.chars().next().unwrap_or('\u{FFFD}');
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .filter(|&cp| cp != 0)
        .and_then(char::from_u32)
        .unwrap_or('\u{FFFD}')
}
