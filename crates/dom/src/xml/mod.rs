//! Simple XML tree construction: tokenizer plus a stack-based tree builder.

mod builder;
mod tokenizer;

pub use builder::{XmlTreeBuilder, parse_into};
pub use tokenizer::{XmlToken, XmlTokenizer};

use core_types::TextPosition;
use thiserror::Error;

/// Grammar options for the XML tree builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlParserOptions {
    /// Treat mismatched/unclosed tags and stray text outside the root as errors
    /// instead of recovering.
    pub is_strict: bool,
    /// Tag names were ASCII-lowercased upstream; SVG tags get their canonical
    /// spelling restored.
    pub fold_case: bool,
    /// Tokens processed between cooperative yield points in async drivers.
    pub yield_interval: usize,
}

impl Default for XmlParserOptions {
    fn default() -> Self {
        Self {
            is_strict: false,
            fold_case: false,
            yield_interval: 64,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum XmlParseError {
    #[error("unterminated {what} starting at {position}")]
    Unterminated {
        what: &'static str,
        position: TextPosition,
    },
    #[error("missing tag name at {position}")]
    MissingName { position: TextPosition },
    #[error("end tag </{found}> at {position} does not match open element <{expected}>")]
    MismatchedEndTag {
        expected: String,
        found: String,
        position: TextPosition,
    },
    #[error("end tag </{name}> at {position} has no open element")]
    UnexpectedEndTag { name: String, position: TextPosition },
    #[error("element <{name}> is never closed")]
    UnclosedElement { name: String },
    #[error("content outside the document element at {position}")]
    ContentOutsideRoot { position: TextPosition },
}
