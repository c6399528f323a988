use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a hosting (browsing) context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl ContextId {
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        ContextId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Non-owning handle to a document.
///
/// Nodes and contexts refer to their document through this id; holding one
/// never keeps the document alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl DocumentId {
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        DocumentId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Location in a text source.
///
/// `line` and `column` are 1-based for real positions; `offset` is a byte
/// offset. `TextPosition::EMPTY` (all zeros) marks "no source location".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextPosition {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl TextPosition {
    pub const EMPTY: TextPosition = TextPosition {
        line: 0,
        column: 0,
        offset: 0,
    };

    /// Position of the first character of a source.
    pub const START: TextPosition = TextPosition {
        line: 1,
        column: 1,
        offset: 0,
    };

    pub const fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// Advance past `ch`, which is assumed to start at `self`.
    pub fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Self {
                line: self.line + 1,
                column: 1,
                offset: self.offset + 1,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
                offset: self.offset + ch.len_utf8(),
            }
        }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<no position>");
        }
        write!(f, "{}:{}", self.line, self.column)
    }
}
