pub mod token;
pub mod tokenizer;

// Re-exports so other crates can just use `css::...` nicely.
pub use token::{COMMA, CssToken, CssTokenKind, WHITESPACE};
pub use tokenizer::{CssTokenizer, TokenRef, tokenize};
