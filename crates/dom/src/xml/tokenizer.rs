//! Simplified, non-validating XML tokenizer.
//!
//! Produces start/end tags, text and comments, one token per `next_token`
//! call so a driver can interleave other work between tokens. DOCTYPE
//! declarations, processing instructions and the XML declaration are skipped;
//! CDATA sections become text.
//!
//! Known limitations:
//! - No DTD processing: internal subsets are skipped, custom entities are not
//!   expanded.
//! - Names are scanned as `[^\s/>=]+`; no XML Name production checks.

use super::XmlParseError;
use crate::entities::decode_entities;
use core_types::TextPosition;
use memchr::memchr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlToken {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
        position: TextPosition,
    },
    EndTag {
        name: String,
        position: TextPosition,
    },
    Text {
        text: String,
        position: TextPosition,
    },
    Comment(String),
}

pub struct XmlTokenizer<'a> {
    input: &'a str,
    pos: TextPosition,
    fold_case: bool,
}

impl<'a> XmlTokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: TextPosition::START,
            fold_case: false,
        }
    }

    /// ASCII-lowercase tag and attribute names, as an HTML tokenizer would.
    pub fn with_fold_case(mut self, fold_case: bool) -> Self {
        self.fold_case = fold_case;
        self
    }

    pub fn position(&self) -> TextPosition {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos.offset..]
    }

    /// Advance over the next `len` bytes (must end on a char boundary).
    fn advance(&mut self, len: usize) -> &'a str {
        let consumed = &self.rest()[..len];
        for ch in consumed.chars() {
            self.pos = self.pos.advance(ch);
        }
        consumed
    }

    fn skip_whitespace(&mut self) {
        let len = self.rest().len() - self.rest().trim_start().len();
        self.advance(len);
    }

    fn name(&mut self) -> String {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '='))
            .unwrap_or(rest.len());
        let name = self.advance(len);
        if self.fold_case {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Next token, `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<XmlToken>, XmlParseError> {
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Ok(None);
            }
            let start = self.pos;
            if !rest.starts_with('<') {
                let len = memchr(b'<', rest.as_bytes()).unwrap_or(rest.len());
                let raw = self.advance(len);
                return Ok(Some(XmlToken::Text {
                    text: decode_entities(raw).into_owned(),
                    position: start,
                }));
            }

            if rest.starts_with("<!--") {
                let Some(end) = rest[4..].find("-->") else {
                    return Err(XmlParseError::Unterminated {
                        what: "comment",
                        position: start,
                    });
                };
                let comment = &rest[4..4 + end];
                self.advance(4 + end + 3);
                return Ok(Some(XmlToken::Comment(comment.to_string())));
            }
            if rest.starts_with("<![CDATA[") {
                let Some(end) = rest[9..].find("]]>") else {
                    return Err(XmlParseError::Unterminated {
                        what: "CDATA section",
                        position: start,
                    });
                };
                let text = &rest[9..9 + end];
                self.advance(9 + end + 3);
                return Ok(Some(XmlToken::Text {
                    text: text.to_string(),
                    position: start,
                }));
            }
            if rest.starts_with("<?") {
                let Some(end) = rest.find("?>") else {
                    return Err(XmlParseError::Unterminated {
                        what: "processing instruction",
                        position: start,
                    });
                };
                self.advance(end + 2);
                log::trace!(target: "dom.xml", "skipped processing instruction at {start}");
                continue;
            }
            if rest.starts_with("<!") {
                self.skip_declaration(start)?;
                continue;
            }
            if rest.starts_with("</") {
                self.advance(2);
                let name = self.name();
                self.skip_whitespace();
                if !self.rest().starts_with('>') {
                    return Err(XmlParseError::Unterminated {
                        what: "end tag",
                        position: start,
                    });
                }
                self.advance(1);
                return Ok(Some(XmlToken::EndTag {
                    name,
                    position: start,
                }));
            }
            return self.start_tag(start).map(Some);
        }
    }

    /// Skip `<!DOCTYPE ...>` including a bracketed internal subset.
    fn skip_declaration(&mut self, start: TextPosition) -> Result<(), XmlParseError> {
        let rest = self.rest();
        let mut depth = 0usize;
        for (i, b) in rest.bytes().enumerate() {
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => {
                    self.advance(i + 1);
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(XmlParseError::Unterminated {
            what: "declaration",
            position: start,
        })
    }

    fn start_tag(&mut self, start: TextPosition) -> Result<XmlToken, XmlParseError> {
        self.advance(1);
        let name = self.name();
        if name.is_empty() {
            return Err(XmlParseError::MissingName { position: start });
        }
        let unterminated = XmlParseError::Unterminated {
            what: "start tag",
            position: start,
        };

        let mut attributes: Vec<(String, String)> = Vec::new();
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(unterminated);
            }
            if rest.starts_with("/>") {
                self.advance(2);
                return Ok(XmlToken::StartTag {
                    name,
                    attributes,
                    self_closing: true,
                    position: start,
                });
            }
            if rest.starts_with('>') {
                self.advance(1);
                return Ok(XmlToken::StartTag {
                    name,
                    attributes,
                    self_closing: false,
                    position: start,
                });
            }
            if rest.starts_with('/') || rest.starts_with('=') {
                // Stray punctuation; skip it.
                self.advance(1);
                continue;
            }

            let attr_name = self.name();
            self.skip_whitespace();
            let mut value = String::new();
            if self.rest().starts_with('=') {
                self.advance(1);
                self.skip_whitespace();
                value = self.attribute_value().ok_or(unterminated.clone())?;
            }
            // First occurrence wins.
            if !attributes.iter().any(|(k, _)| *k == attr_name) {
                attributes.push((attr_name, value));
            }
        }
    }

    fn attribute_value(&mut self) -> Option<String> {
        let rest = self.rest();
        let quote = rest.chars().next()?;
        if quote == '"' || quote == '\'' {
            let end = rest[1..].find(quote)?;
            let raw = &rest[1..1 + end];
            self.advance(end + 2);
            return Some(decode_entities(raw).into_owned());
        }
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let raw = self.advance(len);
        Some(decode_entities(raw).into_owned())
    }
}
