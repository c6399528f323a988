//! Owned text buffer backing a document.
//!
//! A `TextSource` can be created from a complete string or fed incrementally
//! with byte chunks. Chunked input preserves multi-byte character boundaries
//! across calls and makes forward progress on invalid sequences by emitting
//! U+FFFD.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextSource {
    text: String,
    /// Incomplete UTF-8 suffix from the last byte chunk (at most 3 bytes).
    carry: Vec<u8>,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            carry: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut source = Self::empty();
        source.push_bytes(bytes);
        source.finish();
        source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.carry.is_empty()
    }

    pub fn push_str(&mut self, s: &str) {
        self.finish();
        self.text.push_str(s);
    }

    /// Append a byte chunk, decoding as UTF-8.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if self.carry.is_empty() {
            decode_into(&mut self.text, &mut self.carry, bytes);
            return;
        }

        // Resolve the carried prefix by borrowing just enough bytes from this
        // chunk, then decode the rest in place.
        let mut remaining = bytes;
        while !self.carry.is_empty() && !remaining.is_empty() {
            let expected = utf8_seq_len(self.carry[0]);
            if expected == 0 {
                self.text.push('\u{FFFD}');
                self.carry.clear();
                break;
            }

            let needed = expected.saturating_sub(self.carry.len());
            if remaining.len() < needed {
                self.carry.extend_from_slice(remaining);
                return;
            }

            let mut scratch = [0u8; 8];
            let carried = self.carry.len();
            scratch[..carried].copy_from_slice(&self.carry);
            scratch[carried..carried + needed].copy_from_slice(&remaining[..needed]);
            self.carry.clear();
            decode_into(&mut self.text, &mut self.carry, &scratch[..carried + needed]);
            remaining = &remaining[needed..];
        }

        if !remaining.is_empty() {
            decode_into(&mut self.text, &mut self.carry, remaining);
        }
    }

    /// Flush any carried bytes (lossy) so input is never silently truncated.
    pub fn finish(&mut self) {
        if self.carry.is_empty() {
            return;
        }
        self.text.push_str(&String::from_utf8_lossy(&self.carry));
        self.carry.clear();
    }
}

impl From<&str> for TextSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TextSource {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

fn utf8_seq_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn decode_into(text: &mut String, carry: &mut Vec<u8>, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                text.push_str(s);
                break;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                if let Ok(valid) = std::str::from_utf8(valid) {
                    text.push_str(valid);
                }
                match e.error_len() {
                    Some(len) => {
                        text.push('\u{FFFD}');
                        bytes = &rest[len..];
                    }
                    None => {
                        carry.extend_from_slice(rest);
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multibyte_split_across_chunks() {
        let mut source = TextSource::empty();
        source.push_bytes(&[0xC3]);
        assert_eq!(source.text(), "");
        source.push_bytes(&[0x97]);
        assert_eq!(source.text(), "\u{d7}");
    }

    #[test]
    fn carry_resolves_then_decodes_rest() {
        let mut source = TextSource::empty();
        source.push_bytes(&[0xF0, 0x9F]);
        source.push_bytes(&[0x98, 0x80, b'!']);
        assert_eq!(source.text(), "\u{1F600}!");
    }

    #[test]
    fn invalid_bytes_make_progress() {
        let source = TextSource::from_bytes(&[0xFF, b'f']);
        assert_eq!(source.text(), "\u{FFFD}f");
    }

    #[test]
    fn incomplete_suffix_is_flushed_on_finish() {
        let mut source = TextSource::empty();
        source.push_bytes(&[0xE2, 0x82]);
        assert!(!source.is_empty());
        source.finish();
        assert_eq!(source.text(), "\u{FFFD}");
    }

    #[test]
    fn clones_do_not_share_storage() {
        let original = TextSource::new("<a/>");
        let mut copy = original.clone();
        copy.push_str("<b/>");
        assert_eq!(original.text(), "<a/>");
        assert_eq!(copy.text(), "<a/><b/>");
    }
}
