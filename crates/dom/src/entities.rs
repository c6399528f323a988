use memchr::memchr;
use std::borrow::Cow;

/// The five entities predefined by XML.
const PREDEFINED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
];

const MAX_REFERENCE_LEN: usize = 10; // "#x10FFFF" plus slack

/// Decode XML entity and character references.
///
/// Contract:
/// - Predefined entities (`&amp;` `&lt;` `&gt;` `&quot;` `&apos;`) decode.
/// - Character references decode when semicolon-terminated and naming a
///   valid scalar value: `&#38;` and `&#x26;`.
/// - Anything else (unknown names, missing `;`, invalid scalars) is kept
///   verbatim.
///
/// Returns the input borrowed when it contains no `&`.
pub(crate) fn decode_entities(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;
    while i < bytes.len() {
        let Some(rel) = memchr(b'&', &bytes[i..]) else {
            out.push_str(&s[i..]);
            break;
        };
        let amp = i + rel;
        out.push_str(&s[i..amp]);

        let window_end = (amp + 1 + MAX_REFERENCE_LEN).min(bytes.len());
        let decoded = memchr(b';', &bytes[amp + 1..window_end])
            .map(|semi| amp + 1 + semi)
            .and_then(|semi| resolve_reference(&s[amp + 1..semi]).map(|ch| (ch, semi)));

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                i = semi + 1;
            }
            None => {
                out.push('&');
                i = amp + 1;
            }
        }
    }
    Cow::Owned(out)
}

fn resolve_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let value = match num.strip_prefix(['x', 'X']) {
            Some(hex) if !hex.is_empty() => u32::from_str_radix(hex, 16).ok()?,
            Some(_) => return None,
            None if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) => {
                num.parse().ok()?
            }
            None => return None,
        };
        return char::from_u32(value).filter(|&c| c != '\0');
    }
    PREDEFINED
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|(_, ch)| *ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(decode_entities("120\u{d7}32"), Cow::Borrowed(_)));
    }

    #[test]
    fn predefined_entities_decode() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("&quot;&apos;"), "\"'");
    }

    #[test]
    fn character_references_decode() {
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_entities("&#x1F600;"), "\u{1F600}");
    }

    #[test]
    fn malformed_references_are_kept() {
        assert_eq!(decode_entities("&nbsp;"), "&nbsp;");
        assert_eq!(decode_entities("&amp"), "&amp");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
        assert_eq!(decode_entities("&#0;"), "&#0;");
        assert_eq!(decode_entities("&#;&#x;"), "&#;&#x;");
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("&&amp;"), "&&");
    }
}
