//! # JSON String Escaping
//!
//! The escaping rule applied to every string written into JSON text:
//!
//! | Character            | Escape      |
//! |----------------------|-------------|
//! | `"` `\` `/`          | `\"` `\\` `\/` |
//! | backspace, form feed | `\b` `\f`   |
//! | LF, CR, TAB          | `\n` `\r` `\t` |
//! | other U+0000–U+001F  | `\u00xx` (lowercase hex) |
//!
//! Everything else, including non-ASCII text, passes through unchanged.
//!
//! [`unescape`] reverses the rule. A `\uXXXX` escape consumes exactly four
//! hex digits and is decoded to its code point; a high/low surrogate pair
//! joins into one character and an unpaired surrogate becomes U+FFFD.

use crate::error::BridgeError;

/// Escape `text` for embedding inside a JSON string literal.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{20}' => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`].
///
/// # Errors
///
/// Returns [`BridgeError::InvalidEscape`] with the offset of the backslash
/// for an unknown escape letter, a `\u` not followed by four hex digits, or
/// a trailing lone backslash.
pub fn unescape(text: &str) -> Result<String, BridgeError> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(rel) = text[pos..].find('\\') {
        let start = pos + rel;
        out.push_str(&text[pos..start]);
        let invalid = BridgeError::InvalidEscape { offset: start };

        let letter = *bytes.get(start + 1).ok_or(invalid)?;
        pos = start + 2;
        let simple = match letter {
            b'"' => Some('"'),
            b'\\' => Some('\\'),
            b'/' => Some('/'),
            b'b' => Some('\u{08}'),
            b'f' => Some('\u{0C}'),
            b'n' => Some('\n'),
            b'r' => Some('\r'),
            b't' => Some('\t'),
            b'u' => None,
            _ => return Err(BridgeError::InvalidEscape { offset: start }),
        };
        if let Some(c) = simple {
            out.push(c);
            continue;
        }

        let unit = hex4(bytes, pos).ok_or(BridgeError::InvalidEscape { offset: start })?;
        pos += 4;
        match unit {
            0xD800..=0xDBFF => match low_surrogate_at(bytes, pos) {
                Some(low) => {
                    let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    pos += 6;
                }
                None => out.push(char::REPLACEMENT_CHARACTER),
            },
            0xDC00..=0xDFFF => out.push(char::REPLACEMENT_CHARACTER),
            _ => out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }
    out.push_str(&text[pos..]);
    Ok(out)
}

fn hex4(bytes: &[u8], at: usize) -> Option<u16> {
    let digits = bytes.get(at..at + 4)?;
    digits.iter().try_fold(0u16, |acc, &d| {
        let nibble = char::from(d).to_digit(16)?;
        Some(acc << 4 | nibble as u16)
    })
}

fn low_surrogate_at(bytes: &[u8], at: usize) -> Option<u16> {
    if bytes.get(at..at + 2)? != b"\\u" {
        return None;
    }
    hex4(bytes, at + 2).filter(|unit| (0xDC00..=0xDFFF).contains(unit))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_trip(text in "\\PC*|[\\x00-\\x1f\"\\\\/]{0,20}") {
            prop_assert_eq!(unescape(&escape(&text)).unwrap(), text);
        }

        #[test]
        fn escaped_text_has_no_raw_controls(text in any::<String>()) {
            let escaped = escape(&text);
            prop_assert!(!escaped.chars().any(|c| c < '\u{20}'), "escaped output contains a control character");
        }
    }
}
