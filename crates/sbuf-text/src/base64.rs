//! # Base-64 Text Transport
//!
//! Standard alphabet (`A-Z a-z 0-9 + /`) with `=` padding, no URL-safe
//! variant and no line wrapping. Used to move serialized trees and raw
//! buffer payloads through text-only channels: URLs, JSON members, log lines.
//!
//! ## Decoding Rules
//!
//! - Input length must be a multiple of 4.
//! - Up to two trailing `=` are zero-valued placeholders; each one shortens
//!   the output by one byte. Three or more is [`Base64Error::OutOfRange`].
//! - `=` before the trailing run, or any byte outside the alphabet, is
//!   [`Base64Error::InvalidEncoding`] carrying its byte offset.
//!
//! Unused low bits in the final group are ignored rather than rejected.
//!
//! The codec is the `base64` crate's general-purpose engine. This module
//! only pins its configuration and maps its failures onto [`Base64Error`]
//! with exact byte offsets.

use ::base64::alphabet;
use ::base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use ::base64::engine::DecodePaddingMode;
use ::base64::{DecodeError, Engine};
use sbuf_core::StructuredBuffer;

use crate::error::{Base64Error, BridgeError};

const PAD: u8 = b'=';

/// Padded standard alphabet that tolerates non-zero unused bits.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

/// Length of the encoding of `n` input bytes: `4 * ceil(n / 3)`.
pub fn encoded_len(n: usize) -> usize {
    n.div_ceil(3) * 4
}

/// Number of `=` characters the encoding of `n` bytes ends with.
pub fn padding_len(n: usize) -> usize {
    (3 - n % 3) % 3
}

/// Encode bytes as padded standard base-64.
pub fn encode(bytes: &[u8]) -> String {
    ENGINE.encode(bytes)
}

/// Decode padded standard base-64.
///
/// # Errors
///
/// - [`Base64Error::InvalidEncoding`] for a bad length, a misplaced `=`, or a
///   character outside the alphabet.
/// - [`Base64Error::OutOfRange`] for more than two padding characters.
pub fn decode(text: &str) -> Result<Vec<u8>, Base64Error> {
    let input = text.as_bytes();
    if input.len() % 4 != 0 {
        return Err(Base64Error::InvalidEncoding {
            offset: input.len(),
            reason: "length is not a multiple of 4",
        });
    }

    let padding = input.iter().rev().take_while(|&&c| c == PAD).count();
    if padding > 2 {
        return Err(Base64Error::OutOfRange { padding });
    }
    let data_end = input.len() - padding;

    if let Some(offset) = input[..data_end].iter().position(|&c| !in_alphabet(c)) {
        return Err(invalid_byte(offset, input[offset]));
    }

    ENGINE.decode(input).map_err(|err| match err {
        DecodeError::InvalidByte(offset, byte) => invalid_byte(offset, byte),
        DecodeError::InvalidLastSymbol(offset, _) => Base64Error::InvalidEncoding {
            offset,
            reason: "invalid final symbol",
        },
        DecodeError::InvalidLength(offset) => Base64Error::InvalidEncoding {
            offset,
            reason: "length is not a multiple of 4",
        },
        _ => Base64Error::InvalidEncoding {
            offset: data_end,
            reason: "invalid padding",
        },
    })
}

/// Serialize a tree and encode the bytes as base-64.
pub fn tree_to_base64(tree: &StructuredBuffer) -> String {
    encode(&tree.serialize())
}

/// Decode base-64 text and parse the bytes as a tree.
///
/// # Errors
///
/// Returns [`BridgeError::Base64`] or [`BridgeError::Tree`] from the
/// respective stage.
pub fn tree_from_base64(text: &str) -> Result<StructuredBuffer, BridgeError> {
    let bytes = decode(text)?;
    Ok(StructuredBuffer::parse(&bytes)?)
}

fn in_alphabet(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'+' || c == b'/'
}

fn invalid_byte(offset: usize, byte: u8) -> Base64Error {
    Base64Error::InvalidEncoding {
        offset,
        reason: if byte == PAD {
            "padding before the end of the input"
        } else {
            "character outside the base-64 alphabet"
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4648_vectors() {
        let vectors = [
            ("", ""),
            ("f", "Zg=="),
            ("fo", "Zm8="),
            ("foo", "Zm9v"),
            ("foob", "Zm9vYg=="),
            ("fooba", "Zm9vYmE="),
            ("foobar", "Zm9vYmFy"),
        ];
        for (plain, encoded) in vectors {
            assert_eq!(encode(plain.as_bytes()), encoded);
            assert_eq!(decode(encoded).unwrap(), plain.as_bytes());
        }
    }

    #[test]
    fn high_alphabet_characters() {
        assert_eq!(encode(&[0xFB, 0xFF, 0xBF]), "+/+/");
        assert_eq!(decode("+/+/").unwrap(), [0xFB, 0xFF, 0xBF]);
    }

    #[test]
    fn lengths_and_padding() {
        for n in 0..=12 {
            let bytes: Vec<u8> = (0..n as u8).collect();
            let encoded = encode(&bytes);
            assert_eq!(encoded.len(), encoded_len(n));
            assert_eq!(encoded.len(), 4 * n.div_ceil(3));
            let pads = encoded.bytes().rev().take_while(|&c| c == b'=').count();
            assert_eq!(pads, padding_len(n));
            assert_eq!(decode(&encoded).unwrap(), bytes);
        }
        assert_eq!(padding_len(3), 0);
        assert_eq!(padding_len(2), 1);
        assert_eq!(padding_len(1), 2);
    }

    #[test]
    fn five_characters_is_invalid_encoding() {
        assert_eq!(
            decode("Zm9vY"),
            Err(Base64Error::InvalidEncoding {
                offset: 5,
                reason: "length is not a multiple of 4"
            })
        );
    }

    #[test]
    fn three_pads_is_out_of_range() {
        assert_eq!(decode("Z==="), Err(Base64Error::OutOfRange { padding: 3 }));
        assert_eq!(decode("===="), Err(Base64Error::OutOfRange { padding: 4 }));
    }

    #[test]
    fn interior_padding_is_invalid() {
        assert!(matches!(
            decode("Zm=vYmFy"),
            Err(Base64Error::InvalidEncoding { offset: 2, .. })
        ));
        assert!(matches!(
            decode("Zg==Zm8="),
            Err(Base64Error::InvalidEncoding { offset: 2, .. })
        ));
    }

    #[test]
    fn non_alphabet_character_is_invalid() {
        assert!(matches!(
            decode("Zm9v-mFy"),
            Err(Base64Error::InvalidEncoding { offset: 4, .. })
        ));
        assert!(matches!(
            decode("Zm 9"),
            Err(Base64Error::InvalidEncoding { offset: 2, .. })
        ));
        assert!(matches!(
            decode("Zm\u{e9}"),
            Err(Base64Error::InvalidEncoding { offset: 2, .. })
        ));
    }

    #[test]
    fn unused_trailing_bits_are_ignored() {
        // "Zh==" and "Zg==" differ only in the unused low bits of 'h'.
        assert_eq!(decode("Zh==").unwrap(), b"f");
        assert_eq!(decode("Zm9=").unwrap(), b"fo");
    }

    #[test]
    fn misplaced_padding_reason() {
        assert_eq!(
            decode("Z=g="),
            Err(Base64Error::InvalidEncoding {
                offset: 1,
                reason: "padding before the end of the input"
            })
        );
        assert_eq!(
            decode("Zm9v*mFy"),
            Err(Base64Error::InvalidEncoding {
                offset: 4,
                reason: "character outside the base-64 alphabet"
            })
        );
    }

    #[test]
    fn tree_round_trip() {
        let mut tree = StructuredBuffer::new();
        tree.put("Name", "Ada").unwrap();
        tree.put("Age", 37u32).unwrap();
        let text = tree_to_base64(&tree);
        assert_eq!(tree_from_base64(&text).unwrap(), tree);
    }

    #[test]
    fn tree_from_bad_text_reports_stage() {
        assert!(matches!(
            tree_from_base64("abc"),
            Err(BridgeError::Base64(_))
        ));
        assert!(matches!(
            tree_from_base64(&encode(b"not a tree at all, definitely not")),
            Err(BridgeError::Tree(_))
        ));
    }
}
