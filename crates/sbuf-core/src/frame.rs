//! # Element Frame Codec
//!
//! Encodes and decodes one named, typed element to and from its exact byte
//! frame. A serialized tree is nothing more than these frames concatenated in
//! insertion order.
//!
//! ## Wire Layout
//!
//! ```text
//! HEAD(4) | kind(1) | nameLen(4) | dataLen(4) | NAME(4)
//!   | name bytes | 0x00 | DATA(4) | data | TAIL(4)
//! ```
//!
//! All multi-byte integers are little-endian. `nameLen` counts the NUL
//! terminator. The four markers bracket every variable-length field so that a
//! corrupted length is caught at the next marker rather than silently
//! misaligning the rest of the buffer.
//!
//! ## Security Invariant
//!
//! Decoding never reads past the input slice and never trusts a declared
//! length before checking it against the bytes actually available. Every
//! failure names the field or marker and its byte offset.

use crate::error::FrameError;
use crate::kind::ValueKind;

/// Marker opening every frame.
pub const HEAD_MARKER: u32 = 0x5BF0_0A01;
/// Marker preceding the element name.
pub const NAME_MARKER: u32 = 0x5BF0_0A02;
/// Marker preceding the element payload.
pub const DATA_MARKER: u32 = 0x5BF0_0A03;
/// Marker closing every frame.
pub const TAIL_MARKER: u32 = 0x5BF0_0A04;

/// Fixed bytes in every frame: four markers, kind, and two lengths.
pub const FRAME_OVERHEAD: usize = 4 + 1 + 4 + 4 + 4 + 4 + 4;

/// Size of the smallest well-formed frame: a one-byte name, its NUL, and an
/// empty payload. Fewer remaining bytes can never hold another frame.
pub const MIN_FRAME_LEN: usize = FRAME_OVERHEAD + 2;

/// Identifies one of the four frame markers in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Frame start.
    Head,
    /// Name section start.
    Name,
    /// Data section start.
    Data,
    /// Frame end.
    Tail,
}

impl Marker {
    /// The constant this marker must equal on the wire.
    pub fn value(self) -> u32 {
        match self {
            Self::Head => HEAD_MARKER,
            Self::Name => NAME_MARKER,
            Self::Data => DATA_MARKER,
            Self::Tail => TAIL_MARKER,
        }
    }

    /// Returns the marker name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Name => "name",
            Self::Data => "data",
            Self::Tail => "tail",
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded frame, borrowing name and payload from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    /// Element name, terminator stripped.
    pub name: &'a str,
    /// Element kind.
    pub kind: ValueKind,
    /// Raw payload bytes.
    pub data: &'a [u8],
    /// Total bytes the frame occupied in the input.
    pub consumed: usize,
}

/// Exact size of the frame for a name and payload length.
pub fn frame_len(name: &str, data_len: usize) -> usize {
    FRAME_OVERHEAD + name.len() + 1 + data_len
}

/// Encode one element into a freshly allocated frame.
pub fn encode_frame(name: &str, kind: ValueKind, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame_len(name, data.len()));
    encode_frame_into(&mut out, name, kind, data);
    out
}

/// Append one element's frame to `out`.
///
/// The caller guarantees `name` is non-empty and NUL-free and that both
/// lengths fit the `u32` length fields; the tree enforces both at `put` time.
pub fn encode_frame_into(out: &mut Vec<u8>, name: &str, kind: ValueKind, data: &[u8]) {
    out.reserve(frame_len(name, data.len()));
    out.extend_from_slice(&HEAD_MARKER.to_le_bytes());
    out.push(kind.tag());
    out.extend_from_slice(&((name.len() + 1) as u32).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&NAME_MARKER.to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.extend_from_slice(&DATA_MARKER.to_le_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(&TAIL_MARKER.to_le_bytes());
}

/// Decode the frame at the start of `bytes`.
///
/// Trailing input after the frame is left untouched; use
/// [`DecodedFrame::consumed`] to advance to the next frame.
///
/// # Errors
///
/// - [`FrameError::MalformedFrame`] on the first marker mismatch.
/// - [`FrameError::Truncated`] if the input ends inside a field.
/// - [`FrameError::UnknownKind`] if the kind byte is outside the vocabulary.
/// - [`FrameError::InvalidName`] if the name is empty, unterminated, or not UTF-8.
pub fn decode_frame(bytes: &[u8]) -> Result<DecodedFrame<'_>, FrameError> {
    let mut cursor = Cursor::new(bytes);

    cursor.expect_marker(Marker::Head)?;

    let kind_offset = cursor.pos;
    let tag = cursor.take("kind", 1)?[0];
    let kind = ValueKind::from_tag(tag).ok_or(FrameError::UnknownKind {
        tag,
        offset: kind_offset,
    })?;

    let name_len = cursor.read_u32("name length")? as usize;
    let data_len = cursor.read_u32("data length")? as usize;

    cursor.expect_marker(Marker::Name)?;

    let name_offset = cursor.pos;
    let raw_name = cursor.take("name", name_len)?;
    let name = decode_name(raw_name, name_offset)?;

    cursor.expect_marker(Marker::Data)?;
    let data = cursor.take("data", data_len)?;
    cursor.expect_marker(Marker::Tail)?;

    Ok(DecodedFrame {
        name,
        kind,
        data,
        consumed: cursor.pos,
    })
}

/// Validate the raw name field: non-empty text followed by exactly one NUL.
fn decode_name(raw: &[u8], offset: usize) -> Result<&str, FrameError> {
    let Some((&terminator, text)) = raw.split_last() else {
        return Err(FrameError::InvalidName {
            offset,
            reason: "name length is zero",
        });
    };
    if terminator != 0 {
        return Err(FrameError::InvalidName {
            offset,
            reason: "missing NUL terminator",
        });
    }
    if text.is_empty() {
        return Err(FrameError::InvalidName {
            offset,
            reason: "name is empty",
        });
    }
    if text.contains(&0) {
        return Err(FrameError::InvalidName {
            offset,
            reason: "embedded NUL byte",
        });
    }
    std::str::from_utf8(text).map_err(|_| FrameError::InvalidName {
        offset,
        reason: "name is not valid UTF-8",
    })
}

/// Bounds-checked reader over the frame input.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], FrameError> {
        let available = self.bytes.len() - self.pos;
        if len > available {
            return Err(FrameError::Truncated {
                field,
                offset: self.pos,
                needed: len,
                available,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, FrameError> {
        let raw = self.take(field, 4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn expect_marker(&mut self, marker: Marker) -> Result<(), FrameError> {
        let offset = self.pos;
        let found = self.read_u32(marker.as_str())?;
        if found != marker.value() {
            return Err(FrameError::MalformedFrame { marker, offset });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        encode_frame("Name", ValueKind::String, b"Ada")
    }

    #[test]
    fn layout_is_exact() {
        let frame = sample();
        assert_eq!(frame.len(), FRAME_OVERHEAD + 5 + 3);
        assert_eq!(&frame[0..4], &HEAD_MARKER.to_le_bytes());
        assert_eq!(frame[4], ValueKind::String.tag());
        assert_eq!(&frame[5..9], &5u32.to_le_bytes());
        assert_eq!(&frame[9..13], &3u32.to_le_bytes());
        assert_eq!(&frame[13..17], &NAME_MARKER.to_le_bytes());
        assert_eq!(&frame[17..22], b"Name\0");
        assert_eq!(&frame[22..26], &DATA_MARKER.to_le_bytes());
        assert_eq!(&frame[26..29], b"Ada");
        assert_eq!(&frame[29..33], &TAIL_MARKER.to_le_bytes());
    }

    #[test]
    fn frame_len_matches_encoding() {
        assert_eq!(frame_len("Name", 3), sample().len());
        assert_eq!(frame_len("x", 0), encode_frame("x", ValueKind::Buffer, &[]).len());
    }

    #[test]
    fn smallest_frame_is_min_frame_len() {
        assert_eq!(MIN_FRAME_LEN, 27);
        assert_eq!(MIN_FRAME_LEN, frame_len("x", 0));
        assert_eq!(encode_frame("x", ValueKind::Buffer, &[]).len(), MIN_FRAME_LEN);
    }

    #[test]
    fn decode_returns_fields_and_consumed() {
        let frame = sample();
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.name, "Name");
        assert_eq!(decoded.kind, ValueKind::String);
        assert_eq!(decoded.data, b"Ada");
        assert_eq!(decoded.consumed, frame.len());
    }

    #[test]
    fn decode_ignores_following_frames() {
        let mut buf = sample();
        let first_len = buf.len();
        buf.extend(encode_frame("Age", ValueKind::UInt32, &37u32.to_le_bytes()));
        let first = decode_frame(&buf).unwrap();
        assert_eq!(first.consumed, first_len);
        let second = decode_frame(&buf[first.consumed..]).unwrap();
        assert_eq!(second.name, "Age");
        assert_eq!(second.data, &37u32.to_le_bytes());
    }

    #[test]
    fn markers_are_distinct() {
        let markers = [HEAD_MARKER, NAME_MARKER, DATA_MARKER, TAIL_MARKER];
        for (i, a) in markers.iter().enumerate() {
            for b in &markers[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn corrupted_head_marker() {
        let mut frame = sample();
        frame[0] ^= 0xFF;
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::MalformedFrame {
                marker: Marker::Head,
                offset: 0
            })
        );
    }

    #[test]
    fn corrupted_name_marker() {
        let mut frame = sample();
        frame[13] ^= 0x01;
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::MalformedFrame {
                marker: Marker::Name,
                offset: 13
            })
        );
    }

    #[test]
    fn corrupted_data_marker() {
        let mut frame = sample();
        frame[22] ^= 0x01;
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::MalformedFrame {
                marker: Marker::Data,
                offset: 22
            })
        );
    }

    #[test]
    fn corrupted_tail_marker() {
        let mut frame = sample();
        let last = frame.len() - 1;
        frame[last] ^= 0x80;
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::MalformedFrame {
                marker: Marker::Tail,
                offset: 29
            })
        );
    }

    #[test]
    fn inflated_data_length_hits_tail_marker() {
        let mut frame = sample();
        frame.extend_from_slice(&[0u8; 8]);
        frame[9..13].copy_from_slice(&5u32.to_le_bytes());
        assert!(matches!(
            decode_frame(&frame),
            Err(FrameError::MalformedFrame {
                marker: Marker::Tail,
                ..
            })
        ));
    }

    #[test]
    fn truncated_inside_data() {
        let frame = sample();
        let err = decode_frame(&frame[..27]).unwrap_err();
        assert_eq!(
            err,
            FrameError::Truncated {
                field: "data",
                offset: 26,
                needed: 3,
                available: 1
            }
        );
    }

    #[test]
    fn truncated_everywhere_never_panics() {
        let frame = sample();
        for cut in 0..frame.len() {
            let err = decode_frame(&frame[..cut]).unwrap_err();
            assert!(
                matches!(err, FrameError::Truncated { .. }),
                "cut at {cut} gave {err:?}"
            );
        }
    }

    #[test]
    fn huge_declared_length_is_truncated_not_allocated() {
        let mut frame = sample();
        frame[9..13].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            decode_frame(&frame),
            Err(FrameError::Truncated { field: "data", .. })
        ));
    }

    #[test]
    fn unknown_kind() {
        let mut frame = sample();
        frame[4] = 0x7F;
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::UnknownKind { tag: 0x7F, offset: 4 })
        );
    }

    #[test]
    fn zero_name_length_rejected() {
        let mut frame = encode_frame("a", ValueKind::Boolean, &[1]);
        // Rewrite as a zero-length name and drop the two name bytes.
        frame[5..9].copy_from_slice(&0u32.to_le_bytes());
        frame.drain(17..19);
        assert!(matches!(
            decode_frame(&frame),
            Err(FrameError::InvalidName {
                reason: "name length is zero",
                ..
            })
        ));
    }

    #[test]
    fn missing_terminator_rejected() {
        let mut frame = sample();
        frame[21] = b'!';
        assert!(matches!(
            decode_frame(&frame),
            Err(FrameError::InvalidName {
                reason: "missing NUL terminator",
                ..
            })
        ));
    }

    #[test]
    fn non_utf8_name_rejected() {
        let mut frame = sample();
        frame[17] = 0xFF;
        assert!(matches!(
            decode_frame(&frame),
            Err(FrameError::InvalidName { offset: 17, .. })
        ));
    }

    #[test]
    fn empty_payload_round_trips() {
        let frame = encode_frame("empty", ValueKind::Buffer, &[]);
        let decoded = decode_frame(&frame).unwrap();
        assert!(decoded.data.is_empty());
        assert_eq!(decoded.consumed, frame.len());
    }

    #[test]
    fn marker_display() {
        assert_eq!(Marker::Tail.to_string(), "tail");
        let err = FrameError::MalformedFrame {
            marker: Marker::Tail,
            offset: 29,
        };
        assert!(err.to_string().contains("tail marker"));
    }
}
