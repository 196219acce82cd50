//! # Wire Format Conformance Tests
//!
//! These tests pin the exact bytes of the element frame and tree encodings.
//! Every process that exchanges trees (session services, audit writers,
//! sandboxed jobs, dataset packagers) depends on these bytes; if a vector
//! here changes, previously written trees stop parsing.
//!
//! ## How It Works
//!
//! 1. **Hardcoded vectors**: known trees are serialized and compared
//!    byte-for-byte against literal expected output.
//!
//! 2. **Structural round trips**: trees mixing every kind, nested five levels
//!    deep, are serialized and parsed back with names, kinds, values, and
//!    order intact.

use sbuf_core::{
    decode_frame, encode_frame, Byte, DoubleWord, EntityCategory, FrameError, Identifier, Marker,
    StructuredBuffer, TreeError, Value, ValueKind, Word,
};

/// Little-endian marker bytes, written out so a constant change is caught.
const HEAD: [u8; 4] = [0x01, 0x0A, 0xF0, 0x5B];
const NAME: [u8; 4] = [0x02, 0x0A, 0xF0, 0x5B];
const DATA: [u8; 4] = [0x03, 0x0A, 0xF0, 0x5B];
const TAIL: [u8; 4] = [0x04, 0x0A, 0xF0, 0x5B];

fn expected_frame(kind: u8, name: &str, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&HEAD);
    out.push(kind);
    out.extend_from_slice(&((name.len() + 1) as u32).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&NAME);
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.extend_from_slice(&DATA);
    out.extend_from_slice(data);
    out.extend_from_slice(&TAIL);
    out
}

// ---------------------------------------------------------------------------
// Vector 1: the Name/Age scenario
// ---------------------------------------------------------------------------

#[test]
fn vector_name_age_bytes() {
    let mut tree = StructuredBuffer::new();
    tree.put("Name", "Ada").unwrap();
    tree.put("Age", 37u32).unwrap();

    let mut expected = expected_frame(0x0F, "Name", b"Ada");
    expected.extend(expected_frame(0x08, "Age", &[37, 0, 0, 0]));
    assert_eq!(tree.serialize(), expected);
    assert_eq!(expected.len(), 33 + 32);
}

#[test]
fn vector_name_age_round_trip() {
    let mut tree = StructuredBuffer::new();
    tree.put("Name", "Ada").unwrap();
    tree.put("Age", 37u32).unwrap();

    let fresh = StructuredBuffer::parse(&tree.serialize()).unwrap();
    assert_eq!(fresh.get::<String>("Name").unwrap(), "Ada");
    assert_eq!(fresh.get::<u32>("Age").unwrap(), 37);
    assert_eq!(fresh.names().collect::<Vec<_>>(), ["Name", "Age"]);
}

// ---------------------------------------------------------------------------
// Vector 2: literal bytes parse without any encoder involvement
// ---------------------------------------------------------------------------

#[test]
fn vector_literal_bytes_parse() {
    let mut bytes = expected_frame(0x01, "ok", &[1]);
    bytes.extend(expected_frame(0x0A, "w", &[0x34, 0x12]));
    bytes.extend(expected_frame(0x0B, "dw", &[0x78, 0x56, 0x34, 0x12]));
    bytes.extend(expected_frame(0x0E, "b", &[0xAB]));

    let tree = StructuredBuffer::parse(&bytes).unwrap();
    assert!(tree.get::<bool>("ok").unwrap());
    assert_eq!(tree.get::<Word>("w").unwrap(), Word(0x1234));
    assert_eq!(tree.get::<DoubleWord>("dw").unwrap(), DoubleWord(0x1234_5678));
    assert_eq!(tree.get::<Byte>("b").unwrap(), Byte(0xAB));
    assert_eq!(tree.serialize(), bytes);
}

// ---------------------------------------------------------------------------
// Element round trip for every kind at its boundary values
// ---------------------------------------------------------------------------

#[test]
fn every_kind_round_trips_through_a_frame() {
    let id = Identifier::new(EntityCategory::Organization);
    let mut nested = StructuredBuffer::new();
    nested.put("inner", -1i16).unwrap();

    let cases: Vec<(&str, Value)> = vec![
        ("bool_f", Value::Boolean(false)),
        ("bool_t", Value::Boolean(true)),
        ("i8_min", Value::Int8(i8::MIN)),
        ("i16_max", Value::Int16(i16::MAX)),
        ("i32_min", Value::Int32(i32::MIN)),
        ("i64_max", Value::Int64(i64::MAX)),
        ("u8_zero", Value::UInt8(0)),
        ("u16_max", Value::UInt16(u16::MAX)),
        ("u32_max", Value::UInt32(u32::MAX)),
        ("u64_max", Value::UInt64(u64::MAX)),
        ("word", Value::Word(u16::MAX)),
        ("dword", Value::DoubleWord(0)),
        ("f32", Value::Float32(-3.5)),
        ("f64", Value::Float64(f64::MIN)),
        ("byte", Value::Byte(0x7F)),
        ("empty_str", Value::String(String::new())),
        ("str", Value::String("line\nbreak \"quoted\" \u{1F600}".into())),
        ("empty_buf", Value::Buffer(Vec::new())),
        ("buf", Value::Buffer((0..=255).collect())),
        ("tree", Value::Tree(nested)),
        ("id", Value::Identifier(id)),
    ];

    let covered: std::collections::HashSet<ValueKind> =
        cases.iter().map(|(_, v)| v.kind()).collect();
    assert_eq!(covered.len(), ValueKind::ALL.len(), "every kind must be covered");

    for (name, value) in cases {
        let frame = encode_frame(name, value.kind(), &value.to_data());
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.name, name);
        assert_eq!(decoded.kind, value.kind());
        assert_eq!(Value::from_data(decoded.kind, decoded.data).unwrap(), value);
        assert_eq!(decoded.consumed, frame.len());
    }
}

// ---------------------------------------------------------------------------
// Deep nesting: five levels, mixed kinds, order preserved at every level
// ---------------------------------------------------------------------------

fn level(depth: u8) -> StructuredBuffer {
    let mut tree = StructuredBuffer::new();
    tree.put("depth", depth).unwrap();
    tree.put("label", format!("level-{depth}")).unwrap();
    tree.put("blob", vec![depth; depth as usize]).unwrap();
    if depth < 5 {
        tree.put("child", level(depth + 1)).unwrap();
    }
    tree.put("ratio", f64::from(depth) / 4.0).unwrap();
    tree
}

#[test]
fn five_level_nesting_round_trip() {
    let root = level(0);
    let parsed = StructuredBuffer::parse(&root.serialize()).unwrap();
    assert_eq!(parsed, root);

    let mut cursor = parsed;
    for depth in 0..=5u8 {
        assert_eq!(cursor.get::<u8>("depth").unwrap(), depth);
        assert_eq!(cursor.get::<String>("label").unwrap(), format!("level-{depth}"));
        assert_eq!(cursor.get::<Vec<u8>>("blob").unwrap().len(), depth as usize);
        if depth < 5 {
            assert_eq!(
                cursor.names().collect::<Vec<_>>(),
                ["depth", "label", "blob", "child", "ratio"]
            );
            cursor = cursor.get("child").unwrap();
        } else {
            assert_eq!(
                cursor.names().collect::<Vec<_>>(),
                ["depth", "label", "blob", "ratio"]
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Error scenarios
// ---------------------------------------------------------------------------

#[test]
fn corrupted_tail_marker_is_malformed_frame() {
    let mut frame = expected_frame(0x0F, "Name", b"Ada");
    let tail = frame.len() - 4;
    frame[tail + 2] = 0x00;
    assert_eq!(
        decode_frame(&frame),
        Err(FrameError::MalformedFrame {
            marker: Marker::Tail,
            offset: tail
        })
    );
    assert_eq!(
        StructuredBuffer::parse(&frame),
        Err(TreeError::Frame(FrameError::MalformedFrame {
            marker: Marker::Tail,
            offset: tail
        }))
    );
}

#[test]
fn missing_and_mismatched_lookups() {
    let mut tree = StructuredBuffer::new();
    tree.put("Name", "Ada").unwrap();
    assert!(matches!(
        tree.get::<String>("missing"),
        Err(TreeError::NotFound(_))
    ));
    assert!(matches!(
        tree.get::<u32>("Name"),
        Err(TreeError::TypeMismatch {
            expected: ValueKind::UInt32,
            found: ValueKind::String,
            ..
        })
    ));
}

#[test]
fn short_trailing_bytes_are_trailing_data() {
    let mut bytes = expected_frame(0x06, "n", &[1]);
    let end = bytes.len();
    bytes.extend_from_slice(&HEAD);
    assert_eq!(
        StructuredBuffer::parse(&bytes),
        Err(TreeError::TrailingData {
            offset: end,
            remaining: 4
        })
    );
}
