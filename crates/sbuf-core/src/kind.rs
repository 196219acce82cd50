//! # Value Kinds: The Closed Element Type Vocabulary
//!
//! Every element in a [`StructuredBuffer`](crate::StructuredBuffer) carries
//! exactly one `ValueKind`. The vocabulary is closed: there is no runtime type
//! introspection beyond this tag, and every consumer matches on it
//! exhaustively, so adding a kind forces every match site to handle it.
//!
//! ## Wire Stability
//!
//! The numeric tag of each kind is written as the single kind byte of an
//! element frame. These values are part of the wire format and must never be
//! renumbered. Tag `0x00` is deliberately unassigned so that zero-filled
//! memory never decodes as a valid kind.

use serde::{Deserialize, Serialize};

/// Number of kinds in the closed vocabulary.
pub const VALUE_KIND_COUNT: usize = 18;

/// The type of an element's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ValueKind {
    /// Single byte, `0x00` or `0x01`.
    Boolean = 0x01,
    /// Signed 8-bit integer.
    Int8 = 0x02,
    /// Signed 16-bit integer.
    Int16 = 0x03,
    /// Signed 32-bit integer.
    Int32 = 0x04,
    /// Signed 64-bit integer.
    Int64 = 0x05,
    /// Unsigned 8-bit integer.
    #[serde(rename = "uint8")]
    UInt8 = 0x06,
    /// Unsigned 16-bit integer.
    #[serde(rename = "uint16")]
    UInt16 = 0x07,
    /// Unsigned 32-bit integer.
    #[serde(rename = "uint32")]
    UInt32 = 0x08,
    /// Unsigned 64-bit integer.
    #[serde(rename = "uint64")]
    UInt64 = 0x09,
    /// Legacy unsigned 16-bit alias, distinct on the wire from `UInt16`.
    Word = 0x0A,
    /// Legacy unsigned 32-bit alias, distinct on the wire from `UInt32`.
    DoubleWord = 0x0B,
    /// IEEE-754 single precision.
    Float32 = 0x0C,
    /// IEEE-754 double precision.
    Float64 = 0x0D,
    /// A single opaque byte.
    Byte = 0x0E,
    /// UTF-8 text, stored without a terminator.
    String = 0x0F,
    /// Raw byte buffer.
    Buffer = 0x10,
    /// A complete serialized child tree.
    Tree = 0x11,
    /// A 128-bit category-tagged identifier.
    Identifier = 0x12,
}

impl ValueKind {
    /// All kinds, in tag order.
    pub const ALL: [ValueKind; VALUE_KIND_COUNT] = [
        Self::Boolean,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Word,
        Self::DoubleWord,
        Self::Float32,
        Self::Float64,
        Self::Byte,
        Self::String,
        Self::Buffer,
        Self::Tree,
        Self::Identifier,
    ];

    /// The wire tag written as the frame's kind byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Look up a kind by its wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::Boolean),
            0x02 => Some(Self::Int8),
            0x03 => Some(Self::Int16),
            0x04 => Some(Self::Int32),
            0x05 => Some(Self::Int64),
            0x06 => Some(Self::UInt8),
            0x07 => Some(Self::UInt16),
            0x08 => Some(Self::UInt32),
            0x09 => Some(Self::UInt64),
            0x0A => Some(Self::Word),
            0x0B => Some(Self::DoubleWord),
            0x0C => Some(Self::Float32),
            0x0D => Some(Self::Float64),
            0x0E => Some(Self::Byte),
            0x0F => Some(Self::String),
            0x10 => Some(Self::Buffer),
            0x11 => Some(Self::Tree),
            0x12 => Some(Self::Identifier),
            _ => None,
        }
    }

    /// Payload size for fixed-width kinds, `None` for variable-length ones.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Boolean | Self::Int8 | Self::UInt8 | Self::Byte => Some(1),
            Self::Int16 | Self::UInt16 | Self::Word => Some(2),
            Self::Int32 | Self::UInt32 | Self::DoubleWord | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
            Self::Identifier => Some(16),
            Self::String | Self::Buffer | Self::Tree => None,
        }
    }

    /// True for the integer kinds, signed, unsigned, and the legacy aliases.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
                | Self::Word
                | Self::DoubleWord
        )
    }

    /// Returns the kind name used in diagnostics and dumps.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Word => "word",
            Self::DoubleWord => "double_word",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Byte => "byte",
            Self::String => "string",
            Self::Buffer => "buffer",
            Self::Tree => "tree",
            Self::Identifier => "identifier",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
