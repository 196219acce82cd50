//! # Typed Element Values
//!
//! Maps Rust types onto the closed [`ValueKind`] vocabulary. Two views exist:
//!
//! - [`TreeValue`] (static): a Rust type with a fixed kind, used by
//!   `StructuredBuffer::get::<T>()`.
//! - [`Value`] (dynamic): a tagged union over every kind, used by `put` (via
//!   `Into<Value>`), `get_value`, and the text bridges.
//!
//! Three kinds share a Rust primitive with another kind and therefore get a
//! newtype: [`Byte`] (vs `u8`), [`Word`] (vs `u16`), and [`DoubleWord`]
//! (vs `u32`).
//!
//! ## Payload Encoding
//!
//! Numbers are little-endian, booleans are one byte `0x00`/`0x01`, strings are
//! UTF-8 without terminator, identifiers are their 16 bytes, and nested trees
//! are their complete serialized frame sequence.

use crate::error::TreeError;
use crate::identifier::Identifier;
use crate::kind::ValueKind;
use crate::tree::StructuredBuffer;

/// A single opaque byte, distinct on the wire from `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Byte(pub u8);

/// Legacy unsigned 16-bit value, distinct on the wire from `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Word(pub u16);

/// Legacy unsigned 32-bit value, distinct on the wire from `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DoubleWord(pub u32);

/// A Rust type stored under one fixed [`ValueKind`].
pub trait TreeValue: Sized {
    /// The kind this type is stored as.
    const KIND: ValueKind;

    /// Encode the payload bytes.
    fn to_data(&self) -> Vec<u8>;

    /// Decode the payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidValue`] if `data` is not a valid payload
    /// for [`Self::KIND`].
    fn from_data(data: &[u8]) -> Result<Self, TreeError>;
}

fn width_error(kind: ValueKind, actual: usize) -> TreeError {
    TreeError::InvalidValue {
        kind,
        reason: format!(
            "expected {} payload bytes, found {actual}",
            kind.fixed_width().unwrap_or(0)
        ),
    }
}

macro_rules! impl_le_value {
    ($ty:ty, $kind:ident) => {
        impl TreeValue for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn to_data(&self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }

            fn from_data(data: &[u8]) -> Result<Self, TreeError> {
                let raw: [u8; std::mem::size_of::<$ty>()] = data
                    .try_into()
                    .map_err(|_| width_error(Self::KIND, data.len()))?;
                Ok(<$ty>::from_le_bytes(raw))
            }
        }
    };
}

impl_le_value!(i8, Int8);
impl_le_value!(i16, Int16);
impl_le_value!(i32, Int32);
impl_le_value!(i64, Int64);
impl_le_value!(u8, UInt8);
impl_le_value!(u16, UInt16);
impl_le_value!(u32, UInt32);
impl_le_value!(u64, UInt64);
impl_le_value!(f32, Float32);
impl_le_value!(f64, Float64);

macro_rules! impl_newtype_value {
    ($ty:ident, $inner:ty, $kind:ident) => {
        impl TreeValue for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn to_data(&self) -> Vec<u8> {
                self.0.to_le_bytes().to_vec()
            }

            fn from_data(data: &[u8]) -> Result<Self, TreeError> {
                let raw: [u8; std::mem::size_of::<$inner>()] = data
                    .try_into()
                    .map_err(|_| width_error(Self::KIND, data.len()))?;
                Ok($ty(<$inner>::from_le_bytes(raw)))
            }
        }
    };
}

impl_newtype_value!(Byte, u8, Byte);
impl_newtype_value!(Word, u16, Word);
impl_newtype_value!(DoubleWord, u32, DoubleWord);

impl TreeValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn to_data(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }

    fn from_data(data: &[u8]) -> Result<Self, TreeError> {
        match data {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(TreeError::InvalidValue {
                kind: Self::KIND,
                reason: format!("boolean byte must be 0 or 1, found {other}"),
            }),
            _ => Err(width_error(Self::KIND, data.len())),
        }
    }
}

impl TreeValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn to_data(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn from_data(data: &[u8]) -> Result<Self, TreeError> {
        String::from_utf8(data.to_vec()).map_err(|e| TreeError::InvalidValue {
            kind: Self::KIND,
            reason: e.to_string(),
        })
    }
}

impl TreeValue for Vec<u8> {
    const KIND: ValueKind = ValueKind::Buffer;

    fn to_data(&self) -> Vec<u8> {
        self.clone()
    }

    fn from_data(data: &[u8]) -> Result<Self, TreeError> {
        Ok(data.to_vec())
    }
}

impl TreeValue for Identifier {
    const KIND: ValueKind = ValueKind::Identifier;

    fn to_data(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn from_data(data: &[u8]) -> Result<Self, TreeError> {
        let raw: [u8; 16] = data
            .try_into()
            .map_err(|_| width_error(Self::KIND, data.len()))?;
        Identifier::from_bytes(raw).map_err(|e| TreeError::InvalidValue {
            kind: Self::KIND,
            reason: e.to_string(),
        })
    }
}

impl TreeValue for StructuredBuffer {
    const KIND: ValueKind = ValueKind::Tree;

    fn to_data(&self) -> Vec<u8> {
        self.serialize()
    }

    fn from_data(data: &[u8]) -> Result<Self, TreeError> {
        StructuredBuffer::parse(data)
    }
}

/// A value of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// [`ValueKind::Boolean`]
    Boolean(bool),
    /// [`ValueKind::Int8`]
    Int8(i8),
    /// [`ValueKind::Int16`]
    Int16(i16),
    /// [`ValueKind::Int32`]
    Int32(i32),
    /// [`ValueKind::Int64`]
    Int64(i64),
    /// [`ValueKind::UInt8`]
    UInt8(u8),
    /// [`ValueKind::UInt16`]
    UInt16(u16),
    /// [`ValueKind::UInt32`]
    UInt32(u32),
    /// [`ValueKind::UInt64`]
    UInt64(u64),
    /// [`ValueKind::Word`]
    Word(u16),
    /// [`ValueKind::DoubleWord`]
    DoubleWord(u32),
    /// [`ValueKind::Float32`]
    Float32(f32),
    /// [`ValueKind::Float64`]
    Float64(f64),
    /// [`ValueKind::Byte`]
    Byte(u8),
    /// [`ValueKind::String`]
    String(String),
    /// [`ValueKind::Buffer`]
    Buffer(Vec<u8>),
    /// [`ValueKind::Tree`]
    Tree(StructuredBuffer),
    /// [`ValueKind::Identifier`]
    Identifier(Identifier),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Int8(_) => ValueKind::Int8,
            Self::Int16(_) => ValueKind::Int16,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::UInt8(_) => ValueKind::UInt8,
            Self::UInt16(_) => ValueKind::UInt16,
            Self::UInt32(_) => ValueKind::UInt32,
            Self::UInt64(_) => ValueKind::UInt64,
            Self::Word(_) => ValueKind::Word,
            Self::DoubleWord(_) => ValueKind::DoubleWord,
            Self::Float32(_) => ValueKind::Float32,
            Self::Float64(_) => ValueKind::Float64,
            Self::Byte(_) => ValueKind::Byte,
            Self::String(_) => ValueKind::String,
            Self::Buffer(_) => ValueKind::Buffer,
            Self::Tree(_) => ValueKind::Tree,
            Self::Identifier(_) => ValueKind::Identifier,
        }
    }

    /// Encode the payload bytes for this value.
    pub fn to_data(&self) -> Vec<u8> {
        match self {
            Self::Boolean(v) => v.to_data(),
            Self::Int8(v) => v.to_data(),
            Self::Int16(v) => v.to_data(),
            Self::Int32(v) => v.to_data(),
            Self::Int64(v) => v.to_data(),
            Self::UInt8(v) => v.to_data(),
            Self::UInt16(v) => v.to_data(),
            Self::UInt32(v) => v.to_data(),
            Self::UInt64(v) => v.to_data(),
            Self::Word(v) => Word(*v).to_data(),
            Self::DoubleWord(v) => DoubleWord(*v).to_data(),
            Self::Float32(v) => v.to_data(),
            Self::Float64(v) => v.to_data(),
            Self::Byte(v) => Byte(*v).to_data(),
            Self::String(v) => v.to_data(),
            Self::Buffer(v) => v.clone(),
            Self::Tree(v) => v.serialize(),
            Self::Identifier(v) => v.to_data(),
        }
    }

    /// Decode a payload of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidValue`] for a malformed payload, or any
    /// parse error of a nested tree.
    pub fn from_data(kind: ValueKind, data: &[u8]) -> Result<Self, TreeError> {
        Ok(match kind {
            ValueKind::Boolean => Self::Boolean(bool::from_data(data)?),
            ValueKind::Int8 => Self::Int8(i8::from_data(data)?),
            ValueKind::Int16 => Self::Int16(i16::from_data(data)?),
            ValueKind::Int32 => Self::Int32(i32::from_data(data)?),
            ValueKind::Int64 => Self::Int64(i64::from_data(data)?),
            ValueKind::UInt8 => Self::UInt8(u8::from_data(data)?),
            ValueKind::UInt16 => Self::UInt16(u16::from_data(data)?),
            ValueKind::UInt32 => Self::UInt32(u32::from_data(data)?),
            ValueKind::UInt64 => Self::UInt64(u64::from_data(data)?),
            ValueKind::Word => Self::Word(Word::from_data(data)?.0),
            ValueKind::DoubleWord => Self::DoubleWord(DoubleWord::from_data(data)?.0),
            ValueKind::Float32 => Self::Float32(f32::from_data(data)?),
            ValueKind::Float64 => Self::Float64(f64::from_data(data)?),
            ValueKind::Byte => Self::Byte(Byte::from_data(data)?.0),
            ValueKind::String => Self::String(String::from_data(data)?),
            ValueKind::Buffer => Self::Buffer(data.to_vec()),
            ValueKind::Tree => Self::Tree(StructuredBuffer::parse(data)?),
            ValueKind::Identifier => Self::Identifier(Identifier::from_data(data)?),
        })
    }
}

/// Check a non-tree payload without materializing it.
///
/// Nested trees are validated by the tree parser itself so that it can
/// enforce its depth limit.
pub(crate) fn validate_scalar(kind: ValueKind, data: &[u8]) -> Result<(), TreeError> {
    match kind {
        ValueKind::Boolean => bool::from_data(data).map(drop),
        ValueKind::String => std::str::from_utf8(data)
            .map(drop)
            .map_err(|e| TreeError::InvalidValue {
                kind,
                reason: e.to_string(),
            }),
        ValueKind::Identifier => Identifier::from_data(data).map(drop),
        ValueKind::Buffer | ValueKind::Tree => Ok(()),
        _ => match kind.fixed_width() {
            Some(width) if width == data.len() => Ok(()),
            _ => Err(width_error(kind, data.len())),
        },
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Word(v) => write!(f, "{v}"),
            Self::DoubleWord(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "0x{v:02x}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Buffer(v) => {
                write!(f, "{} bytes [", v.len())?;
                for (i, b) in v.iter().take(16).enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{b:02x}")?;
                }
                if v.len() > 16 {
                    f.write_str(" ..")?;
                }
                f.write_str("]")
            }
            Self::Tree(v) => write!(f, "tree with {} elements", v.len()),
            Self::Identifier(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value!(
    bool => Boolean,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    Vec<u8> => Buffer,
    StructuredBuffer => Tree,
    Identifier => Identifier,
);

impl From<Byte> for Value {
    fn from(v: Byte) -> Self {
        Self::Byte(v.0)
    }
}

impl From<Word> for Value {
    fn from(v: Word) -> Self {
        Self::Word(v.0)
    }
}

impl From<DoubleWord> for Value {
    fn from(v: DoubleWord) -> Self {
        Self::DoubleWord(v.0)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Buffer(v.to_vec())
    }
}
