//! # Error Hierarchy
//!
//! Structured error types for the StructuredBuffer core, built with
//! `thiserror`. Each subsystem has its own enum carrying the diagnostic
//! context needed to locate corruption: the marker that failed, the byte
//! offset, the declared versus available length.
//!
//! Absence ([`TreeError::NotFound`]) is the one expected, recoverable
//! condition. Every other variant indicates corrupted input or a programming
//! error and is surfaced to the immediate caller without substitution.

use thiserror::Error;

use crate::frame::Marker;
use crate::kind::ValueKind;

/// Errors decoding a single element frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A marker constant did not match.
    #[error("malformed frame: {marker} marker mismatch at byte offset {offset}")]
    MalformedFrame {
        /// Which of the four markers failed.
        marker: Marker,
        /// Byte offset of the marker within the decoded input.
        offset: usize,
    },

    /// The buffer ended before a length-declared field was fully present.
    #[error("truncated frame: {field} at byte offset {offset} needs {needed} bytes, {available} available")]
    Truncated {
        /// The frame field being read.
        field: &'static str,
        /// Byte offset where the field starts.
        offset: usize,
        /// Bytes the field requires.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },

    /// The kind byte is not part of the closed vocabulary.
    #[error("unknown value kind tag 0x{tag:02x} at byte offset {offset}")]
    UnknownKind {
        /// The raw kind byte.
        tag: u8,
        /// Byte offset of the kind byte.
        offset: usize,
    },

    /// The element name is empty, unterminated, or not UTF-8.
    #[error("invalid element name at byte offset {offset}: {reason}")]
    InvalidName {
        /// Byte offset of the name field.
        offset: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl FrameError {
    /// Rebase the byte offset onto an enclosing buffer starting at `base`.
    pub fn shifted(self, base: usize) -> Self {
        match self {
            Self::MalformedFrame { marker, offset } => Self::MalformedFrame {
                marker,
                offset: offset + base,
            },
            Self::Truncated {
                field,
                offset,
                needed,
                available,
            } => Self::Truncated {
                field,
                offset: offset + base,
                needed,
                available,
            },
            Self::UnknownKind { tag, offset } => Self::UnknownKind {
                tag,
                offset: offset + base,
            },
            Self::InvalidName { offset, reason } => Self::InvalidName {
                offset: offset + base,
                reason,
            },
        }
    }
}

/// Errors from value tree operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// A frame inside the serialized tree failed to decode.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Bytes remained after the last complete frame.
    #[error("{remaining} trailing bytes after the last frame at byte offset {offset}")]
    TrailingData {
        /// Offset of the first unconsumed byte.
        offset: usize,
        /// Number of unconsumed bytes.
        remaining: usize,
    },

    /// No element with this name exists.
    #[error("element not found: \"{0}\"")]
    NotFound(String),

    /// The element exists but holds a different kind.
    #[error("type mismatch for \"{name}\": requested {expected}, stored {found}")]
    TypeMismatch {
        /// Element name.
        name: String,
        /// The kind the caller asked for.
        expected: ValueKind,
        /// The kind actually stored.
        found: ValueKind,
    },

    /// Element names must be non-empty and free of NUL bytes.
    #[error("invalid element name: {0:?}")]
    InvalidName(String),

    /// The stored payload does not decode as its declared kind.
    #[error("invalid {kind} payload: {reason}")]
    InvalidValue {
        /// Declared kind of the element.
        kind: ValueKind,
        /// What was wrong with the payload.
        reason: String,
    },

    /// A serialized tree carried the same name twice.
    #[error("duplicate element name in serialized tree: \"{0}\"")]
    DuplicateName(String),

    /// Nested trees exceeded the depth limit on `parse` or `put`.
    #[error("nested trees exceed the depth limit of {limit}")]
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
    },
}

/// Errors constructing an [`Identifier`](crate::identifier::Identifier).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Text matched none of the three accepted shapes.
    #[error("invalid identifier format: \"{0}\" (expected 32 hex digits, 8-4-4-4-12 hyphenated, or braced hyphenated)")]
    InvalidFormat(String),

    /// The embedded category tag is not part of the vocabulary.
    #[error("unknown identifier category tag {0}")]
    UnknownCategory(u8),
}
