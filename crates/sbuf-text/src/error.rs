//! # Text Bridge Errors
//!
//! `thiserror` enums for the base-64 codec and the JSON bridge. Core tree
//! failures pass through unchanged as [`BridgeError::Tree`] so a caller
//! decoding `base64 -> bytes -> tree` sees the exact frame offset that failed.

use thiserror::Error;

use sbuf_core::TreeError;

/// Errors decoding base-64 text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Base64Error {
    /// The text is not a valid standard base-64 encoding.
    #[error("invalid base-64 at byte offset {offset}: {reason}")]
    InvalidEncoding {
        /// Byte offset of the offending character (or the input length for
        /// a length error).
        offset: usize,
        /// What was wrong.
        reason: &'static str,
    },

    /// More than two `=` padding characters.
    #[error("base-64 padding count {padding} outside the valid range 0..=2")]
    OutOfRange {
        /// Number of trailing `=` found.
        padding: usize,
    },
}

/// Errors converting between trees and text.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The underlying tree operation failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A buffer payload or transported tree was not valid base-64.
    #[error(transparent)]
    Base64(#[from] Base64Error),

    /// The JSON text could not be parsed or rendered.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A tree can only be built from a JSON object.
    #[error("top-level JSON value must be an object, found {found}")]
    NotAnObject {
        /// JSON type actually found.
        found: &'static str,
    },

    /// The JSON value has no corresponding element kind.
    #[error("JSON {json_type} at \"{name}\" has no element kind")]
    Unrepresentable {
        /// Dotted path of the offending member.
        name: String,
        /// JSON type of the member.
        json_type: &'static str,
    },

    /// JSON numbers cannot carry NaN or infinities.
    #[error("non-finite float at \"{name}\" cannot be rendered as JSON")]
    NonFiniteFloat {
        /// Dotted path of the offending element.
        name: String,
    },

    /// A backslash escape in JSON string text was malformed.
    #[error("invalid escape sequence at byte offset {offset}")]
    InvalidEscape {
        /// Byte offset of the backslash.
        offset: usize,
    },
}
