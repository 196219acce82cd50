//! # sbuf-core: StructuredBuffer Value Trees
//!
//! The interchange substrate every other layer of the platform builds on:
//! session tokens, audit records, job parameters, and dataset metadata are
//! all [`StructuredBuffer`] trees. This crate defines the tree, its exact
//! binary wire format, and the category-tagged [`Identifier`].
//!
//! ## Key Design Principles
//!
//! 1. **Closed kind vocabulary.** [`ValueKind`] has eighteen variants with
//!    pinned wire tags. Every consumer matches exhaustively; nothing inspects
//!    types at runtime.
//!
//! 2. **Byte-exact frames.** Every element is one four-marker frame
//!    ([`frame`]). A tree is the concatenation of its frames with zero
//!    trailing bytes, so `serialize` is deterministic and `parse` can pinpoint
//!    the offset of any corruption.
//!
//! 3. **Snapshots, not references.** Nested trees are stored as their
//!    serialized bytes and materialized on `get`. A tree cannot contain a
//!    cycle and every copy is deep.
//!
//! 4. **Strict errors.** Absence, kind mismatch, and corruption are distinct
//!    error variants. Nothing substitutes a default.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sbuf-*` crates (this is the leaf of the DAG).
//! - No I/O, no global state, no `unsafe`.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod frame;
pub mod hash;
pub mod identifier;
pub mod kind;
pub mod tree;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{FrameError, IdentifierError, TreeError};
pub use frame::{decode_frame, encode_frame, DecodedFrame, Marker, MIN_FRAME_LEN};
pub use hash::name_hash;
pub use identifier::{EntityCategory, Identifier, IdentifierStyle};
pub use kind::{ValueKind, VALUE_KIND_COUNT};
pub use tree::{ElementRef, StructuredBuffer, MAX_NESTING_DEPTH};
pub use value::{Byte, DoubleWord, TreeValue, Value, Word};
