//! # sbuf-text: Text Bridges for StructuredBuffer Trees
//!
//! Moves [`StructuredBuffer`](sbuf_core::StructuredBuffer) trees through
//! text-oriented channels: URLs, REST payloads, log lines, and metadata
//! headers.
//!
//! - [`base64`]: standard base-64 transport. Exact; `tree_to_base64` and
//!   `tree_from_base64` preserve every kind, width, and byte.
//! - [`escape`]: the JSON string-escaping rule.
//! - [`json`]: tree ↔ JSON conversion. Lossy for numeric width (see the
//!   module docs).
//!
//! ## Crate Policy
//!
//! - Depends only on `sbuf-core` among internal crates.
//! - No I/O. Logging through `tracing` at `debug`/`trace` only.

pub mod base64;
pub mod error;
pub mod escape;
pub mod json;

pub use error::{Base64Error, BridgeError};
pub use json::{from_json_str, from_json_value, to_json_string, to_json_value};
