//! # sbuf-cli: CLI Tool for StructuredBuffer Trees
//!
//! Provides the `sbuf` command-line interface.
//!
//! ## Subcommands
//!
//! - `sbuf inspect`: Parse a serialized tree and print an indented dump.
//! - `sbuf to-json` / `sbuf from-json`: Convert between trees and JSON.
//! - `sbuf base64`: Encode or decode base-64 transport text.
//! - `sbuf id`: Generate or inspect category-tagged identifiers.
//!
//! ```bash
//! sbuf inspect token.bin
//! sbuf to-json token.b64 --base64 --pretty
//! sbuf from-json params.json --out params.bin
//! sbuf id new --category dataset --style braced
//! ```
//!
//! Handlers return `anyhow::Result<u8>`; `main` maps the code (or error) to
//! the process exit status.

pub mod config;
pub mod convert;
pub mod id;
pub mod inspect;

use std::path::Path;

use anyhow::{Context, Result};

use sbuf_core::StructuredBuffer;

use crate::config::InputEncoding;

/// Read a serialized tree from `path` in the given encoding.
///
/// Base-64 input may carry surrounding whitespace (a trailing newline from
/// an editor or `echo`).
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid base-64 (when expected),
/// or does not parse as a tree.
pub fn read_tree(path: &Path, encoding: InputEncoding) -> Result<StructuredBuffer> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let tree = match encoding {
        InputEncoding::Binary => StructuredBuffer::parse(&bytes),
        InputEncoding::Base64 => {
            let text = std::str::from_utf8(&bytes)
                .with_context(|| format!("{} is not UTF-8 text", path.display()))?;
            let raw = sbuf_text::base64::decode(text.trim())
                .with_context(|| format!("decoding base-64 in {}", path.display()))?;
            StructuredBuffer::parse(&raw)
        }
    }
    .with_context(|| format!("parsing tree from {}", path.display()))?;
    tracing::debug!(path = %path.display(), elements = tree.len(), "read tree");
    Ok(tree)
}

/// Write `bytes` to `out`, or to stdout when `out` is `None`.
///
/// # Errors
///
/// Fails if the destination cannot be written.
pub fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote output");
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("writing to stdout")?;
            stdout.flush().context("flushing stdout")?;
        }
    }
    Ok(())
}
