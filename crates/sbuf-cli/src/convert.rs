//! # Conversion Subcommands
//!
//! - `sbuf to-json <FILE>`: render a serialized tree as JSON.
//! - `sbuf from-json <FILE> --out <FILE>`: build a tree from a JSON object
//!   and write its serialized bytes (or base-64 text with `--base64`).
//! - `sbuf base64 encode|decode <FILE>`: raw base-64 transport of any file.
//!
//! JSON conversion infers the narrowest integer kind on the way in, so a
//! `to-json` / `from-json` round trip may change element widths. The binary
//! and base-64 paths are exact.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use sbuf_text::base64;

use crate::config::{CliConfig, InputEncoding};
use crate::{read_tree, write_output};

/// Arguments for `sbuf to-json`.
#[derive(Args, Debug)]
pub struct ToJsonArgs {
    /// Serialized tree file.
    pub file: PathBuf,

    /// The file holds base-64 text rather than raw bytes.
    #[arg(long)]
    pub base64: bool,

    /// Indent the output.
    #[arg(long)]
    pub pretty: bool,

    /// Single-line output, even when the config enables `pretty_json`.
    #[arg(long, conflicts_with = "pretty")]
    pub compact: bool,

    /// Output file (stdout if omitted).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl ToJsonArgs {
    /// Whether to indent: an explicit flag wins, then the config.
    pub fn pretty_output(&self, config: &CliConfig) -> bool {
        if self.compact {
            false
        } else {
            self.pretty || config.pretty_json
        }
    }
}

/// Arguments for `sbuf from-json`.
#[derive(Args, Debug)]
pub struct FromJsonArgs {
    /// JSON file holding one object.
    pub file: PathBuf,

    /// Write base-64 text instead of raw bytes (defaults to the configured
    /// input encoding).
    #[arg(long)]
    pub base64: bool,

    /// Output file.
    #[arg(long)]
    pub out: PathBuf,
}

/// Arguments for `sbuf base64`.
#[derive(Args, Debug)]
pub struct Base64Args {
    #[command(subcommand)]
    pub command: Base64Command,
}

/// Base-64 transport operations.
#[derive(Subcommand, Debug)]
pub enum Base64Command {
    /// Encode a file's bytes as base-64 text.
    Encode {
        /// Input file.
        file: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode base-64 text back to bytes.
    Decode {
        /// Input file.
        file: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Execute `sbuf to-json`.
pub fn run_to_json(args: &ToJsonArgs, config: &CliConfig) -> Result<u8> {
    let tree = read_tree(&args.file, config.encoding(args.base64))?;
    let mut json = sbuf_text::to_json_string(&tree, args.pretty_output(config))
        .with_context(|| format!("converting {} to JSON", args.file.display()))?;
    json.push('\n');
    write_output(args.out.as_deref(), json.as_bytes())?;
    Ok(0)
}

/// Execute `sbuf from-json`.
pub fn run_from_json(args: &FromJsonArgs, config: &CliConfig) -> Result<u8> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let tree = sbuf_text::from_json_str(&text)
        .with_context(|| format!("building tree from {}", args.file.display()))?;
    tracing::info!(elements = tree.len(), "built tree from JSON");

    let bytes = match config.encoding(args.base64) {
        InputEncoding::Binary => tree.serialize(),
        InputEncoding::Base64 => {
            let mut text = base64::tree_to_base64(&tree);
            text.push('\n');
            text.into_bytes()
        }
    };
    write_output(Some(&args.out), &bytes)?;
    Ok(0)
}

/// Execute `sbuf base64`.
pub fn run_base64(args: &Base64Args) -> Result<u8> {
    match &args.command {
        Base64Command::Encode { file, out } => {
            let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
            let mut text = base64::encode(&bytes);
            text.push('\n');
            write_output(out.as_deref(), text.as_bytes())?;
        }
        Base64Command::Decode { file, out } => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let bytes = base64::decode(text.trim())
                .with_context(|| format!("decoding base-64 in {}", file.display()))?;
            write_output(out.as_deref(), &bytes)?;
        }
    }
    Ok(0)
}
