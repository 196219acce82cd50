//! # Inspect Subcommand
//!
//! Parses a serialized tree and prints one line per element, nested trees
//! indented beneath their parent:
//!
//! ```text
//! Name (string): "Ada"
//! Age (uint32): 37
//! child (tree):
//!   ok (boolean): true
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use sbuf_core::StructuredBuffer;

use crate::config::CliConfig;
use crate::read_tree;

/// Arguments for `sbuf inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Serialized tree file.
    pub file: PathBuf,

    /// The file holds base-64 text rather than raw bytes.
    #[arg(long)]
    pub base64: bool,

    /// Print only the summary line.
    #[arg(long)]
    pub summary: bool,
}

/// Execute `sbuf inspect`.
pub fn run_inspect(args: &InspectArgs, config: &CliConfig) -> Result<u8> {
    let tree = read_tree(&args.file, config.encoding(args.base64))?;
    print!("{}", render(&tree, args.summary));
    Ok(0)
}

/// Dump text for `tree`, followed by a summary line.
pub fn render(tree: &StructuredBuffer, summary_only: bool) -> String {
    let summary = format!(
        "{} elements, {} bytes serialized\n",
        tree.len(),
        tree.serialized_len()
    );
    if summary_only {
        summary
    } else {
        format!("{tree}{summary}")
    }
}
