//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every field has a default, so
//! an empty file (or no file) is valid. Command-line flags override values
//! loaded here.
//!
//! ```yaml
//! identifier_style: braced
//! pretty_json: true
//! input_encoding: base64
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use sbuf_core::IdentifierStyle;

/// How serialized tree input files are encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEncoding {
    /// Raw frame bytes.
    #[default]
    Binary,
    /// Base-64 text of the frame bytes.
    Base64,
}

/// Settings shared by all subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Rendering for `id new` when `--style` is absent.
    pub identifier_style: IdentifierStyle,
    /// Pretty-print `to-json` output unless `--compact` is given.
    pub pretty_json: bool,
    /// Encoding of tree input files when `--base64` is absent.
    pub input_encoding: InputEncoding,
}

impl CliConfig {
    /// Load from a YAML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config YAML: {}", path.display()))?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// As [`CliConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Input encoding after applying a `--base64` flag.
    pub fn encoding(&self, base64_flag: bool) -> InputEncoding {
        if base64_flag {
            InputEncoding::Base64
        } else {
            self.input_encoding
        }
    }
}
