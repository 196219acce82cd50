//! # Identifier Subcommands
//!
//! - `sbuf id new --category <name> [--style plain|hyphenated|braced]`
//! - `sbuf id inspect <TEXT>`: category, tag, and all three renderings.
//! - `sbuf id categories`: the category vocabulary with wire tags.

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use sbuf_core::{EntityCategory, Identifier, IdentifierStyle};

use crate::config::CliConfig;

/// Arguments for `sbuf id`.
#[derive(Args, Debug)]
pub struct IdArgs {
    #[command(subcommand)]
    pub command: IdCommand,
}

/// Identifier operations.
#[derive(Subcommand, Debug)]
pub enum IdCommand {
    /// Generate a fresh identifier.
    New {
        /// Entity category (e.g. dataset, digital_contract, session).
        #[arg(long)]
        category: EntityCategory,
        /// Text rendering (defaults to the configured style).
        #[arg(long, value_enum)]
        style: Option<StyleArg>,
        /// Number of identifiers to generate.
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Parse an identifier and show its category and renderings.
    Inspect {
        /// Identifier text in any accepted shape.
        text: String,
    },
    /// List the entity categories and their tags.
    Categories,
}

/// Command-line spelling of [`IdentifierStyle`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleArg {
    /// 32 hex digits.
    Plain,
    /// 8-4-4-4-12.
    Hyphenated,
    /// {8-4-4-4-12}.
    Braced,
}

impl From<StyleArg> for IdentifierStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Plain => Self::Plain,
            StyleArg::Hyphenated => Self::Hyphenated,
            StyleArg::Braced => Self::Braced,
        }
    }
}

/// Execute `sbuf id`.
pub fn run_id(args: &IdArgs, config: &CliConfig) -> Result<u8> {
    let output = match &args.command {
        IdCommand::New {
            category,
            style,
            count,
        } => {
            let style = style.map_or(config.identifier_style, IdentifierStyle::from);
            generate(*category, style, *count)
        }
        IdCommand::Inspect { text } => describe(text)?,
        IdCommand::Categories => categories(),
    };
    print!("{output}");
    Ok(0)
}

/// `count` fresh identifiers, one per line.
pub fn generate(category: EntityCategory, style: IdentifierStyle, count: usize) -> String {
    tracing::debug!(%category, ?style, count, "generating identifiers");
    (0..count)
        .map(|_| format!("{}\n", Identifier::new(category).format(style)))
        .collect()
}

/// Multi-line description of a parsed identifier.
///
/// # Errors
///
/// Fails if `text` is not a valid identifier.
pub fn describe(text: &str) -> Result<String> {
    let id = Identifier::parse(text.trim()).with_context(|| format!("parsing identifier {text:?}"))?;
    Ok(format!(
        "category:   {} (tag {})\nplain:      {}\nhyphenated: {}\nbraced:     {}\n",
        id.category(),
        id.category_tag(),
        id.format(IdentifierStyle::Plain),
        id.format(IdentifierStyle::Hyphenated),
        id.format(IdentifierStyle::Braced),
    ))
}

/// The category vocabulary as a table.
pub fn categories() -> String {
    EntityCategory::ALL
        .iter()
        .map(|c| format!("{:>3}  {}\n", c.tag(), c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_uses_category_and_style() {
        let out = generate(EntityCategory::Dataset, IdentifierStyle::Braced, 3);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert_eq!(line.len(), 38);
            assert!(line.starts_with('{') && line.ends_with('}'));
            let id = Identifier::parse(line).unwrap();
            assert_eq!(id.category(), EntityCategory::Dataset);
        }
    }

    #[test]
    fn describe_shows_all_renderings() {
        let id = Identifier::new(EntityCategory::Job);
        let text = describe(&id.format(IdentifierStyle::Plain)).unwrap();
        assert!(text.contains(&format!("category:   job (tag {})", EntityCategory::Job.tag())));
        assert!(text.contains(&id.format(IdentifierStyle::Hyphenated)));
        assert!(text.contains(&id.format(IdentifierStyle::Braced)));
    }

    #[test]
    fn describe_rejects_bad_text() {
        let err = describe("not-an-id").unwrap_err();
        assert!(format!("{err:#}").contains("invalid identifier format"));
    }

    #[test]
    fn categories_lists_every_tag() {
        let table = categories();
        assert_eq!(table.lines().count(), EntityCategory::ALL.len());
        assert!(table.starts_with("  1  organization\n"));
    }

    #[test]
    fn style_arg_maps_to_style() {
        assert_eq!(IdentifierStyle::from(StyleArg::Plain), IdentifierStyle::Plain);
        assert_eq!(IdentifierStyle::from(StyleArg::Braced), IdentifierStyle::Braced);
    }

    #[test]
    fn run_id_inspect_invalid_is_error() {
        let args = IdArgs {
            command: IdCommand::Inspect {
                text: "{zz}".to_string(),
            },
        };
        assert!(run_id(&args, &CliConfig::default()).is_err());
    }
}
