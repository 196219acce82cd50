//! # sbuf CLI entry point
//!
//! Parses command-line arguments, loads the optional YAML configuration, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sbuf_cli::config::CliConfig;
use sbuf_cli::convert::{run_base64, run_from_json, run_to_json, Base64Args, FromJsonArgs, ToJsonArgs};
use sbuf_cli::id::{run_id, IdArgs};
use sbuf_cli::inspect::{run_inspect, InspectArgs};

/// StructuredBuffer toolchain.
///
/// Inspects serialized value trees, converts them between binary, base-64,
/// and JSON, and generates or inspects category-tagged identifiers.
#[derive(Parser, Debug)]
#[command(name = "sbuf", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the elements of a serialized tree.
    Inspect(InspectArgs),

    /// Render a serialized tree as JSON.
    ToJson(ToJsonArgs),

    /// Build a serialized tree from a JSON object.
    FromJson(FromJsonArgs),

    /// Base-64 transport encoding.
    Base64(Base64Args),

    /// Generate or inspect identifiers.
    Id(IdArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("sbuf CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match CliConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Inspect(args) => run_inspect(&args, &config),
        Commands::ToJson(args) => run_to_json(&args, &config),
        Commands::FromJson(args) => run_from_json(&args, &config),
        Commands::Base64(args) => run_base64(&args),
        Commands::Id(args) => run_id(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
