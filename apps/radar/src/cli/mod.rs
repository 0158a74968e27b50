//! # Radar CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `evaluate` - Evaluate a radar from a JSON request file
//! - `digest` - Validate a binary snapshot and print or verify its BLAKE3 digest
//! - `config` - Print the effective engine configuration

mod commands;

use crate::settings::load_engine_config;
use clap::{Parser, Subcommand, ValueEnum};
use radar_core::RadarError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Technology radar ring-decision engine.
///
/// Places technologies into Adopt / Trial / Assess / Hold from adoption
/// signals, capped by risk and adjusted to the organization.
#[derive(Parser, Debug)]
#[command(name = "radar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format of `evaluate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Snapshot, digest and warnings as JSON
    #[default]
    Json,
    /// One line per technology, grouped by quadrant
    Text,
    /// Canonical binary snapshot (requires --output)
    Binary,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Evaluate a radar
    Evaluate {
        /// Request file: {"org": {...}, "technologies": {...}}
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write the result to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a binary snapshot and print its digest
    Digest {
        /// Snapshot file written by `evaluate -f binary`
        #[arg(short, long)]
        input: PathBuf,

        /// Fail unless the snapshot digest equals this hex string
        #[arg(short, long)]
        expect: Option<String>,
    },

    /// Print the effective engine configuration
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), RadarError> {
    let config = load_engine_config(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, &host, port).await,
        Some(Commands::Evaluate {
            input,
            format,
            output,
        }) => cmd_evaluate(config, &input, format, output.as_deref()),
        Some(Commands::Digest { input, expect }) => {
            cmd_digest(&input, expect.as_deref(), json_mode)
        }
        Some(Commands::Config) | None => cmd_config(&config, json_mode),
    }
}
