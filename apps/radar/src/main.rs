//! # Radar - Ring-Decision Server and CLI
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              apps/radar (THE BINARY)         │
//! │                                              │
//! │   ┌─────────────┐        ┌─────────────┐     │
//! │   │    CLI      │        │  HTTP API   │     │
//! │   │   (clap)    │        │   (axum)    │     │
//! │   └──────┬──────┘        └──────┬──────┘     │
//! │          └───────────┬──────────┘            │
//! │                      ▼                       │
//! │              ┌──────────────┐                │
//! │              │  radar-core  │                │
//! │              │ (THE ENGINE) │                │
//! │              └──────────────┘                │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! radar server --host 0.0.0.0 --port 8080
//! radar evaluate -i radar.json -f text
//! radar evaluate -i radar.json -f binary -o radar.bin
//! radar digest -i radar.bin --expect <blake3-hex>
//! radar --config radar.toml config
//! ```

use clap::Parser;
use radar::cli::{self, Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !cli.quiet && matches!(cli.command, Some(Commands::Server { .. })) {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// RADAR_LOG_FORMAT=json enables machine-parseable output; RUST_LOG wins over
/// the default filter.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("RADAR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "radar=debug,radar_core=debug,tower_http=debug"
    } else {
        "radar=info,radar_core=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so evaluate output on stdout stays clean.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn print_banner() {
    println!(
        r#"
  ┌─────────────────────────────────┐
  │  ADOPT · TRIAL · ASSESS · HOLD  │
  └─────────────────────────────────┘

  Radar Ring-Decision Engine v{}

  Deterministic • Risk-capped • Explained
"#,
        env!("CARGO_PKG_VERSION")
    );
}
