//! # Phasecast
//!
//! Command-line entry point.
//!
//! ## Usage
//!
//! ```bash
//! # List phases
//! phasecast phases
//!
//! # Classify a snapshot
//! phasecast classify -f video.json
//!
//! # Notify configured channels about a change
//! phasecast --config phasecast.toml notify --old before.json --new after.json
//! ```

use clap::Parser;
use phasecast::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // PHASECAST_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("PHASECAST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "phasecast=debug,phasecast_core=debug"
    } else {
        "phasecast=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so JSON command output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        eprintln!("Phasecast v{}", env!("CARGO_PKG_VERSION"));
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
