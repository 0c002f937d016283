//! # Phasecast CLI Module
//!
//! This module implements the CLI interface for Phasecast.
//!
//! ## Available Commands
//!
//! - `phases` - List the lifecycle phases
//! - `classify` - Show the phase of a snapshot file
//! - `notify` - Compare two snapshot files and notify on a phase change
//! - `channels` - Show which channels the configuration registers

mod commands;

use clap::{Parser, Subcommand};
use phasecast_core::PhasecastError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Phasecast - video phase transition notifier
///
/// Detects when a video moves between lifecycle phases and tells
/// every configured channel about it.
#[derive(Parser, Debug)]
#[command(name = "phasecast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List lifecycle phases with their ranks
    Phases,

    /// Classify a video snapshot (JSON file)
    Classify {
        /// Path to the snapshot file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Notify configured channels if two snapshots differ in phase
    Notify {
        /// Snapshot before the change
        #[arg(long)]
        old: PathBuf,

        /// Snapshot after the change
        #[arg(long)]
        new: PathBuf,

        /// Seconds to wait for deliveries before cancelling them
        #[arg(short, long, default_value = "30")]
        grace_secs: u64,
    },

    /// Show which notification channels are configured
    Channels,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), PhasecastError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Phases) | None => cmd_phases(json_mode),
        Some(Commands::Classify { file }) => cmd_classify(&file, json_mode),
        Some(Commands::Notify {
            old,
            new,
            grace_secs,
        }) => cmd_notify(&cli.config, &old, &new, grace_secs, json_mode).await,
        Some(Commands::Channels) => cmd_channels(&cli.config, json_mode),
    }
}
