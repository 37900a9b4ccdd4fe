//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::event::EventArgs;

/// Analytics event client.
///
/// Sends events with optional counts, sums and segmentation to a
/// Countly-compatible analytics server.
#[derive(Debug, Parser)]
#[command(name = "mk", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a single event in its own session.
    Event(EventArgs),

    /// Show the persisted device identity.
    Device {
        /// Generate a new device ID, keeping the label.
        #[arg(long)]
        reset: bool,
    },

    /// Show the effective configuration.
    Config,
}
