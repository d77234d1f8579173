//! CLI command definitions for the `jarvis` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod models;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use jarvis_types::theme::Theme;

/// Chat with an AI assistant from your terminal.
#[derive(Parser)]
#[command(name = "jarvis", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "JARVIS_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Model to select at startup.
        #[arg(long)]
        model: Option<String>,

        /// Colour theme (light or dark).
        #[arg(long)]
        theme: Option<Theme>,

        /// Seed for reproducible stub replies.
        #[arg(long)]
        seed: Option<u64>,

        /// Probability in [0, 1] that a stub request fails.
        #[arg(long)]
        failure_rate: Option<f64>,
    },

    /// List the available models.
    Models,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}
