//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// serve-webhooks: post-serve webhook dispatcher
///
/// Fires a configured webhook for a served request, the way a mock server
/// would after answering it.
#[derive(Debug, Parser)]
#[command(name = "serve-webhooks")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: fire)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Webhook target URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// HTTP method for the webhook
    #[arg(long)]
    pub method: Option<String>,

    /// Webhook headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V")]
    pub headers: Vec<String>,

    /// Handlebars body template for the webhook
    #[arg(long)]
    pub body: Option<String>,

    /// Root directory for the `file` template helper
    #[arg(long = "files-root")]
    pub files_root: Option<PathBuf>,

    /// Maximum number of concurrent deliveries
    #[arg(long)]
    pub workers: Option<usize>,

    /// Maximum number of webhooks waiting for a worker
    #[arg(long = "queue-capacity")]
    pub queue_capacity: Option<usize>,

    /// Timeout for one outbound call, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Method of the served request the webhook reacts to
    #[arg(long = "request-method")]
    pub request_method: Option<String>,

    /// Target (path and query) of the served request
    #[arg(long = "request-url")]
    pub request_url: Option<String>,

    /// Body of the served request
    #[arg(long = "request-body")]
    pub request_body: Option<String>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for serve-webhooks
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "serve-webhooks.toml")]
        output: PathBuf,
    },

    /// Dispatch the configured webhook once and wait for it to finish
    Fire,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
