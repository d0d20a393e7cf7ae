//! Configuration layer for serve-webhooks.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The webhook `url` has no default and must come from the CLI or the file.
//!
//! # Headers
//!
//! A header named with `--header` replaces every value the TOML file gives
//! for that name (compared case-insensitively). Other TOML headers are kept.
//!
//! # TOML-only options
//!
//! - `dispatcher.shutdown_timeout` (default: 10s)
//!
//! # CLI-only options
//!
//! The served request the webhook reacts to (`--request-method`,
//! `--request-url`, `--request-body`) exists only on the command line.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod cli_tests;

pub use cli::{Cli, Command};
pub use error::ConfigError;
pub use toml::{
    DispatcherSection, FilesSection, TomlConfig, WebhookSection, default_config_template,
};
pub use validated::{ValidatedConfig, write_default_config};
