//! Errors raised while loading and validating configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::template::TemplateError;

/// Why a configuration could not be loaded, merged, or written.
///
/// Every variant maps to exit code 1.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Cannot read config file '{}': {source}", path.display())]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The `init` template could not be written.
    #[error("Cannot write config file '{}': {source}", path.display())]
    Write {
        /// Path that was written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Config file is not valid: {0}")]
    Parse(#[from] toml::de::Error),

    /// Neither the CLI nor the file names a webhook target.
    #[error("No webhook URL configured. Use --url or set webhook.url in the config file")]
    MissingUrl,

    /// The webhook target is not an absolute `http`/`https` URL.
    #[error("Webhook URL '{url}' is not usable: {reason}")]
    InvalidUrl {
        /// URL as configured
        url: String,
        /// What is wrong with it
        reason: String,
    },

    /// The served request target is not a path.
    #[error("Served request target '{0}' must start with '/'")]
    InvalidTarget(String),

    /// A count or duration that must be positive is zero.
    #[error("{field} must be greater than 0")]
    Zero {
        /// Setting name as written in the config file
        field: &'static str,
    },

    /// A pool size beyond what the runtime can allocate.
    #[error("{field} must be at most {max}")]
    TooLarge {
        /// Setting name as written in the config file
        field: &'static str,
        /// Largest accepted value
        max: usize,
    },

    /// A method name that is not one of the supported HTTP methods.
    #[error("Unknown HTTP method '{0}'")]
    UnknownMethod(String),

    /// A `--header` argument without a separator.
    #[error("Header '{0}' is not in 'Key=Value' or 'Key: Value' form")]
    HeaderFormat(String),

    /// A header name or value that cannot go on the wire.
    #[error("Header '{name}' cannot be sent: {reason}")]
    Header {
        /// Header name as configured
        name: String,
        /// What is wrong with the name or value
        reason: String,
    },

    /// The body template does not compile.
    #[error("Body template does not compile: {0}")]
    Template(#[source] TemplateError),
}
