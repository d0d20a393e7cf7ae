//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;
use crate::webhook::HttpHeaders;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Worker pool and timeout configuration
    #[serde(default)]
    pub dispatcher: DispatcherSection,

    /// Template file helper configuration
    #[serde(default)]
    pub files: FilesSection,

    /// Webhook definition section
    #[serde(default)]
    pub webhook: WebhookSection,
}

/// Worker pool and timeout configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherSection {
    /// Maximum number of concurrent deliveries
    pub workers: Option<usize>,

    /// Maximum number of webhooks waiting for a worker
    pub queue_capacity: Option<usize>,

    /// Timeout for one outbound call, in seconds
    pub request_timeout: Option<u64>,

    /// Time allowed for pending webhooks to drain on exit, in seconds
    pub shutdown_timeout: Option<u64>,
}

/// Template file helper configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesSection {
    /// Root directory for `{{file "..."}}`; a leading `~` is expanded
    pub root: Option<String>,
}

/// Webhook definition section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSection {
    /// Webhook target URL
    pub url: Option<String>,

    /// HTTP method (default: POST)
    pub method: Option<String>,

    /// HTTP headers; each value is a string or an array of strings
    #[serde(default)]
    pub headers: HttpHeaders,

    /// Handlebars body template
    pub body: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# serve-webhooks Configuration File

[dispatcher]
# Maximum number of concurrent deliveries (default: 10)
workers = 10

# Webhooks waiting for a worker before new ones are rejected (default: 1024)
# queue_capacity = 1024

# Timeout for one outbound call, in seconds (default: 30)
request_timeout = 30

# Time allowed for pending webhooks to finish on exit, in seconds (default: 10)
# shutdown_timeout = 10

[files]
# Root directory for the {{file "relative/path"}} template helper (default: "__files")
# root = "~/mocks/__files"

[webhook]
# Target URL (required, http or https)
# url = "https://example.com/callback"

# HTTP method: GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS or TRACE (default: POST)
# Only POST, PUT and PATCH send a body.
# method = "POST"

# Handlebars body template
# Available variables: {{request.url}}, {{request.path}}, {{request.method}},
# {{request.body}}, {{request.headers.<name>}}, {{request.query.<name>}},
# {{response.status}}, {{parameters.<field>}}
# body = '{"path": "{{request.path}}"}'

# HTTP headers; use an array to send several values
# [webhook.headers]
# Content-Type = "application/json"
# X-Trace = ["a", "b"]
"#
    .to_string()
}
