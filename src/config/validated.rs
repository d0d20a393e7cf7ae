//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use http::Method;
use http::header::{HeaderName, HeaderValue};
use url::Url;

use crate::serve::{LoggedRequest, ResponseDefinition, ServeEvent};
use crate::template::HandlebarsRenderer;
use crate::webhook::{DispatcherConfig, HttpHeaders, RequestMethod, WebhookDefinition};

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// This struct represents a complete, validated configuration where all
/// required fields are present and all values have been validated.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// The webhook to dispatch; method and URL are always set
    pub webhook: WebhookDefinition,

    /// Worker pool and queue sizing
    pub dispatcher: DispatcherConfig,

    /// Timeout for one outbound call
    pub request_timeout: Duration,

    /// Time allowed for pending webhooks to drain on exit
    pub shutdown_timeout: Duration,

    /// Root directory for the `file` template helper
    pub files_root: PathBuf,

    /// The served exchange the webhook reacts to
    pub event: ServeEvent,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ url: {}, method: {}, headers: {}, workers: {}, queue_capacity: {}, \
             request_timeout: {}s, shutdown_timeout: {}s, files_root: {} }}",
            self.webhook.url().unwrap_or_default(),
            self.webhook
                .method()
                .map_or_else(String::new, |m| m.to_string()),
            self.webhook.headers().len(),
            self.dispatcher.workers(),
            self.dispatcher.queue_capacity(),
            self.request_timeout.as_secs(),
            self.shutdown_timeout.as_secs(),
            self.files_root.display(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The webhook URL is missing, invalid, or not `http`/`https`
    /// - The webhook or served-request method is unknown
    /// - Header format, name, or value is invalid
    /// - The body template does not compile
    /// - Pool sizes or durations are zero
    /// - Pool sizes exceed [`DispatcherConfig::MAX_SIZE`]
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let url = Self::resolve_url(cli, toml)?;
        let method = Self::resolve_method(cli, toml)?;
        let headers = Self::resolve_headers(cli, toml)?;
        let body = Self::resolve_body(cli, toml)?;

        let mut webhook = WebhookDefinition::new().with_method(method).with_url(url);
        for header in &headers {
            for value in header.values() {
                webhook = webhook.with_header(header.key(), value.as_str());
            }
        }
        if let Some(body) = body {
            webhook = webhook.with_body(body);
        }

        Ok(Self {
            webhook,
            dispatcher: Self::resolve_dispatcher(cli, toml)?,
            request_timeout: Self::resolve_request_timeout(cli, toml)?,
            shutdown_timeout: Self::resolve_shutdown_timeout(toml)?,
            files_root: Self::resolve_files_root(cli, toml),
            event: Self::build_event(cli)?,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Returns the URL as configured once it parses as `http`/`https`.
    fn resolve_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        // CLI takes precedence
        let url_str = cli
            .url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.webhook.url.as_deref()))
            .ok_or(ConfigError::MissingUrl)?;

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url_str.to_string()),
            scheme => Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: format!("scheme '{scheme}' is not http or https"),
            }),
        }
    }

    fn resolve_method(cli: &Cli, toml: Option<&TomlConfig>) -> Result<RequestMethod, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let method_str = cli
            .method
            .as_deref()
            .or_else(|| toml.and_then(|t| t.webhook.method.as_deref()))
            .unwrap_or(defaults::METHOD);

        RequestMethod::from_str(method_str)
            .map_err(|_| ConfigError::UnknownMethod(method_str.to_string()))
    }

    /// Merges TOML and CLI headers.
    ///
    /// A header named on the command line replaces every TOML value for that
    /// name; repeated CLI flags for one name all get sent.
    fn resolve_headers(cli: &Cli, toml: Option<&TomlConfig>) -> Result<HttpHeaders, ConfigError> {
        let cli_headers = cli
            .headers
            .iter()
            .map(String::as_str)
            .map(parse_header_string)
            .collect::<Result<Vec<_>, _>>()?;

        let mut headers = HttpHeaders::new();

        if let Some(toml) = toml {
            for header in &toml.webhook.headers {
                let overridden = cli_headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case(header.key()));
                if overridden {
                    continue;
                }
                for value in header.values() {
                    validate_header(header.key(), value)?;
                    headers.append(header.key(), value.as_str());
                }
            }
        }

        for (name, value) in cli_headers {
            validate_header(&name, &value)?;
            headers.append(name, value);
        }

        Ok(headers)
    }

    fn resolve_body(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Option<String>, ConfigError> {
        let body = cli
            .body
            .clone()
            .or_else(|| toml.and_then(|t| t.webhook.body.clone()));

        // Validate Handlebars syntax if a template is provided
        if let Some(ref template) = body {
            HandlebarsRenderer::validate(template).map_err(ConfigError::Template)?;
        }

        Ok(body)
    }

    fn resolve_dispatcher(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<DispatcherConfig, ConfigError> {
        let section = toml.map(|t| &t.dispatcher);

        // Priority: CLI explicit > TOML > default
        let workers = cli
            .workers
            .or_else(|| section.and_then(|s| s.workers))
            .unwrap_or(defaults::WORKERS);

        let queue_capacity = cli
            .queue_capacity
            .or_else(|| section.and_then(|s| s.queue_capacity))
            .unwrap_or(defaults::QUEUE_CAPACITY);

        pool_size("workers", workers)?;
        pool_size("queue_capacity", queue_capacity)?;

        Ok(DispatcherConfig::new()
            .with_workers(workers)
            .with_queue_capacity(queue_capacity))
    }

    fn resolve_request_timeout(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.dispatcher.request_timeout))
            .unwrap_or(defaults::REQUEST_TIMEOUT_SECS);

        non_zero_duration("request_timeout", seconds)
    }

    fn resolve_shutdown_timeout(toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        // TOML-only: the CLI has no flag for it
        let seconds = toml
            .and_then(|t| t.dispatcher.shutdown_timeout)
            .unwrap_or(defaults::SHUTDOWN_TIMEOUT_SECS);

        non_zero_duration("shutdown_timeout", seconds)
    }

    fn resolve_files_root(cli: &Cli, toml: Option<&TomlConfig>) -> PathBuf {
        // CLI paths are already expanded by the shell
        if let Some(ref path) = cli.files_root {
            return path.clone();
        }

        toml.and_then(|t| t.files.root.as_deref())
            .map_or_else(|| PathBuf::from(defaults::FILES_ROOT), expand_tilde)
    }

    fn build_event(cli: &Cli) -> Result<ServeEvent, ConfigError> {
        let method_str = cli
            .request_method
            .as_deref()
            .unwrap_or(defaults::REQUEST_METHOD);
        let method = Method::from_str(&method_str.to_ascii_uppercase())
            .map_err(|_| ConfigError::UnknownMethod(method_str.to_string()))?;

        let target = cli.request_url.as_deref().unwrap_or(defaults::REQUEST_URL);
        if !target.starts_with('/') {
            return Err(ConfigError::InvalidTarget(target.to_string()));
        }

        let mut request = LoggedRequest::new(method, target);
        if let Some(ref body) = cli.request_body {
            request = request.with_body(body.as_str());
        }

        Ok(ServeEvent::new(request, ResponseDefinition::ok()))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn pool_size(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Zero { field });
    }

    if value > DispatcherConfig::MAX_SIZE {
        return Err(ConfigError::TooLarge {
            field,
            max: DispatcherConfig::MAX_SIZE,
        });
    }

    Ok(())
}

fn non_zero_duration(field: &'static str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::Zero { field });
    }

    Ok(Duration::from_secs(seconds))
}

/// Expands a leading `~` to the home directory.
///
/// Paths are returned unchanged if no home directory is known.
fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => &rest[1..],
        _ => return PathBuf::from(path),
    };

    dirs::home_dir().map_or_else(|| PathBuf::from(path), |home| home.join(rest))
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // Try "Key=Value" format first
    if let Some((name, value)) = s.split_once('=') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    // Try "Key: Value" format
    if let Some((name, value)) = s.split_once(':') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    Err(ConfigError::HeaderFormat(s.to_string()))
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    let rejected = |reason: String| ConfigError::Header {
        name: name.to_string(),
        reason,
    };

    name.parse::<HeaderName>()
        .map_err(|e| rejected(format!("invalid name ({e})")))?;
    HeaderValue::from_str(value).map_err(|e| rejected(format!("invalid value ({e})")))?;

    Ok(())
}
