//! Error types for webhook construction and delivery.

use thiserror::Error;

use crate::template::TemplateError;

/// Error type for HTTP operations.
///
/// Describes what went wrong on the wire. Webhook delivery is a single
/// attempt, so every variant is terminal for its dispatch task.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and malformed responses.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    ///
    /// The server did not respond within the configured timeout period.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL was rejected by the client.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A webhook definition that cannot produce an outbound request.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A required field was never set.
    #[error("Webhook definition is missing required field '{0}'")]
    MissingField(&'static str),

    /// The URL does not parse as an absolute URL.
    #[error("Invalid webhook URL '{url}': {reason}")]
    InvalidUrl {
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The URL uses a scheme other than `http` or `https`.
    #[error("Unsupported scheme '{scheme}' in webhook URL '{url}'")]
    UnsupportedScheme {
        /// The offending URL
        url: String,
        /// Its scheme
        scheme: String,
    },

    /// A header name is not a valid HTTP token.
    #[error("Invalid header name '{name}': {reason}")]
    InvalidHeaderName {
        /// The invalid header name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A header value contains characters not allowed on the wire.
    #[error("Invalid header value for '{name}': {reason}")]
    InvalidHeaderValue {
        /// The header name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The action parameters do not describe a webhook.
    #[error("Invalid webhook parameters: {0}")]
    Parameters(#[from] serde_json::Error),
}

/// Well-known field names for [`DefinitionError::MissingField`].
pub mod field {
    /// The HTTP method field.
    pub const METHOD: &str = "method";
    /// The target URL field.
    pub const URL: &str = "url";
}

/// Terminal failure of one dispatch task.
///
/// Produced at the task boundary and converted into a log record; never
/// returned to the serving engine.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The definition could not produce a request; nothing was sent.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The body template could not be resolved; nothing was sent.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The outbound call failed.
    #[error(transparent)]
    Transport(#[from] HttpError),
}
