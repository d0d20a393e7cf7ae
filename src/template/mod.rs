//! Body templating for outbound webhooks.
//!
//! This module provides:
//! - The templating contract ([`TemplateRenderer`])
//! - A Handlebars implementation ([`HandlebarsRenderer`])
//!
//! # Template context
//!
//! [`HandlebarsRenderer`] exposes the following variables:
//! - `request.url`, `request.path`, `request.method`, `request.body`
//! - `request.headers.<name>`: first value, lowercase name (use `request.headers.[x-name]` for dashed names)
//! - `request.query.<name>`: first value
//! - `response.status`: status code of the served response
//! - `parameters`: the action's configuration parameters
//!
//! and the helper `{{file "relative/path"}}`, which inlines a text file from
//! the files root.

mod context;
mod engine;
mod error;
mod helpers;


pub use engine::HandlebarsRenderer;
pub use error::TemplateError;

use crate::serve::{FileSource, LoggedRequest, Parameters, ResponseDefinition};

/// Resolves placeholder expressions in a response body.
///
/// The renderer receives a *response view*: the served response definition
/// with its body swapped for the template to resolve. Implementations must be
/// free of side effects other than reading from `files`.
pub trait TemplateRenderer: Send + Sync {
    /// Resolves the body of `response_view` into its final bytes.
    ///
    /// A view without a body resolves to an empty payload.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the template is malformed or a
    /// placeholder cannot be resolved.
    fn resolve(
        &self,
        response_view: &ResponseDefinition,
        request: &LoggedRequest,
        files: &FileSource,
        parameters: &Parameters,
    ) -> Result<Vec<u8>, TemplateError>;
}
