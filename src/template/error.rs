//! Error types for body templating.

use thiserror::Error;

/// Error type for template resolution.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template text does not parse.
    #[error("Invalid body template: {0}")]
    Syntax(String),

    /// The template parsed but could not be rendered.
    ///
    /// Includes failures of helpers such as `file`.
    #[error("Failed to render body template: {0}")]
    Render(String),
}
