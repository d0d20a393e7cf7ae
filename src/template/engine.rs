//! Handlebars implementation of [`TemplateRenderer`].

use handlebars::{Handlebars, Template};

use super::context::TemplateContext;
use super::helpers::FileHelper;
use super::{TemplateError, TemplateRenderer};
use crate::serve::{FileSource, LoggedRequest, Parameters, ResponseDefinition};

/// Renders body templates with Handlebars.
///
/// HTML escaping is disabled: webhook payloads are usually JSON or plain text,
/// and values from the original request must pass through unchanged.
///
/// # Example
///
/// ```
/// use serve_webhooks::serve::{FileSource, LoggedRequest, Parameters, ResponseDefinition};
/// use serve_webhooks::template::{HandlebarsRenderer, TemplateRenderer};
///
/// let view = ResponseDefinition::ok().with_body(Some("{{request.method}} {{request.path}}".into()));
/// let request = LoggedRequest::new(http::Method::POST, "/orders?id=7");
///
/// let bytes = HandlebarsRenderer::new()
///     .resolve(&view, &request, &FileSource::new("."), &Parameters::new())
///     .unwrap();
/// assert_eq!(bytes, b"POST /orders");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsRenderer;

impl HandlebarsRenderer {
    /// Creates a new renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks template syntax without rendering it.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the template does not parse.
    pub fn validate(template: &str) -> Result<(), TemplateError> {
        Template::compile(template)
            .map(|_| ())
            .map_err(|e| TemplateError::Syntax(e.to_string()))
    }

    fn registry(files: &FileSource) -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper(FileHelper::NAME, Box::new(FileHelper::new(files.clone())));
        handlebars
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn resolve(
        &self,
        response_view: &ResponseDefinition,
        request: &LoggedRequest,
        files: &FileSource,
        parameters: &Parameters,
    ) -> Result<Vec<u8>, TemplateError> {
        let Some(template) = response_view.body.as_deref() else {
            return Ok(Vec::new());
        };

        Self::validate(template)?;

        let context = TemplateContext::new(response_view, request, parameters);
        let rendered = Self::registry(files)
            .render_template(template, &context)
            .map_err(|e| TemplateError::Render(e.to_string()))?;

        Ok(rendered.into_bytes())
    }
}
