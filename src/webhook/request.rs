//! Construction of outbound requests from webhook definitions.

use http::{HeaderName, HeaderValue};
use url::Url;

use super::error::field;
use super::{DefinitionError, DispatchError, HttpRequest, WebhookDefinition};
use crate::serve::{FileSource, LoggedRequest, Parameters, ResponseDefinition};
use crate::template::TemplateRenderer;

/// Builds the outbound request for one webhook dispatch.
///
/// Steps, in order:
/// 1. Validate method and URL.
/// 2. Copy headers in insertion order, one header line per value.
/// 3. For methods that carry a body, resolve the body template against the
///    original exchange and attach the bytes. For other methods any
///    configured body is dropped.
///
/// Performs no network I/O. Given a deterministic renderer, identical inputs
/// produce identical requests.
///
/// # Errors
///
/// - [`DispatchError::Definition`] if method or URL is missing or invalid,
///   or a header cannot be sent
/// - [`DispatchError::Template`] if the body template cannot be resolved
pub fn build_request<R: TemplateRenderer + ?Sized>(
    definition: &WebhookDefinition,
    request: &LoggedRequest,
    response_definition: &ResponseDefinition,
    files: &FileSource,
    parameters: &Parameters,
    renderer: &R,
) -> Result<HttpRequest, DispatchError> {
    let method = definition
        .method()
        .ok_or(DefinitionError::MissingField(field::METHOD))?;
    let url = parse_url(definition.url())?;

    let mut outbound = HttpRequest::new(method.into(), url);
    append_headers(&mut outbound, definition)?;

    if method.has_entity() {
        let response_view = response_definition.with_body(definition.body().map(str::to_string));
        let body = renderer.resolve(&response_view, request, files, parameters)?;
        outbound.body = Some(body);
    }

    Ok(outbound)
}

fn parse_url(url: Option<&str>) -> Result<Url, DefinitionError> {
    let url = url.ok_or(DefinitionError::MissingField(field::URL))?;

    let parsed = Url::parse(url).map_err(|e| DefinitionError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(DefinitionError::UnsupportedScheme {
            url: url.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}

fn append_headers(
    outbound: &mut HttpRequest,
    definition: &WebhookDefinition,
) -> Result<(), DefinitionError> {
    for header in definition.headers() {
        let name = HeaderName::from_bytes(header.key().as_bytes()).map_err(|e| {
            DefinitionError::InvalidHeaderName {
                name: header.key().to_string(),
                reason: e.to_string(),
            }
        })?;

        for value in header.values() {
            let value =
                HeaderValue::from_str(value).map_err(|e| DefinitionError::InvalidHeaderValue {
                    name: header.key().to_string(),
                    reason: e.to_string(),
                })?;
            outbound.headers.append(name.clone(), value);
        }
    }

    Ok(())
}
