//! The record of one served exchange.

use super::FileSource;

/// An inbound request as received by the serving engine.
///
/// `url` is the request target as sent by the client: path plus optional
/// query string (for example `/orders/42?expand=items`).
#[derive(Debug, Clone)]
pub struct LoggedRequest {
    /// HTTP method of the inbound request
    pub method: http::Method,
    /// Request target (path and query)
    pub url: String,
    /// Inbound request headers
    pub headers: http::HeaderMap,
    /// Raw request body
    pub body: Vec<u8>,
}

impl LoggedRequest {
    /// Creates a request with no headers and an empty body.
    #[must_use]
    pub fn new(method: http::Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: http::HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header to the request.
    ///
    /// Repeated names append rather than replace.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the path component of the request target.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url
            .split_once('?')
            .map_or(self.url.as_str(), |(path, _)| path)
    }

    /// Returns the decoded query parameters in the order they appear.
    #[must_use]
    pub fn query_params(&self) -> Vec<(String, String)> {
        self.url.split_once('?').map_or_else(Vec::new, |(_, query)| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
    }

    /// Returns the body as UTF-8 text, replacing invalid sequences.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The response the serving engine produced for a request.
#[derive(Debug, Clone)]
pub struct ResponseDefinition {
    /// Response status
    pub status: http::StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Response body, if any
    pub body: Option<String>,
}

impl ResponseDefinition {
    /// Creates a response definition with the given status and no body.
    #[must_use]
    pub fn new(status: http::StatusCode) -> Self {
        Self {
            status,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Creates an empty `200 OK` response definition.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(http::StatusCode::OK)
    }

    /// Returns a copy of this definition with the body replaced.
    #[must_use]
    pub fn with_body(&self, body: Option<String>) -> Self {
        Self {
            status: self.status,
            headers: self.headers.clone(),
            body,
        }
    }
}

impl Default for ResponseDefinition {
    fn default() -> Self {
        Self::ok()
    }
}

/// One inbound request and the response actually produced for it.
#[derive(Debug, Clone)]
pub struct ServeEvent {
    /// The original inbound request
    pub request: LoggedRequest,
    /// The response definition returned to the client
    pub response_definition: ResponseDefinition,
}

impl ServeEvent {
    /// Creates a served event from its request and response.
    #[must_use]
    pub const fn new(request: LoggedRequest, response_definition: ResponseDefinition) -> Self {
        Self {
            request,
            response_definition,
        }
    }
}

/// Administrative handle passed alongside each served event.
///
/// Exposes the file-backed resource root used by body templates.
#[derive(Debug, Clone)]
pub struct AdminContext {
    files_root: FileSource,
}

impl AdminContext {
    /// Creates an admin context for the given resource root.
    #[must_use]
    pub const fn new(files_root: FileSource) -> Self {
        Self { files_root }
    }

    /// Returns the file-backed resource root.
    #[must_use]
    pub const fn files_root(&self) -> &FileSource {
        &self.files_root
    }
}
