//! Outbound request and response values, and the client seam that sends them.

use std::future::Future;

use super::HttpError;

/// A fully built webhook call, ready for the wire.
///
/// Header lines keep the order they were appended in; a name may repeat.
/// `body` is `None` for methods that carry no entity, which is distinct
/// from `Some(vec![])` (an entity method with an empty template).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method
    pub method: http::Method,
    /// Absolute `http` or `https` target
    pub url: url::Url,
    /// Header lines, in send order
    pub headers: http::HeaderMap,
    /// Resolved payload
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Starts a request with no header lines and no payload.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds one header line after any existing lines of the same name.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// What the webhook target answered, read in full.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Protocol version the target answered with
    pub version: http::Version,
    /// Status code
    pub status: http::StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Buffered response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates an `HTTP/1.1` response.
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
        Self {
            version: http::Version::HTTP_11,
            status,
            headers,
            body,
        }
    }

    /// Overrides the protocol version.
    #[must_use]
    pub const fn with_version(mut self, version: http::Version) -> Self {
        self.version = version;
        self
    }

    /// Formats version, code and reason as one line, e.g. `HTTP/1.1 200 OK`.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("{:?} {}", self.version, self.status)
    }

    /// Body decoded as UTF-8; invalid sequences become U+FFFD.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one [`HttpRequest`] and reads the whole response.
///
/// One client instance serves every dispatch task of a dispatcher, so
/// implementations are called concurrently through `&self`. Test code swaps
/// in scripted clients here.
pub trait HttpClient: Send + Sync {
    /// Performs a single attempt. Non-2xx statuses are responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when no response could be read: connection
    /// failure, timeout, or a URL the client refuses.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}
