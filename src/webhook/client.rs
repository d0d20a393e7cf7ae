//! `reqwest`-backed [`HttpClient`].

use std::time::Duration;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// The HTTP client used for real webhook delivery.
///
/// Wraps one `reqwest::Client`; clones share its connection pool, so a
/// dispatcher needs exactly one. Every request is bounded by a timeout.
///
/// # Example
///
/// ```no_run
/// use serve_webhooks::webhook::{HttpClient, HttpRequest, ReqwestClient};
/// use std::time::Duration;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::with_timeout(Duration::from_secs(30))?;
/// let url = Url::parse("https://api.example.com/webhook")?;
/// let request = HttpRequest::new(http::Method::POST, url).with_body(b"hello".to_vec());
/// let response = client.request(request).await?;
/// println!("Status: {}", response.status_line());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Builds a client whose requests give up after `timeout`.
    ///
    /// The limit spans connect, send, and reading the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Client`] if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map(Self::from_client)
            .map_err(|e| HttpError::Client(Box::new(e)))
    }

    /// Wraps a preconfigured reqwest client (proxy, TLS, custom timeout).
    ///
    /// The caller is responsible for giving it a timeout.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn prepare(&self, req: HttpRequest) -> reqwest::RequestBuilder {
        // Reqwest appends, so repeated names stay separate lines in order
        let builder = req.headers.iter().fold(
            self.client.request(req.method, req.url.as_str()),
            |builder, (name, value)| builder.header(name, value),
        );

        match req.body {
            Some(body) => builder.body(body),
            None => builder,
        }
    }
}

/// Classifies a reqwest failure by what the caller can do about it.
fn classify(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else {
        HttpError::Connection(Box::new(e))
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = self.prepare(req).send().await.map_err(classify)?;

        let version = response.version();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;

        Ok(HttpResponse::new(status, headers, body.to_vec()).with_version(version))
    }
}
