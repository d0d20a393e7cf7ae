//! Single-attempt delivery of outbound requests.

use super::{DispatchError, HttpClient, HttpRequest, Notifier};

/// Result of a completed delivery attempt.
///
/// "Completed" means a response was read; the status may still be an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Method of the outbound request
    pub method: http::Method,
    /// Target URL as written in the webhook definition
    pub url: String,
    /// Response status
    pub status: http::StatusCode,
    /// Response status line, e.g. `HTTP/1.1 200 OK`
    pub status_line: String,
    /// Response body as text
    pub body: String,
}

impl DeliveryOutcome {
    /// Formats the informational log record for this outcome.
    #[must_use]
    pub fn log_message(&self) -> String {
        format!(
            "Webhook {} request to {} returned status {}\n\n{}",
            self.method, self.url, self.status_line, self.body
        )
    }
}

/// Sends outbound requests through a shared HTTP client and reports results.
///
/// Makes exactly one attempt per request. Non-2xx responses are still
/// successful deliveries: the target answered.
#[derive(Debug)]
pub struct Executor<H, N> {
    client: H,
    notifier: N,
}

impl<H, N> Executor<H, N> {
    /// Creates an executor from a client and a notifier.
    #[must_use]
    pub const fn new(client: H, notifier: N) -> Self {
        Self { client, notifier }
    }

    /// Returns the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<H: HttpClient, N: Notifier> Executor<H, N> {
    /// Sends `request` and logs one informational record with the response.
    ///
    /// `target` is the URL as the definition spells it; the record shows it
    /// rather than the normalized request URL.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Transport`] if no response could be read.
    /// The failure is not logged here; the caller owns the task boundary.
    pub async fn deliver(
        &self,
        request: HttpRequest,
        target: &str,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let method = request.method.clone();

        tracing::debug!("Sending webhook {method} request to {}", request.url);
        let response = self.client.request(request).await?;

        let outcome = DeliveryOutcome {
            method,
            url: target.to_string(),
            status: response.status,
            status_line: response.status_line(),
            body: response.body_text(),
        };

        self.notifier.info(&outcome.log_message());
        Ok(outcome)
    }
}
