//! Application execution logic.
//!
//! Builds the dispatcher from validated config, fires the webhook action for
//! the configured served request, and drains before exiting.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::signal;

use serve_webhooks::config::ValidatedConfig;
use serve_webhooks::serve::{AdminContext, FileSource, Parameters, PostServeActions};
use serve_webhooks::template::HandlebarsRenderer;
use serve_webhooks::webhook::{
    ACTION_NAME, HttpClient, HttpError, Notifier, ReqwestClient, ShutdownOutcome,
    TracingNotifier, Webhooks,
};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    ClientCreation(#[source] HttpError),

    /// The webhook definition could not be turned into action parameters.
    #[error("Failed to encode webhook parameters: {0}")]
    Parameters(#[source] serde_json::Error),

    /// One or more webhooks were not delivered.
    #[error("{0} webhook(s) failed; see log for details")]
    DeliveryFailed(usize),

    /// Pending webhooks were still running when the grace period ran out.
    #[error("Shutdown timed out after {}s; pending webhooks abandoned", .0.as_secs())]
    ShutdownTimedOut(Duration),

    /// The worker pool stopped abnormally and pending webhooks were lost.
    #[error("Webhook worker pool failed; see log for details")]
    PoolFailed,

    /// A shutdown signal arrived before the webhook finished.
    #[error("Interrupted before pending webhooks finished")]
    Interrupted,
}

/// Forwards records to `tracing` and counts them.
#[derive(Debug, Default)]
struct CountingNotifier {
    delivered: AtomicUsize,
    failed: AtomicUsize,
}

impl CountingNotifier {
    fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }

    fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

impl Notifier for CountingNotifier {
    fn info(&self, message: &str) {
        self.delivered.fetch_add(1, Ordering::SeqCst);
        TracingNotifier.info(message);
    }

    fn error(&self, message: &str) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        TracingNotifier.error(message);
    }
}

/// Executes one dispatch cycle.
///
/// This function:
/// 1. Creates the shared HTTP client with the configured request timeout
/// 2. Starts the dispatcher and registers it as the `webhook` action
/// 3. Fires the action for the configured served request
/// 4. Drains pending webhooks (or stops early on Ctrl+C)
///
/// # Errors
///
/// Returns an error if the client cannot be built, a webhook fails, or
/// draining does not finish in time.
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires
/// real async runtime with signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let client =
        ReqwestClient::with_timeout(config.request_timeout).map_err(RunError::ClientCreation)?;

    tokio::select! {
        result = fire_once(&config, client) => result,
        () = shutdown_signal() => Err(RunError::Interrupted),
    }
}

/// Dispatches the configured webhook through `client` and waits for it.
async fn fire_once<H: HttpClient + 'static>(
    config: &ValidatedConfig,
    client: H,
) -> Result<(), RunError> {
    let parameters = Parameters::from_value(&config.webhook).map_err(RunError::Parameters)?;
    let notifier = Arc::new(CountingNotifier::default());

    let webhooks = Arc::new(Webhooks::start(
        config.dispatcher,
        client,
        HandlebarsRenderer::new(),
        Arc::clone(&notifier),
    ));

    let mut actions = PostServeActions::new();
    actions.register(webhooks.clone());

    let admin = AdminContext::new(FileSource::new(&config.files_root));
    tracing::debug!(
        "Firing '{ACTION_NAME}' action for {} {}",
        config.event.request.method,
        config.event.request.url
    );
    actions.fire(ACTION_NAME, &config.event, &admin, &parameters);

    let outcome = webhooks.shutdown(config.shutdown_timeout).await;
    summarize(outcome, config.shutdown_timeout, &notifier)
}

fn summarize(
    outcome: ShutdownOutcome,
    grace: Duration,
    notifier: &CountingNotifier,
) -> Result<(), RunError> {
    match outcome {
        ShutdownOutcome::Drained => {}
        ShutdownOutcome::Abandoned => return Err(RunError::ShutdownTimedOut(grace)),
        ShutdownOutcome::Failed => return Err(RunError::PoolFailed),
    }

    match notifier.failed() {
        0 => {
            tracing::debug!("{} webhook(s) delivered", notifier.delivered());
            Ok(())
        }
        failed => Err(RunError::DeliveryFailed(failed)),
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed, that signal is never reported.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
