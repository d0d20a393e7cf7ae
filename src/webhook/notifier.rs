//! Log sink for delivery outcomes.

use std::sync::Arc;

/// Destination for the webhook layer's log records.
///
/// Delivery happens off the caller's path, so this is the only place its
/// outcome becomes visible. Implementations must be cheap and non-blocking.
pub trait Notifier: Send + Sync {
    /// Records an informational message.
    fn info(&self, message: &str);

    /// Records a failure.
    fn error(&self, message: &str);
}

/// Notifier that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn error(&self, message: &str) {
        (**self).error(message);
    }
}
