//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use crate::webhook::DispatcherConfig;

/// Default HTTP method for webhook requests.
pub const METHOD: &str = "POST";

/// Default number of concurrent webhook deliveries.
pub const WORKERS: usize = DispatcherConfig::DEFAULT_WORKERS;

/// Default number of webhooks waiting for a worker.
pub const QUEUE_CAPACITY: usize = DispatcherConfig::DEFAULT_QUEUE_CAPACITY;

/// Default timeout for one outbound call, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default time allowed for pending webhooks to drain on exit, in seconds.
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Default root directory for the `file` template helper.
pub const FILES_ROOT: &str = "__files";

/// Default method of the synthetic served request used by `fire`.
pub const REQUEST_METHOD: &str = "GET";

/// Default target of the synthetic served request used by `fire`.
pub const REQUEST_URL: &str = "/";
