//! Asynchronous webhook dispatch on a bounded worker pool.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use super::{
    DefinitionError, DeliveryOutcome, DispatchError, Executor, HttpClient, Notifier,
    TracingNotifier, WebhookDefinition, build_request,
};
use crate::serve::{AdminContext, FileSource, Parameters, PostServeAction, ServeEvent};
use crate::template::{HandlebarsRenderer, TemplateRenderer};

/// Name under which the webhook action is registered.
pub const ACTION_NAME: &str = "webhook";

/// Sizing of the dispatch queue and worker pool.
///
/// # Defaults
///
/// - `workers`: 10
/// - `queue_capacity`: 1024
///
/// Both values lie in `1..=MAX_SIZE`; the builder enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    workers: usize,
    queue_capacity: usize,
}

impl DispatcherConfig {
    /// Default worker count.
    pub const DEFAULT_WORKERS: usize = 10;

    /// Default queue capacity.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

    /// Largest worker count or queue capacity Tokio can allocate permits for.
    pub const MAX_SIZE: usize = Semaphore::MAX_PERMITS;

    /// Creates a configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            workers: Self::DEFAULT_WORKERS,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Sets the worker count.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is 0 or above [`Self::MAX_SIZE`].
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        assert!(workers >= 1, "workers must be at least 1");
        assert!(workers <= Self::MAX_SIZE, "workers exceeds MAX_SIZE");
        self.workers = workers;
        self
    }

    /// Sets the queue capacity.
    ///
    /// # Panics
    ///
    /// Panics if `queue_capacity` is 0 or above [`Self::MAX_SIZE`].
    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        assert!(queue_capacity >= 1, "queue_capacity must be at least 1");
        assert!(queue_capacity <= Self::MAX_SIZE, "queue_capacity exceeds MAX_SIZE");
        self.queue_capacity = queue_capacity;
        self
    }

    /// Maximum number of deliveries in flight at once.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Maximum number of tasks waiting for a worker.
    ///
    /// Submissions beyond this are rejected and logged.
    #[must_use]
    pub const fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How [`Webhooks::shutdown`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every queued and in-flight delivery finished.
    Drained,
    /// The grace period elapsed; remaining deliveries were cancelled.
    Abandoned,
    /// The worker pool stopped abnormally; pending deliveries were lost.
    Failed,
}

/// One webhook delivery waiting for a worker.
#[derive(Debug)]
struct DispatchTask {
    definition: Arc<WebhookDefinition>,
    event: ServeEvent,
    files: FileSource,
    parameters: Parameters,
}

/// Short description of a definition for log records.
fn describe(definition: &WebhookDefinition) -> String {
    format!(
        "Webhook {} request to {}",
        definition
            .method()
            .map_or_else(|| "<no method>".to_string(), |m| m.to_string()),
        definition.url().unwrap_or("<no url>"),
    )
}

/// Everything a worker needs to turn a task into a delivery.
#[derive(Debug)]
struct Pipeline<H, R, N> {
    executor: Executor<H, N>,
    renderer: R,
}

impl<H: HttpClient, R: TemplateRenderer, N: Notifier> Pipeline<H, R, N> {
    /// Builds, sends and logs one webhook. Steps run strictly in sequence.
    async fn run(&self, task: &DispatchTask) -> Result<DeliveryOutcome, DispatchError> {
        let request = build_request(
            &task.definition,
            &task.event.request,
            &task.event.response_definition,
            &task.files,
            &task.parameters,
            &self.renderer,
        )?;

        let target = task.definition.url().unwrap_or_default();
        self.executor.deliver(request, target).await
    }

    /// Task boundary: failures become log records and go no further.
    async fn run_and_report(&self, task: DispatchTask) {
        if let Err(e) = self.run(&task).await {
            self.notifier()
                .error(&format!("{} failed: {e}", describe(&task.definition)));
        }
    }

    fn report_join(&self, joined: Result<(), JoinError>) {
        if let Err(e) = joined {
            if e.is_panic() {
                self.notifier().error(&format!("Webhook task panicked: {e}"));
            }
        }
    }

    const fn notifier(&self) -> &N {
        self.executor.notifier()
    }
}

/// Drains the queue, running at most `workers` deliveries at once.
///
/// Returns once the queue is closed and every spawned delivery has finished.
async fn run_pool<H, R, N>(
    mut receiver: mpsc::Receiver<DispatchTask>,
    pipeline: Arc<Pipeline<H, R, N>>,
    workers: usize,
) where
    H: HttpClient + 'static,
    R: TemplateRenderer + 'static,
    N: Notifier + 'static,
{
    let permits = Arc::new(Semaphore::new(workers));
    let mut in_flight = JoinSet::new();

    while let Some(task) = receiver.recv().await {
        // Tasks behind this one stay queued until a worker frees up
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };

        let worker_pipeline = Arc::clone(&pipeline);
        in_flight.spawn(async move {
            let _permit = permit;
            worker_pipeline.run_and_report(task).await;
        });

        while let Some(joined) = in_flight.try_join_next() {
            pipeline.report_join(joined);
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        pipeline.report_join(joined);
    }

    tracing::debug!("Webhook worker pool stopped");
}

/// The `"webhook"` post-serve action.
///
/// Turns each served event into one asynchronous outbound call. Submission
/// never blocks and never fails the caller; outcomes are reported through
/// the [`Notifier`] only.
///
/// # Lifecycle
///
/// 1. Create with [`Webhooks::start`] (or [`Webhooks::new`]) inside a Tokio runtime
/// 2. Submit with [`notify`](Self::notify) / [`dispatch`](Self::dispatch), from any thread
/// 3. Stop with [`shutdown`](Self::shutdown), which drains up to a grace period
///
/// # Backpressure
///
/// The queue is bounded by [`DispatcherConfig::queue_capacity()`]. When it is
/// full, new submissions are dropped and an error record is logged.
pub struct Webhooks<H, R = HandlebarsRenderer, N = TracingNotifier> {
    pipeline: Arc<Pipeline<H, R, N>>,
    sender: RwLock<Option<mpsc::Sender<DispatchTask>>>,
    coordinator: Mutex<Option<JoinHandle<()>>>,
    config: DispatcherConfig,
}

impl<H: HttpClient + 'static> Webhooks<H> {
    /// Starts a dispatcher with the Handlebars renderer and `tracing` notifier.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new(config: DispatcherConfig, client: H) -> Self {
        Self::start(config, client, HandlebarsRenderer::new(), TracingNotifier)
    }
}

impl<H, R, N> Webhooks<H, R, N>
where
    H: HttpClient + 'static,
    R: TemplateRenderer + 'static,
    N: Notifier + 'static,
{
    /// Starts a dispatcher and its worker pool on the current Tokio runtime.
    ///
    /// The client, renderer and notifier are shared by every dispatch task
    /// for the dispatcher's whole lifetime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn start(config: DispatcherConfig, client: H, renderer: R, notifier: N) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity());
        let pipeline = Arc::new(Pipeline {
            executor: Executor::new(client, notifier),
            renderer,
        });

        let coordinator = tokio::spawn(run_pool(receiver, Arc::clone(&pipeline), config.workers()));
        tracing::debug!(
            "Webhook dispatcher started ({} workers, queue capacity {})",
            config.workers(),
            config.queue_capacity()
        );

        Self {
            pipeline,
            sender: RwLock::new(Some(sender)),
            coordinator: Mutex::new(Some(coordinator)),
            config,
        }
    }

    /// Schedules the webhook described by `parameters` for `event`.
    ///
    /// Returns immediately. Unparsable parameters, a full queue, or a
    /// stopped dispatcher are logged and otherwise ignored.
    pub fn notify(&self, event: &ServeEvent, admin: &AdminContext, parameters: &Parameters) {
        match parameters.as_type::<WebhookDefinition>() {
            Ok(definition) => {
                self.dispatch(Arc::new(definition), event, admin, parameters);
            }
            Err(e) => {
                let error = DefinitionError::from(e);
                self.pipeline
                    .notifier()
                    .error(&format!("Webhook not dispatched: {error}"));
            }
        }
    }

    /// Schedules an already-built definition for `event`.
    ///
    /// Returns `true` if the task was queued. A `false` return has already
    /// been logged.
    pub fn dispatch(
        &self,
        definition: Arc<WebhookDefinition>,
        event: &ServeEvent,
        admin: &AdminContext,
        parameters: &Parameters,
    ) -> bool {
        let task = DispatchTask {
            definition,
            event: event.clone(),
            files: admin.files_root().clone(),
            parameters: parameters.clone(),
        };

        let guard = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            self.reject(&task, "dispatcher is shut down");
            return false;
        };

        match sender.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(task)) => {
                let reason = format!("queue is full ({} pending)", self.config.queue_capacity());
                self.reject(&task, &reason);
                false
            }
            Err(TrySendError::Closed(task)) => {
                self.reject(&task, "dispatcher is shut down");
                false
            }
        }
    }

    fn reject(&self, task: &DispatchTask, reason: &str) {
        self.pipeline.notifier().error(&format!(
            "{} not dispatched: {reason}",
            describe(&task.definition)
        ));
    }

    /// Stops accepting webhooks and waits for pending ones to finish.
    ///
    /// Deliveries still running after `grace` are cancelled. Calling this
    /// more than once is harmless.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownOutcome {
        // Closing the queue lets the pool drain and exit
        drop(
            self.sender
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let coordinator = self
            .coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(coordinator) = coordinator else {
            return ShutdownOutcome::Drained;
        };

        await_coordinator(coordinator, grace, self.pipeline.notifier()).await
    }

    /// Returns the pool configuration.
    #[must_use]
    pub const fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Waits up to `grace` for the worker pool task to finish.
///
/// A pool that panicked or was cancelled is reported through `notifier`.
pub(super) async fn await_coordinator<N: Notifier>(
    mut coordinator: JoinHandle<()>,
    grace: Duration,
    notifier: &N,
) -> ShutdownOutcome {
    match tokio::time::timeout(grace, &mut coordinator).await {
        Ok(Ok(())) => {
            tracing::debug!("Webhook dispatcher drained");
            ShutdownOutcome::Drained
        }
        Ok(Err(e)) => {
            notifier.error(&format!("Webhook worker pool failed: {e}; pending webhooks lost"));
            ShutdownOutcome::Failed
        }
        Err(_) => {
            coordinator.abort();
            tracing::warn!(
                "Webhook dispatcher shutdown timed out after {grace:?}; pending webhooks abandoned"
            );
            ShutdownOutcome::Abandoned
        }
    }
}

impl<H, R, N> PostServeAction for Webhooks<H, R, N>
where
    H: HttpClient + 'static,
    R: TemplateRenderer + 'static,
    N: Notifier + 'static,
{
    fn name(&self) -> &'static str {
        ACTION_NAME
    }

    fn do_action(&self, event: &ServeEvent, admin: &AdminContext, parameters: &Parameters) {
        self.notify(event, admin, parameters);
    }
}

impl<H, R, N> std::fmt::Debug for Webhooks<H, R, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Webhooks")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
