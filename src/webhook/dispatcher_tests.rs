//! Tests for `Webhooks` dispatch, pooling and shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::dispatcher::await_coordinator;
use super::test_fixtures::{MockClient, RecordingNotifier, admin, served_event, wait_until};
use super::{
    ACTION_NAME, DispatcherConfig, HttpError, RequestMethod, ShutdownOutcome, Webhooks, webhook,
};
use crate::serve::{Parameters, PostServeAction, PostServeActions};
use crate::template::HandlebarsRenderer;

type TestWebhooks = Webhooks<Arc<MockClient>, HandlebarsRenderer, Arc<RecordingNotifier>>;

const WAIT: Duration = Duration::from_secs(5);

fn start(
    config: DispatcherConfig,
    client: &Arc<MockClient>,
) -> (TestWebhooks, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let webhooks = Webhooks::start(
        config,
        Arc::clone(client),
        HandlebarsRenderer::new(),
        Arc::clone(&notifier),
    );
    (webhooks, notifier)
}

const fn single_worker() -> DispatcherConfig {
    DispatcherConfig::new().with_workers(1)
}

fn post_parameters() -> Parameters {
    Parameters::from_value(
        &webhook()
            .with_method(RequestMethod::Post)
            .with_url("http://localhost:8080/callback")
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"result": "SUCCESS", "path": "{{request.path}}"}"#),
    )
    .unwrap()
}

mod dispatcher_config {
    use super::*;

    #[test]
    fn defaults_to_ten_workers() {
        let config = DispatcherConfig::default();

        assert_eq!(config.workers(), 10);
        assert_eq!(config.queue_capacity(), 1024);
    }

    #[test]
    fn builder_overrides_values() {
        let config = DispatcherConfig::new()
            .with_workers(2)
            .with_queue_capacity(8);

        assert_eq!(config.workers(), 2);
        assert_eq!(config.queue_capacity(), 8);
    }

    #[test]
    #[should_panic(expected = "workers must be at least 1")]
    fn zero_workers_panics() {
        let _ = DispatcherConfig::new().with_workers(0);
    }

    #[test]
    #[should_panic(expected = "queue_capacity must be at least 1")]
    fn zero_capacity_panics() {
        let _ = DispatcherConfig::new().with_queue_capacity(0);
    }

    #[test]
    #[should_panic(expected = "workers exceeds MAX_SIZE")]
    fn oversized_workers_panics() {
        let _ = DispatcherConfig::new().with_workers(usize::MAX);
    }

    #[test]
    #[should_panic(expected = "queue_capacity exceeds MAX_SIZE")]
    fn oversized_capacity_panics() {
        let _ = DispatcherConfig::new().with_queue_capacity(DispatcherConfig::MAX_SIZE + 1);
    }

    #[test]
    fn max_size_is_accepted() {
        let config = DispatcherConfig::new()
            .with_workers(DispatcherConfig::MAX_SIZE)
            .with_queue_capacity(DispatcherConfig::MAX_SIZE);

        assert_eq!(config.workers(), DispatcherConfig::MAX_SIZE);
        assert_eq!(config.queue_capacity(), DispatcherConfig::MAX_SIZE);
    }
}

mod notify {
    use super::*;

    #[tokio::test]
    async fn delivers_one_request_built_from_parameters() {
        let client = Arc::new(MockClient::success());
        let (webhooks, notifier) = start(DispatcherConfig::default(), &client);

        webhooks.notify(&served_event(), &admin(), &post_parameters());

        assert!(wait_until(WAIT, || notifier.infos().len() == 1).await);
        let requests = client.captured_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, http::Method::POST);
        assert_eq!(requests[0].url.as_str(), "http://localhost:8080/callback");
        assert_eq!(
            requests[0].headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            requests[0].body.as_deref(),
            Some(br#"{"result": "SUCCESS", "path": "/something-async"}"#.as_slice())
        );
        assert!(notifier.infos()[0].starts_with(
            "Webhook POST request to http://localhost:8080/callback returned status HTTP/1.1 200 OK"
        ));
    }

    #[tokio::test]
    async fn returns_before_slow_delivery_completes() {
        let client = Arc::new(MockClient::slow(Duration::from_millis(500)));
        let (webhooks, notifier) = start(DispatcherConfig::default(), &client);

        let started = Instant::now();
        webhooks.notify(&served_event(), &admin(), &post_parameters());
        let elapsed = started.elapsed();

        assert!(elapsed < Duration::from_millis(100), "notify took {elapsed:?}");
        assert!(notifier.infos().is_empty());
        assert!(wait_until(WAIT, || notifier.infos().len() == 1).await);
    }

    #[tokio::test]
    async fn invalid_parameters_are_logged_not_sent() {
        let client = Arc::new(MockClient::success());
        let (webhooks, notifier) = start(DispatcherConfig::default(), &client);
        let parameters =
            Parameters::from_value(&serde_json::json!({"method": "FETCH", "url": "http://x"}))
                .unwrap();

        webhooks.notify(&served_event(), &admin(), &parameters);

        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Webhook not dispatched: Invalid webhook parameters"));
        webhooks.shutdown(WAIT).await;
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn missing_url_is_logged_and_nothing_sent() {
        let client = Arc::new(MockClient::success());
        let (webhooks, notifier) = start(DispatcherConfig::default(), &client);
        let parameters =
            Parameters::from_value(&webhook().with_method(RequestMethod::Get)).unwrap();

        webhooks.notify(&served_event(), &admin(), &parameters);

        assert!(wait_until(WAIT, || notifier.errors().len() == 1).await);
        assert_eq!(
            notifier.errors()[0],
            "Webhook GET request to <no url> failed: Webhook definition is missing required field 'url'"
        );
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_logged() {
        let client = Arc::new(MockClient::failing(HttpError::Timeout));
        let (webhooks, notifier) = start(single_worker(), &client);

        webhooks.notify(&served_event(), &admin(), &post_parameters());

        assert!(wait_until(WAIT, || notifier.errors().len() == 1).await);
        assert_eq!(
            notifier.errors()[0],
            "Webhook POST request to http://localhost:8080/callback failed: Request timed out"
        );
        assert!(notifier.infos().is_empty());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn bodiless_method_sends_no_body() {
        let client = Arc::new(MockClient::success());
        let (webhooks, notifier) = start(DispatcherConfig::default(), &client);
        let parameters = Parameters::from_value(
            &webhook()
                .with_method(RequestMethod::Get)
                .with_url("http://localhost:8080/callback")
                .with_body("should not be sent"),
        )
        .unwrap();

        webhooks.notify(&served_event(), &admin(), &parameters);

        assert!(wait_until(WAIT, || notifier.infos().len() == 1).await);
        let requests = client.captured_requests();
        assert_eq!(requests[0].method, http::Method::GET);
        assert!(requests[0].body.is_none());
    }

    #[tokio::test]
    async fn same_event_twice_sends_twice() {
        let client = Arc::new(MockClient::success());
        let (webhooks, _notifier) = start(DispatcherConfig::default(), &client);
        let event = served_event();

        webhooks.notify(&event, &admin(), &post_parameters());
        webhooks.notify(&event, &admin(), &post_parameters());

        assert_eq!(webhooks.shutdown(WAIT).await, ShutdownOutcome::Drained);
        assert_eq!(client.calls(), 2);
    }
}

mod construction {
    use super::*;

    #[tokio::test]
    async fn new_uses_default_renderer_and_notifier() {
        let client = Arc::new(MockClient::success());
        let webhooks = Webhooks::new(DispatcherConfig::new().with_workers(2), Arc::clone(&client));

        webhooks.notify(&served_event(), &admin(), &post_parameters());

        assert_eq!(webhooks.shutdown(WAIT).await, ShutdownOutcome::Drained);
        assert_eq!(client.calls(), 1);
        assert_eq!(webhooks.config().workers(), 2);
    }

    #[tokio::test]
    async fn debug_shows_config() {
        let client = Arc::new(MockClient::success());
        let (webhooks, _notifier) = start(DispatcherConfig::default(), &client);

        let debug = format!("{webhooks:?}");

        assert!(debug.contains("Webhooks"));
        assert!(debug.contains("queue_capacity: 1024"));
    }
}

mod pool {
    use super::*;

    #[tokio::test]
    async fn more_tasks_than_workers_all_complete() {
        let client = Arc::new(MockClient::slow(Duration::from_millis(20)));
        let (webhooks, notifier) = start(DispatcherConfig::new().with_workers(3), &client);

        for _ in 0..25 {
            webhooks.notify(&served_event(), &admin(), &post_parameters());
        }

        assert!(wait_until(WAIT, || notifier.infos().len() == 25).await);
        assert_eq!(client.calls(), 25);
        assert!(notifier.errors().is_empty());
    }

    #[tokio::test]
    async fn in_flight_deliveries_never_exceed_workers() {
        let client = Arc::new(MockClient::slow(Duration::from_millis(30)));
        let (webhooks, _notifier) = start(DispatcherConfig::new().with_workers(2), &client);

        for _ in 0..8 {
            webhooks.notify(&served_event(), &admin(), &post_parameters());
        }

        assert_eq!(webhooks.shutdown(WAIT).await, ShutdownOutcome::Drained);
        assert_eq!(client.calls(), 8);
        assert!(client.max_in_flight() <= 2);
    }

    #[tokio::test]
    async fn deliveries_run_concurrently() {
        let client = Arc::new(MockClient::slow(Duration::from_millis(200)));
        let (webhooks, _notifier) = start(DispatcherConfig::new().with_workers(4), &client);

        for _ in 0..4 {
            webhooks.notify(&served_event(), &admin(), &post_parameters());
        }

        assert_eq!(webhooks.shutdown(WAIT).await, ShutdownOutcome::Drained);
        assert!(client.max_in_flight() > 1);
    }

    #[tokio::test]
    async fn full_queue_rejects_and_logs() {
        let client = Arc::new(MockClient::slow(Duration::from_millis(300)));
        let (webhooks, notifier) = start(
            DispatcherConfig::new()
                .with_workers(1)
                .with_queue_capacity(1),
            &client,
        );
        let definition = Arc::new(
            webhook()
                .with_method(RequestMethod::Get)
                .with_url("http://localhost:8080/callback"),
        );

        // Synchronous submissions; the pool cannot drain between them
        let accepted: Vec<bool> = (0..3)
            .map(|_| {
                webhooks.dispatch(
                    Arc::clone(&definition),
                    &served_event(),
                    &admin(),
                    &Parameters::new(),
                )
            })
            .collect();

        assert_eq!(accepted, [true, false, false]);
        assert_eq!(notifier.errors().len(), 2);
        assert!(notifier.errors()[0].contains("queue is full"));
    }
}

mod shutdown {
    use super::*;

    #[tokio::test]
    async fn drains_queued_deliveries() {
        let client = Arc::new(MockClient::slow(Duration::from_millis(10)));
        let (webhooks, notifier) = start(single_worker(), &client);

        for _ in 0..5 {
            webhooks.notify(&served_event(), &admin(), &post_parameters());
        }

        assert_eq!(webhooks.shutdown(WAIT).await, ShutdownOutcome::Drained);
        assert_eq!(notifier.infos().len(), 5);
        assert!(webhooks.is_shut_down());
    }

    #[tokio::test]
    async fn abandons_deliveries_after_grace_period() {
        let client = Arc::new(MockClient::slow(Duration::from_secs(30)));
        let (webhooks, notifier) = start(single_worker(), &client);

        webhooks.notify(&served_event(), &admin(), &post_parameters());
        assert!(wait_until(WAIT, || client.calls() == 1).await);

        let outcome = webhooks.shutdown(Duration::from_millis(50)).await;

        assert_eq!(outcome, ShutdownOutcome::Abandoned);
        assert!(notifier.infos().is_empty());
    }

    #[tokio::test]
    async fn notify_after_shutdown_is_logged() {
        let client = Arc::new(MockClient::success());
        let (webhooks, notifier) = start(DispatcherConfig::default(), &client);

        webhooks.shutdown(WAIT).await;
        webhooks.notify(&served_event(), &admin(), &post_parameters());

        assert_eq!(
            notifier.errors(),
            ["Webhook POST request to http://localhost:8080/callback not dispatched: dispatcher is shut down"]
        );
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn failed_pool_is_reported() {
        let notifier = RecordingNotifier::default();
        let pool = tokio::spawn(async {
            panic!("pool crashed");
        });

        let outcome = await_coordinator(pool, WAIT, &notifier).await;

        assert_eq!(outcome, ShutdownOutcome::Failed);
        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Webhook worker pool failed: "));
        assert!(errors[0].ends_with("pending webhooks lost"));
    }

    #[tokio::test]
    async fn finished_pool_is_drained() {
        let notifier = RecordingNotifier::default();
        let pool = tokio::spawn(async {});

        let outcome = await_coordinator(pool, WAIT, &notifier).await;

        assert_eq!(outcome, ShutdownOutcome::Drained);
        assert!(notifier.errors().is_empty());
    }

    #[tokio::test]
    async fn second_shutdown_is_harmless() {
        let client = Arc::new(MockClient::success());
        let (webhooks, _notifier) = start(DispatcherConfig::default(), &client);

        assert_eq!(webhooks.shutdown(WAIT).await, ShutdownOutcome::Drained);
        assert_eq!(webhooks.shutdown(WAIT).await, ShutdownOutcome::Drained);
    }
}

mod post_serve_action {
    use super::*;

    #[tokio::test]
    async fn registers_under_webhook_name() {
        let client = Arc::new(MockClient::success());
        let (webhooks, _notifier) = start(DispatcherConfig::default(), &client);

        assert_eq!(webhooks.name(), ACTION_NAME);
        assert_eq!(ACTION_NAME, "webhook");
    }

    #[tokio::test]
    async fn fired_through_registry() {
        let client = Arc::new(MockClient::success());
        let (webhooks, notifier) = start(DispatcherConfig::default(), &client);
        let webhooks = Arc::new(webhooks);
        let mut registry = PostServeActions::new();
        registry.register(webhooks.clone());

        let fired = registry.fire("webhook", &served_event(), &admin(), &post_parameters());

        assert!(fired);
        assert!(wait_until(WAIT, || notifier.infos().len() == 1).await);
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn webhooks_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TestWebhooks>();
    }
}
