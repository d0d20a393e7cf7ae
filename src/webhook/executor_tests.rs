//! Tests for `Executor`.

use std::sync::Arc;

use super::test_fixtures::{MockClient, RecordingNotifier};
use super::{DeliveryOutcome, DispatchError, Executor, HttpError, HttpRequest};

const CALLBACK: &str = "http://localhost:8080/callback";

fn callback_request() -> HttpRequest {
    HttpRequest::new(http::Method::POST, url::Url::parse(CALLBACK).unwrap())
    .with_body(b"{}".to_vec())
}

#[tokio::test]
async fn sends_request_through_client() {
    let client = Arc::new(MockClient::success());
    let executor = Executor::new(client.clone(), RecordingNotifier::default());

    executor.deliver(callback_request(), CALLBACK).await.unwrap();

    let requests = client.captured_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0], callback_request());
}

#[tokio::test]
async fn logs_one_info_record_with_status_and_body() {
    let notifier = Arc::new(RecordingNotifier::default());
    let executor = Executor::new(
        MockClient::responding(http::StatusCode::OK, "accepted"),
        notifier.clone(),
    );

    executor.deliver(callback_request(), CALLBACK).await.unwrap();

    assert_eq!(
        notifier.infos(),
        [
            "Webhook POST request to http://localhost:8080/callback returned status HTTP/1.1 200 OK\n\naccepted"
        ]
    );
    assert!(notifier.errors().is_empty());
}

#[tokio::test]
async fn returns_outcome() {
    let executor = Executor::new(
        MockClient::responding(http::StatusCode::CREATED, "made"),
        RecordingNotifier::default(),
    );

    let outcome = executor.deliver(callback_request(), CALLBACK).await.unwrap();

    assert_eq!(
        outcome,
        DeliveryOutcome {
            method: http::Method::POST,
            url: CALLBACK.to_string(),
            status: http::StatusCode::CREATED,
            status_line: "HTTP/1.1 201 Created".to_string(),
            body: "made".to_string(),
        }
    );
}

#[tokio::test]
async fn error_status_is_still_a_delivery() {
    let notifier = Arc::new(RecordingNotifier::default());
    let executor = Executor::new(
        MockClient::responding(http::StatusCode::INTERNAL_SERVER_ERROR, "oops"),
        notifier.clone(),
    );

    let outcome = executor.deliver(callback_request(), CALLBACK).await.unwrap();

    assert_eq!(outcome.status, http::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(notifier.infos()[0].contains("500 Internal Server Error"));
}

#[tokio::test]
async fn logs_url_as_configured() {
    let notifier = Arc::new(RecordingNotifier::default());
    let executor = Executor::new(MockClient::success(), notifier.clone());
    let request = HttpRequest::new(
        http::Method::GET,
        url::Url::parse("http://localhost:8080").unwrap(),
    );

    let outcome = executor
        .deliver(request, "http://localhost:8080")
        .await
        .unwrap();

    assert_eq!(outcome.url, "http://localhost:8080");
    assert_eq!(
        notifier.infos(),
        ["Webhook GET request to http://localhost:8080 returned status HTTP/1.1 200 OK\n\n"]
    );
}

#[tokio::test]
async fn transport_failure_is_returned_not_logged() {
    let client = Arc::new(MockClient::failing(HttpError::Timeout));
    let notifier = Arc::new(RecordingNotifier::default());
    let executor = Executor::new(client.clone(), notifier.clone());

    let err = executor.deliver(callback_request(), CALLBACK).await.unwrap_err();

    assert!(matches!(err, DispatchError::Transport(HttpError::Timeout)));
    assert_eq!(client.calls(), 1);
    assert!(notifier.infos().is_empty());
    assert!(notifier.errors().is_empty());
}

#[test]
fn log_message_matches_expected_format() {
    let outcome = DeliveryOutcome {
        method: http::Method::GET,
        url: "http://example.com/hook".to_string(),
        status: http::StatusCode::OK,
        status_line: "HTTP/1.1 200 OK".to_string(),
        body: String::new(),
    };

    assert_eq!(
        outcome.log_message(),
        "Webhook GET request to http://example.com/hook returned status HTTP/1.1 200 OK\n\n"
    );
}
