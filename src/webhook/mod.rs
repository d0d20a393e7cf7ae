//! Webhook layer: turning served events into outbound HTTP calls.
//!
//! This module provides types and traits for:
//! - Describing a webhook ([`WebhookDefinition`], [`RequestMethod`], [`HttpHeaders`])
//! - Building the outbound request ([`build_request`], [`HttpRequest`])
//! - Abstracting HTTP clients ([`HttpClient`], [`ReqwestClient`])
//! - Sending and reporting one attempt ([`Executor`], [`Notifier`])
//! - Asynchronous dispatch on a bounded pool ([`Webhooks`], [`DispatcherConfig`])

mod client;
mod definition;
mod dispatcher;
mod error;
mod executor;
mod http;
mod notifier;
mod request;

#[cfg(test)]
mod dispatcher_tests;
#[cfg(test)]
mod executor_tests;
#[cfg(test)]
mod test_fixtures;

pub use client::ReqwestClient;
pub use definition::{HttpHeader, HttpHeaders, RequestMethod, WebhookDefinition, webhook};
pub use dispatcher::{ACTION_NAME, DispatcherConfig, ShutdownOutcome, Webhooks};
pub use error::{DefinitionError, DispatchError, HttpError, field};
pub use executor::{DeliveryOutcome, Executor};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use notifier::{Notifier, TracingNotifier};
pub use request::build_request;
