//! serve-webhooks: post-serve webhook dispatcher
//!
//! A library for firing an asynchronous outbound HTTP call after a
//! request-serving engine has answered a request, with a body templated
//! from the original exchange.

pub mod config;
pub mod serve;
pub mod template;
pub mod webhook;
