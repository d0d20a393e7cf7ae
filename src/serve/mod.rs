//! Interfaces consumed from the request-serving engine.
//!
//! This module provides:
//! - The record of a served exchange ([`ServeEvent`], [`LoggedRequest`], [`ResponseDefinition`])
//! - The admin handle exposing the file-backed resource root ([`AdminContext`], [`FileSource`])
//! - Per-action configuration parameters ([`Parameters`])
//! - The post-serve extension point ([`PostServeAction`]) and its registry ([`PostServeActions`])
//!
//! The serving engine owns all of these values; actions only read them.

mod action;
mod event;
mod files;
mod parameters;


pub use action::{PostServeAction, PostServeActions};
pub use event::{AdminContext, LoggedRequest, ResponseDefinition, ServeEvent};
pub use files::{FileSource, FileSourceError};
pub use parameters::Parameters;
