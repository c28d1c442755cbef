//! TSS Runtime - Wiring between the source, the cache and consumers
//!
//! This crate provides:
//! - The poll driver feeding the telemetry cache
//! - Cached and on-demand telemetry sources
//! - `MissionService`: every consumer-facing operation
//! - The HTTP router exposing the service
//! - Runtime configuration and logging setup

pub mod config;
pub mod http;
pub mod logging;
pub mod poller;
pub mod runtime;
pub mod service;
pub mod source;

pub use config::*;
pub use poller::*;
pub use runtime::*;
pub use service::*;
pub use source::*;
