//! TSS Test Harness - Bridge validation against a simulated source
//!
//! This crate provides:
//! - A UDP source simulator with scriptable misbehavior
//! - Fixtures for telemetry and catalogs
//! - End-to-end tests: client, poll driver, cache, service, HTTP

pub mod fixtures;
pub mod integration;
pub mod simulator;

pub use fixtures::*;
pub use simulator::*;
