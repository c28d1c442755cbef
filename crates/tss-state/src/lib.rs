//! TSS State - Telemetry cache
//!
//! This crate implements the reconciled view of the source:
//! - `TelemetrySnapshot`: EVA and LTV trees plus freshness
//! - `TelemetryCache`: single writer, many readers, read-copy-update

pub mod cache;
pub mod snapshot;

pub use cache::*;
pub use snapshot::*;
