//! TSS Procedures - Checklist catalog and evaluation
//!
//! This crate implements the procedure engine:
//! - Catalog schema and loading (`ProcedureCatalog`)
//! - Listing and lookup by namespace and id
//! - Status evaluation of every step against a telemetry tree

pub mod catalog;
pub mod engine;
pub mod status;

pub use catalog::*;
pub use engine::*;
pub use status::*;
