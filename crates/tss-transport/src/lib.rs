//! TSS Transport Layer - Protocol client over a datagram link
//!
//! This crate provides:
//! - The `DatagramLink` seam and its UDP implementation
//! - `ProtocolClient`: encode, send, bounded wait, bounded retry, decode
//! - A tagged per-request outcome for diagnostics and tests

pub mod client;
pub mod config;
pub mod link;

pub use client::*;
pub use config::*;
pub use link::*;
