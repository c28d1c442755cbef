//! TSS Core - Fundamental types shared by every bridge crate
//!
//! This crate defines:
//! - The error taxonomy (`TssError`)
//! - Source command identifiers (`Command`)
//! - EVA crew identifiers (`EvaId`)
//! - Telemetry tree helpers: dotted-path lookup, boolean coercion,
//!   comparison operators

pub mod command;
pub mod error;
pub mod eva;
pub mod value;

pub use command::*;
pub use error::*;
pub use eva::*;
pub use value::*;
