//! TSS Wire Protocol - Datagram request and response formats
//!
//! Request (8 bytes, big-endian):
//! - Bytes 0-3: Timestamp, seconds since epoch (informational)
//! - Bytes 4-7: Command
//!
//! Response:
//! - Bytes 0-7: Header (ignored)
//! - Bytes 8..: UTF-8 JSON object, NUL-terminated or NUL-padded

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
