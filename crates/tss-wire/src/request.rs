//! Request encoding

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut, BytesMut};
use tss_core::{Command, TssError, TssResult};

/// Request size in bytes
pub const REQUEST_SIZE: usize = 8;

/// A single telemetry query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    /// Seconds since epoch, truncated to 32 bits
    pub timestamp: u32,
    /// Raw command value
    pub command: u32,
}

impl Request {
    pub fn new(command: Command, timestamp: u32) -> Self {
        Request {
            timestamp,
            command: command.to_u32(),
        }
    }

    /// Build a request stamped with the current wall-clock time
    pub fn now(command: Command) -> Self {
        Self::new(command, unix_seconds())
    }

    /// Serialize to exactly [`REQUEST_SIZE`] bytes
    pub fn encode(&self) -> [u8; REQUEST_SIZE] {
        let mut buf = BytesMut::with_capacity(REQUEST_SIZE);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.command);
        let mut out = [0u8; REQUEST_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    pub fn decode(mut buf: &[u8]) -> TssResult<Self> {
        if buf.len() < REQUEST_SIZE {
            return Err(TssError::BufferTooShort {
                expected: REQUEST_SIZE,
                actual: buf.len(),
            });
        }
        Ok(Request {
            timestamp: buf.get_u32(),
            command: buf.get_u32(),
        })
    }

    /// Known command, if any
    pub fn command(&self) -> Option<Command> {
        Command::from_u32(self.command)
    }
}

fn unix_seconds() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
