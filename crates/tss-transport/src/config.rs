//! Protocol client configuration

use std::time::Duration;

/// Protocol client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Per-attempt reply timeout
    pub timeout: Duration,
    /// Attempts per request (not additional retries)
    pub retries: u32,
    /// Receive buffer size; larger datagrams are truncated by the OS
    pub recv_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            timeout: Duration::from_millis(500),
            retries: 2,
            recv_buffer: 65_535,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        ClientConfig {
            timeout,
            ..Default::default()
        }
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}
