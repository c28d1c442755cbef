//! Runtime configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tss_core::{TssError, TssResult};
use tss_transport::ClientConfig;

/// How consumer reads obtain telemetry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TelemetryMode {
    /// Background polling into the cache; reads may be stale
    #[default]
    Cached,
    /// Every read queries the source; no background task
    OnDemand,
}

impl FromStr for TelemetryMode {
    type Err = TssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cached" | "poll" => Ok(TelemetryMode::Cached),
            "on-demand" | "ondemand" | "direct" => Ok(TelemetryMode::OnDemand),
            other => Err(TssError::Config(format!("unknown telemetry mode {:?}", other))),
        }
    }
}

/// Poll driver configuration
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Wait between the end of one cycle and the start of the next
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_millis(250),
        }
    }
}

/// Full bridge configuration
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Source datagram endpoint
    pub source_addr: SocketAddr,
    /// HTTP listen address
    pub bind_addr: SocketAddr,
    pub client: ClientConfig,
    pub poll: PollConfig,
    pub mode: TelemetryMode,
    /// Procedure catalog file
    pub catalog_path: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            source_addr: ([127, 0, 0, 1], 14141).into(),
            bind_addr: ([127, 0, 0, 1], 8100).into(),
            client: ClientConfig::default(),
            poll: PollConfig::default(),
            mode: TelemetryMode::default(),
            catalog_path: PathBuf::from("procedures/ltv_procedures.json"),
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> TssResult<()> {
        if self.client.retries == 0 {
            return Err(TssError::Config("udp retries must be at least 1".into()));
        }
        if self.client.timeout.is_zero() {
            return Err(TssError::Config("udp timeout must be positive".into()));
        }
        if self.client.recv_buffer == 0 {
            return Err(TssError::Config("receive buffer must be positive".into()));
        }
        if self.mode == TelemetryMode::Cached && self.poll.interval.is_zero() {
            return Err(TssError::Config("poll interval must be positive".into()));
        }
        Ok(())
    }
}
