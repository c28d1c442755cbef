//! Poll driver
//!
//! Each cycle requests EVA then LTV and merges both results into the cache.
//! Cadence is constant whether or not the source answers. The stop signal is
//! observed during the wait between cycles, never in the middle of a request.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use tss_core::Command;
use tss_state::TelemetryCache;
use tss_transport::{DatagramLink, ProtocolClient};

use crate::PollConfig;

/// Poll driver counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    pub cycles: u64,
    pub online_cycles: u64,
}

/// Handle to a running poll driver
pub struct PollHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<PollStats>,
}

impl PollHandle {
    /// Signal the driver and wait for its current cycle to finish
    pub async fn stop(self) -> PollStats {
        let _ = self.stop.send(true);
        match self.task.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("poll driver task failed: {}", e);
                PollStats::default()
            }
        }
    }
}

/// Background loop feeding a [`TelemetryCache`]
pub struct PollDriver<L> {
    client: Arc<ProtocolClient<L>>,
    cache: Arc<TelemetryCache>,
    config: PollConfig,
}

impl<L: DatagramLink> PollDriver<L> {
    pub fn new(
        client: Arc<ProtocolClient<L>>,
        cache: Arc<TelemetryCache>,
        config: PollConfig,
    ) -> Self {
        PollDriver {
            client,
            cache,
            config,
        }
    }

    /// Run one cycle: EVA first, then LTV, then a single merge
    pub async fn poll_once(&self) -> bool {
        let eva = self.client.request(Command::GetEva).await;
        let ltv = self.client.request(Command::GetLtv).await;
        let result = self.cache.update(eva, ltv);

        if result.went_online() {
            tracing::info!("source online");
        } else if result.went_offline() {
            tracing::warn!("source offline, serving last known telemetry");
        }
        result.online
    }

    /// Start the loop on the current tokio runtime
    pub fn spawn(self) -> PollHandle {
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        PollHandle { stop, task }
    }

    async fn run(self, mut stop: watch::Receiver<bool>) -> PollStats {
        let mut stats = PollStats::default();
        tracing::debug!("poll driver started, interval {:?}", self.config.interval);

        while !*stop.borrow() {
            if self.poll_once().await {
                stats.online_cycles += 1;
            }
            stats.cycles += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                // A dropped sender also ends the loop
                _ = stop.changed() => break,
            }
        }

        tracing::debug!("poll driver stopped after {} cycles", stats.cycles);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use tokio::net::UdpSocket;
    use tss_transport::{ClientConfig, UdpLink};
    use tss_wire::{encode_response, Request};

    /// Answers EVA and LTV with small objects until dropped
    async fn responder(answer_ltv: bool) -> std::net::SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            while let Ok((len, from)) = socket.recv_from(&mut buf).await {
                let Ok(req) = Request::decode(&buf[..len]) else { continue };
                let reply = match req.command() {
                    Some(Command::GetEva) => json!({"status": {"started": true}}),
                    Some(Command::GetLtv) if answer_ltv => json!({"signal": {"strength": 5}}),
                    _ => continue,
                };
                let _ = socket.send_to(&encode_response(&reply), from).await;
            }
        });
        addr
    }

    async fn client(addr: std::net::SocketAddr) -> Arc<ProtocolClient<UdpLink>> {
        let config = ClientConfig::with_timeout(Duration::from_millis(50)).retries(1);
        Arc::new(ProtocolClient::connect(addr, config).await.unwrap())
    }

    #[tokio::test]
    async fn test_poll_once_fills_cache() {
        let addr = responder(true).await;
        let cache = Arc::new(TelemetryCache::new());
        let driver = PollDriver::new(client(addr).await, Arc::clone(&cache), PollConfig::default());

        assert!(driver.poll_once().await);
        let snap = cache.snapshot();
        assert!(snap.source_online);
        assert_eq!(snap.eva["status"]["started"], json!(true));
        assert_eq!(snap.ltv["signal"]["strength"], json!(5));
    }

    #[tokio::test]
    async fn test_poll_once_partial_cycle_is_offline() {
        let addr = responder(false).await;
        let cache = Arc::new(TelemetryCache::new());
        let driver = PollDriver::new(client(addr).await, Arc::clone(&cache), PollConfig::default());

        assert!(!driver.poll_once().await);
        let snap = cache.snapshot();
        assert!(!snap.source_online);
        assert!(snap.last_updated.is_none());
        assert_eq!(snap.eva["status"]["started"], json!(true));
    }

    #[tokio::test]
    async fn test_spawned_driver_stops_promptly() {
        let addr = responder(true).await;
        let cache = Arc::new(TelemetryCache::new());
        let config = PollConfig {
            interval: Duration::from_secs(3600),
        };
        let handle = PollDriver::new(client(addr).await, Arc::clone(&cache), config).spawn();

        // First cycle runs immediately, then the driver waits an hour
        tokio::time::sleep(Duration::from_millis(200)).await;
        let stats = tokio::time::timeout(Duration::from_secs(2), handle.stop())
            .await
            .expect("stop should not wait for the interval");

        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.online_cycles, 1);
        assert!(cache.is_online());
    }
}
