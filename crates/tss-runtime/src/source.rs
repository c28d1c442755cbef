//! Telemetry sources
//!
//! Consumers read telemetry through a [`TelemetrySource`]. In cached mode the
//! read is a snapshot of the poll driver's cache: `source_online` reflects the
//! last cycle and `last_updated` the last complete one, so data may be stale.
//! In on-demand mode every read queries the source: `source_online` means
//! "this read got what it asked for" and nothing is retained between reads.

use std::sync::Arc;
use std::time::SystemTime;

use tss_core::Command;
use tss_state::{TelemetryCache, TelemetrySnapshot};
use tss_transport::{DatagramLink, ProtocolClient};

/// Telemetry domains a read needs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domains {
    Eva,
    Ltv,
    Both,
}

impl Domains {
    fn eva(self) -> bool {
        matches!(self, Domains::Eva | Domains::Both)
    }

    fn ltv(self) -> bool {
        matches!(self, Domains::Ltv | Domains::Both)
    }
}

/// Where consumer reads come from
pub enum TelemetrySource<L> {
    Cached(Arc<TelemetryCache>),
    OnDemand(Arc<ProtocolClient<L>>),
}

impl<L> Clone for TelemetrySource<L> {
    fn clone(&self) -> Self {
        match self {
            TelemetrySource::Cached(cache) => TelemetrySource::Cached(Arc::clone(cache)),
            TelemetrySource::OnDemand(client) => TelemetrySource::OnDemand(Arc::clone(client)),
        }
    }
}

impl<L: DatagramLink> TelemetrySource<L> {
    /// Read the domains in `want`. Domains not requested are empty in
    /// on-demand mode.
    pub async fn read(&self, want: Domains) -> Arc<TelemetrySnapshot> {
        match self {
            TelemetrySource::Cached(cache) => cache.current(),
            TelemetrySource::OnDemand(client) => Arc::new(fetch(client, want).await),
        }
    }
}

async fn fetch<L: DatagramLink>(client: &ProtocolClient<L>, want: Domains) -> TelemetrySnapshot {
    let eva = if want.eva() {
        client.request(Command::GetEva).await
    } else {
        None
    };
    let ltv = if want.ltv() {
        client.request(Command::GetLtv).await
    } else {
        None
    };

    let online = (!want.eva() || eva.is_some()) && (!want.ltv() || ltv.is_some());
    TelemetrySnapshot {
        eva: eva.unwrap_or_default(),
        ltv: ltv.unwrap_or_default(),
        source_online: online,
        last_updated: online.then(SystemTime::now),
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

    async fn eva_only_source() -> std::net::SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            while let Ok((len, from)) = socket.recv_from(&mut buf).await {
                if let Ok(req) = Request::decode(&buf[..len]) {
                    if req.command() == Some(Command::GetEva) {
                        let reply = encode_response(&json!({"uia": {"depress": true}}));
                        let _ = socket.send_to(&reply, from).await;
                    }
                }
            }
        });
        addr
    }

    async fn on_demand(addr: std::net::SocketAddr) -> TelemetrySource<UdpLink> {
        let config = ClientConfig::with_timeout(Duration::from_millis(50)).retries(1);
        let client = ProtocolClient::connect(addr, config).await.unwrap();
        TelemetrySource::OnDemand(Arc::new(client))
    }

    #[tokio::test]
    async fn test_cached_source_reads_cache() {
        let cache = Arc::new(TelemetryCache::new());
        cache.update(Some(Default::default()), Some(Default::default()));
        let source: TelemetrySource<UdpLink> = TelemetrySource::Cached(cache);
        assert!(source.read(Domains::Eva).await.source_online);
    }

    #[tokio::test]
    async fn test_on_demand_online_for_requested_domain() {
        let source = on_demand(eva_only_source().await).await;
        let snap = source.read(Domains::Eva).await;
        assert!(snap.source_online);
        assert!(snap.last_updated.is_some());
        assert_eq!(snap.eva["uia"]["depress"], json!(true));
    }

    #[tokio::test]
    async fn test_on_demand_offline_when_a_domain_is_missing() {
        let source = on_demand(eva_only_source().await).await;
        let snap = source.read(Domains::Both).await;
        assert!(!snap.source_online);
        assert!(snap.last_updated.is_none());
        assert!(snap.ltv.is_empty());
    }
}
