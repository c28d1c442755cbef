//! Protocol client
//!
//! One request is in flight at a time: the send and the matching receive run
//! under the same lock. The wire format has no correlation id, so whatever
//! datagram arrives after a send is taken as its reply. A late reply to an
//! attempt that already timed out can therefore be read by the next request.

use std::net::SocketAddr;

use parking_lot::Mutex as StatsLock;
use tokio::sync::Mutex;
use tokio::time::timeout;

use tss_core::{Command, TssError, TssResult};
use tss_wire::{decode_response, Payload, Request};

use crate::{ClientConfig, DatagramLink, UdpLink};

/// Result of one request, before it is collapsed to "data or nothing"
#[derive(Debug)]
pub enum RequestOutcome {
    /// A reply arrived and decoded to a JSON object
    Success(Payload),
    /// Every attempt timed out
    Exhausted { attempts: u32 },
    /// Transport error, malformed reply, or closed client; no further attempts
    Fatal(TssError),
}

impl RequestOutcome {
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            RequestOutcome::Success(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Outcome of a single send/receive attempt
enum Attempt {
    Reply(Vec<u8>),
    TimedOut,
    Failed(TssError),
}

/// Client counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub requests: u64,
    pub attempts: u64,
    pub timeouts: u64,
    pub successes: u64,
    pub failures: u64,
}

/// Request/response client for the source
pub struct ProtocolClient<L = UdpLink> {
    /// `None` once closed
    link: Mutex<Option<L>>,
    config: ClientConfig,
    stats: StatsLock<ClientStats>,
}

impl ProtocolClient<UdpLink> {
    /// Open the UDP connection to the source
    pub async fn connect(addr: SocketAddr, config: ClientConfig) -> TssResult<Self> {
        let link = UdpLink::connect(addr).await?;
        tracing::debug!("protocol client connected to {}", addr);
        Ok(Self::with_link(link, config))
    }
}

impl<L: DatagramLink> ProtocolClient<L> {
    /// Wrap an already-connected link
    pub fn with_link(link: L, config: ClientConfig) -> Self {
        ProtocolClient {
            link: Mutex::new(Some(link)),
            config,
            stats: StatsLock::new(ClientStats::default()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }

    /// Query the source; any failure is reported as `None`
    pub async fn request(&self, command: Command) -> Option<Payload> {
        self.request_outcome(command).await.into_payload()
    }

    /// Query the source and report how the request ended
    pub async fn request_outcome(&self, command: Command) -> RequestOutcome {
        let packet = Request::now(command).encode();
        let mut buf = vec![0u8; self.config.recv_buffer];
        self.stats.lock().requests += 1;

        for attempt in 1..=self.config.retries {
            self.stats.lock().attempts += 1;

            match self.attempt(&packet, &mut buf).await {
                Attempt::Reply(raw) => {
                    return match decode_response(&raw) {
                        Ok(payload) => {
                            self.stats.lock().successes += 1;
                            RequestOutcome::Success(payload)
                        }
                        Err(e) => {
                            tracing::debug!("{}: malformed reply: {}", command, e);
                            self.stats.lock().failures += 1;
                            RequestOutcome::Fatal(e)
                        }
                    };
                }
                Attempt::TimedOut => {
                    tracing::debug!(
                        "{}: attempt {}/{} timed out",
                        command,
                        attempt,
                        self.config.retries
                    );
                    self.stats.lock().timeouts += 1;
                }
                Attempt::Failed(e) => {
                    tracing::warn!("{}: transport error: {}", command, e);
                    self.stats.lock().failures += 1;
                    return RequestOutcome::Fatal(e);
                }
            }
        }

        self.stats.lock().failures += 1;
        RequestOutcome::Exhausted {
            attempts: self.config.retries,
        }
    }

    async fn attempt(&self, packet: &[u8], buf: &mut [u8]) -> Attempt {
        let mut guard = self.link.lock().await;
        let Some(link) = guard.as_mut() else {
            return Attempt::Failed(TssError::ConnectionClosed);
        };

        if let Err(e) = link.send(packet).await {
            return Attempt::Failed(TssError::TransportError(e.to_string()));
        }

        match timeout(self.config.timeout, link.recv(buf)).await {
            Ok(Ok(len)) => Attempt::Reply(buf[..len].to_vec()),
            Ok(Err(e)) => Attempt::Failed(TssError::TransportError(e.to_string())),
            Err(_) => Attempt::TimedOut,
        }
    }

    /// Drop the connection; later requests report no data
    pub async fn close(&self) {
        if self.link.lock().await.take().is_some() {
            tracing::debug!("protocol client closed");
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.link.lock().await.is_none()
    }
}
