//! Datagram link abstraction

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

use tss_core::{TssError, TssResult};

/// A connected, unreliable datagram channel to a single peer
pub trait DatagramLink: Send + 'static {
    /// Send one datagram
    fn send(&mut self, buf: &[u8]) -> impl Future<Output = io::Result<usize>> + Send;

    /// Wait for one datagram; no timeout is applied here
    fn recv(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

/// UDP link connected to the source
pub struct UdpLink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpLink {
    /// Bind an ephemeral local port and connect it to `peer`
    pub async fn connect(peer: SocketAddr) -> TssResult<Self> {
        let local: SocketAddr = if peer.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| TssError::TransportError(e.to_string()))?;
        socket
            .connect(peer)
            .await
            .map_err(|e| TssError::TransportError(e.to_string()))?;

        Ok(UdpLink { socket, peer })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> TssResult<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| TssError::TransportError(e.to_string()))
    }
}

impl DatagramLink for UdpLink {
    async fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.socket.send(buf).await
    }

    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.recv(buf).await
    }
}
