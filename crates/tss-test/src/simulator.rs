//! Simulated telemetry source
//!
//! Speaks the source's datagram protocol on 127.0.0.1. Each command can be
//! told to answer, stay silent, answer with garbage or answer with a JSON
//! value that is not an object.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use tss_core::Command;
use tss_wire::{encode_response, Request};

/// How the simulator answers a command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Behavior {
    #[default]
    Answer,
    Silent,
    Garbage,
    NonObject,
}

#[derive(Debug, Default)]
struct SimState {
    documents: HashMap<u32, Value>,
    behaviors: HashMap<u32, Behavior>,
    received: Vec<Request>,
}

/// A source that answers on a local UDP port until dropped
pub struct SimulatedSource {
    addr: SocketAddr,
    state: Arc<Mutex<SimState>>,
    task: JoinHandle<()>,
}

impl SimulatedSource {
    /// Serve `eva` and `ltv` documents
    pub async fn start(eva: Value, ltv: Value) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;

        let mut state = SimState::default();
        state.documents.insert(Command::GetEva.to_u32(), eva);
        state.documents.insert(Command::GetLtv.to_u32(), ltv);
        state.documents.insert(Command::GetRover.to_u32(), json!({}));
        let state = Arc::new(Mutex::new(state));

        let task = tokio::spawn(serve(socket, Arc::clone(&state)));
        Ok(SimulatedSource { addr, state, task })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn set_behavior(&self, command: Command, behavior: Behavior) {
        self.state.lock().behaviors.insert(command.to_u32(), behavior);
    }

    /// Apply the same behavior to every command
    pub fn set_all(&self, behavior: Behavior) {
        for command in [Command::GetRover, Command::GetEva, Command::GetLtv] {
            self.set_behavior(command, behavior);
        }
    }

    pub fn set_document(&self, command: Command, document: Value) {
        self.state.lock().documents.insert(command.to_u32(), document);
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().received.clone()
    }

    pub fn request_count(&self, command: Command) -> usize {
        self.state
            .lock()
            .received
            .iter()
            .filter(|r| r.command == command.to_u32())
            .count()
    }
}

impl Drop for SimulatedSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(socket: UdpSocket, state: Arc<Mutex<SimState>>) {
    let mut buf = [0u8; 64];
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("simulator receive error: {}", e);
                continue;
            }
        };
        let Ok(request) = Request::decode(&buf[..len]) else {
            continue;
        };

        let reply = {
            let mut state = state.lock();
            state.received.push(request);
            let behavior = state
                .behaviors
                .get(&request.command)
                .copied()
                .unwrap_or_default();
            match behavior {
                Behavior::Answer => state.documents.get(&request.command).map(encode_response),
                Behavior::Silent => None,
                Behavior::Garbage => Some(b"\0\0\0\0\0\0\0\0{\"truncated".to_vec()),
                Behavior::NonObject => Some(encode_response(&json!([1, 2, 3]))),
            }
        };

        if let Some(reply) = reply {
            let _ = socket.send_to(&reply, from).await;
        }
    }
}
