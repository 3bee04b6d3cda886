//! `NetworkTransport`: acceptor, outbound connection factory, and the
//! byte-stream seam both the Protocol Engine and Peer Synchronizer read
//! and write through. Generic over any `AsyncRead + AsyncWrite` pair, so a
//! caller may layer TLS or any other transform outside this crate.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::Peer;

/// A connected byte stream, split into independently-owned read and write
/// halves, as the Session requires to drive the command loop and any
/// concurrent outbound write.
pub trait ProtocolStreams: Send {
    type Read: AsyncRead + Unpin + Send;
    type Write: AsyncWrite + Unpin + Send;

    fn split(self) -> (Self::Read, Self::Write);
}

/// A running accept loop, returned by `register_service`.
#[async_trait]
pub trait ServiceManager: Send {
    async fn start(&mut self) -> anyhow::Result<()>;
    async fn terminate(&mut self) -> anyhow::Result<()>;
    async fn await_shutdown(&mut self) -> anyhow::Result<()>;
}

/// Service configuration the transport needs to bind or dial: listen
/// address/port, or dial target, plus an I/O deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub address: String,
    pub io_timeout_secs: u64,
}

#[async_trait]
pub trait NetworkTransport: Send + Sync {
    type Streams: ProtocolStreams;
    type Service: ServiceManager;

    async fn connect_to_peer(&self, peer: &Peer, cfg: &TransportConfig) -> anyhow::Result<Self::Streams>;

    async fn register_service(&self, cfg: &TransportConfig) -> anyhow::Result<Self::Service>;
}
