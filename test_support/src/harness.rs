//! `tokio::io::duplex`-backed client/server pairs for driving the
//! Protocol Engine end to end in integration tests without a real socket.

use tokio::io::{split, DuplexStream, ReadHalf, WriteHalf};

/// One side of a duplex pipe, pre-split into owned read/write halves.
pub struct PipeHalf {
    pub read: ReadHalf<DuplexStream>,
    pub write: WriteHalf<DuplexStream>,
}

/// Build a connected client/server duplex pair, each already split into
/// read/write halves. `capacity` bounds how much unread data may be
/// buffered before a write blocks.
#[must_use]
pub fn connected_pair(capacity: usize) -> (PipeHalf, PipeHalf) {
    let (client, server) = tokio::io::duplex(capacity);
    let (client_read, client_write) = split(client);
    let (server_read, server_write) = split(server);
    (
        PipeHalf { read: client_read, write: client_write },
        PipeHalf { read: server_read, write: server_write },
    )
}
