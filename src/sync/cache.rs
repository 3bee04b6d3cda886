//! The process-wide peer-connection cache: lazy creation, per-peer mutual
//! exclusion, global teardown. Unrelated peers may be handled in
//! parallel; the same peer's slot serializes concurrent sync tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub type BoxedRead = Box<dyn AsyncRead + Unpin + Send>;
pub type BoxedWrite = Box<dyn AsyncWrite + Unpin + Send>;

/// An established outbound connection to a peer, generic over the byte
/// stream (erased behind `Box<dyn AsyncRead/AsyncWrite>` so the cache
/// itself need not be generic over any particular `NetworkTransport`
/// implementation).
pub struct PeerConnection {
    pub reader: BufReader<BoxedRead>,
    pub writer: BoxedWrite,
}

impl PeerConnection {
    #[must_use]
    pub fn new(reader: BoxedRead, writer: BoxedWrite) -> Self {
        Self { reader: BufReader::new(reader), writer }
    }
}

type Slot = Arc<AsyncMutex<Option<PeerConnection>>>;

/// Process-wide map from peer label to a lazily-created, exclusively-held
/// outbound connection slot.
#[derive(Default)]
pub struct PeerConnectionCache {
    slots: StdMutex<HashMap<String, Slot>>,
}

impl PeerConnectionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, peer_label: &str) -> Slot {
        self.slots
            .lock()
            .unwrap()
            .entry(peer_label.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(None)))
            .clone()
    }

    /// Acquire the connection slot for `peer_label`, held exclusively for
    /// as long as the returned guard lives. The slot starts as `None`;
    /// callers are responsible for dialing and storing a fresh
    /// `PeerConnection` on first use, and for clearing it (setting back to
    /// `None`) when a read/write/health-probe failure marks it broken.
    pub async fn lock(&self, peer_label: &str) -> OwnedMutexGuard<Option<PeerConnection>> {
        self.slot(peer_label).lock_owned().await
    }

    /// Tear down every cached connection and empty the map.
    pub async fn close_all_connections(&self) {
        let slots: Vec<Slot> = {
            let mut map = self.slots.lock().unwrap();
            let collected = map.values().cloned().collect();
            map.clear();
            collected
        };
        for slot in slots {
            let mut guard = slot.lock().await;
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lock_starts_as_none_and_is_reusable() {
        let cache = PeerConnectionCache::new();
        {
            let guard = cache.lock("alice").await;
            assert!(guard.is_none());
        }
        let guard = cache.lock("alice").await;
        assert!(guard.is_none());
    }

    #[tokio::test]
    async fn close_all_connections_empties_every_slot() {
        let cache = PeerConnectionCache::new();
        {
            let mut guard = cache.lock("alice").await;
            *guard = Some(PeerConnection::new(Box::new(tokio::io::empty()), Box::new(tokio::io::sink())));
        }
        cache.close_all_connections().await;
        let guard = cache.lock("alice").await;
        assert!(guard.is_none());
    }
}
