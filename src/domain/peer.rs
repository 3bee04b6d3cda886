//! Peer node and per-group synchronization feed state.

use super::newsgroup::NewsgroupName;

/// A remote node this instance exchanges articles with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub label: String,
    pub address: String,
    pub disabled: bool,
    pub capabilities: Vec<String>,
    /// When `NEWGROUPS` was last fetched from this peer; `None` means
    /// "never", and callers fall back to the epoch.
    pub list_last_fetched: Option<i64>,
}

impl Peer {
    #[must_use]
    pub fn new(label: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            address: address.into(),
            disabled: false,
            capabilities: Vec::new(),
            list_last_fetched: None,
        }
    }

    #[must_use]
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(capability))
    }

    /// Whether `NEWNEWS` is usable against this peer; per the Synchronizer's
    /// design, a peer lacking it falls back to `LISTGROUP`.
    #[must_use]
    pub fn supports_newnews(&self) -> bool {
        self.supports("NEWNEWS")
    }

    /// Advance `list_last_fetched` to `observed`, but never move it
    /// backward.
    pub fn advance_list_last_fetched(&mut self, observed: i64) {
        if self.list_last_fetched.is_none_or(|prior| observed > prior) {
            self.list_last_fetched = Some(observed);
        }
    }
}

/// The per-(newsgroup, peer) synchronization cursor: when this group was
/// last pulled from this peer, used to bound the next `NEWNEWS`/`NEWGROUPS`
/// window. Updated monotonically — never moved backward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub newsgroup: NewsgroupName,
    pub peer_label: String,
    pub last_sync_time: i64,
}

impl Feed {
    #[must_use]
    pub fn new(newsgroup: NewsgroupName, peer_label: impl Into<String>) -> Self {
        Self {
            newsgroup,
            peer_label: peer_label.into(),
            last_sync_time: 0,
        }
    }

    /// Advance `last_sync_time` to `observed`, but never move it backward.
    pub fn advance(&mut self, observed: i64) {
        if observed > self.last_sync_time {
            self.last_sync_time = observed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_lookup_is_case_insensitive() {
        let mut peer = Peer::new("alice", "alice.example:119");
        peer.capabilities.push("NEWNEWS".to_string());
        assert!(peer.supports("newnews"));
        assert!(peer.supports_newnews());
    }

    #[test]
    fn peer_without_newnews_does_not_support_it() {
        let peer = Peer::new("bob", "bob.example:119");
        assert!(!peer.supports_newnews());
    }

    #[test]
    fn list_last_fetched_advances_monotonically_from_none() {
        let mut peer = Peer::new("alice", "alice.example:119");
        peer.advance_list_last_fetched(100);
        peer.advance_list_last_fetched(50);
        assert_eq!(peer.list_last_fetched, Some(100));
        peer.advance_list_last_fetched(200);
        assert_eq!(peer.list_last_fetched, Some(200));
    }

    #[test]
    fn feed_advance_never_moves_backward() {
        let mut feed = Feed::new(NewsgroupName::new("comp.lang.rust").unwrap(), "alice");
        feed.advance(100);
        feed.advance(50);
        assert_eq!(feed.last_sync_time, 100);
        feed.advance(200);
        assert_eq!(feed.last_sync_time, 200);
    }
}
