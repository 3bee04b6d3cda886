//! The Peer Synchronizer: outbound connection caching plus the two
//! operations it drives over those connections.

pub mod cache;
pub mod group_sync;
pub mod newgroups;

pub use cache::{PeerConnection, PeerConnectionCache};
pub use group_sync::sync_newsgroup;
pub use newgroups::fetch_newsgroups_list;
