//! `PersistenceService`: the group and article store. Out of scope to
//! implement here — this crate defines only the trait seam a real backend
//! (database-backed, directory-backed, etc.) implements.

use async_trait::async_trait;
use futures_core::stream::BoxStream;
use thiserror::Error;

use crate::domain::{Article, ArticleRange, NewsgroupName, Peer, PostingMode};

#[derive(Debug, Error)]
#[error("a newsgroup named {0:?} already exists")]
pub struct ExistingNewsgroup(pub String);

#[derive(Debug, Error)]
#[error("a feed for peer {0:?} already exists on this newsgroup")]
pub struct ExistingFeed(pub String);

#[derive(Debug, Error)]
#[error("an article {0:?} already exists")]
pub struct ExistingArticle(pub String);

#[derive(Debug, Error)]
#[error("a peer named {0:?} already exists")]
pub struct ExistingPeer(pub String);

/// A stored newsgroup's descriptive record, independent of its article
/// contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub name: NewsgroupName,
    pub description: String,
    pub posting_mode: PostingMode,
    pub created_at: i64,
    pub created_by: String,
    pub ignored: bool,
}

/// Either an article number or a message-id, the two ways the Protocol
/// Engine and Synchronizer address an article within a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleLocator {
    Number(u32),
    MessageId(String),
}

/// Group and article storage, and the feed/peer edges the Synchronizer
/// reads and writes. All read-modify-write sequences (add-if-absent,
/// link-article, advance timestamp) are this trait's responsibility to
/// serialize; the Protocol Engine and Synchronizer hold no locks of their
/// own over persisted state.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    async fn get_group_by_name(&self, name: &NewsgroupName) -> anyhow::Result<Option<GroupRecord>>;

    /// # Errors
    /// Returns `ExistingNewsgroup` if a group of that name is already stored.
    async fn add_group(
        &self,
        name: NewsgroupName,
        description: String,
        posting_mode: PostingMode,
        created_at: i64,
        created_by: String,
        ignored: bool,
    ) -> anyhow::Result<GroupRecord>;

    /// A restartable finite stream over all stored groups.
    fn list_all_groups(
        &self,
        include_ignored: bool,
        include_local: bool,
    ) -> BoxStream<'_, anyhow::Result<GroupRecord>>;

    async fn has_article(&self, mid: &str) -> anyhow::Result<bool>;
    async fn get_article(&self, mid: &str) -> anyhow::Result<Option<Article>>;
    async fn reject_article(&self, mid: &str) -> anyhow::Result<()>;

    async fn get_feeds(&self, group: &NewsgroupName) -> anyhow::Result<Vec<Peer>>;

    /// # Errors
    /// Returns `ExistingFeed` if `peer` already has a feed on this group.
    async fn add_feed(&self, group: &NewsgroupName, peer: Peer) -> anyhow::Result<()>;

    async fn get_group_article(
        &self,
        group: &NewsgroupName,
        locator: ArticleLocator,
    ) -> anyhow::Result<Option<crate::domain::NewsgroupArticle>>;

    /// # Errors
    /// Returns `ExistingArticle` if `mid` is already stored.
    async fn add_article(
        &self,
        group: &NewsgroupName,
        mid: &str,
        headers: crate::domain::ArticleHeaders,
        body: Vec<String>,
        is_allowed: bool,
    ) -> anyhow::Result<u32>;

    /// Link an already-stored article into `group` without re-fetching it.
    async fn include_article(&self, group: &NewsgroupName, mid: &str) -> anyhow::Result<u32>;

    /// A lazy finite stream of message-ids added to `group` since `since`.
    fn get_articles_since<'a>(
        &'a self,
        group: &'a NewsgroupName,
        since: i64,
    ) -> BoxStream<'a, anyhow::Result<String>>;

    async fn set_ignored(&self, group: &NewsgroupName, ignored: bool) -> anyhow::Result<()>;
    async fn get_current_article_range(&self, group: &NewsgroupName) -> anyhow::Result<ArticleRange>;

    async fn get_peers(&self) -> anyhow::Result<Vec<Peer>>;

    /// # Errors
    /// Returns `ExistingPeer` if `label` is already registered.
    async fn add_peer(&self, label: String, address: String) -> anyhow::Result<Peer>;

    /// Persist an updated `Peer` record (e.g. after `list_last_fetched`
    /// advances). Matched by `label`.
    async fn update_peer(&self, peer: Peer) -> anyhow::Result<()>;

    /// The `(group, peer)` feed's last successful sync time, or `0` if the
    /// feed has never completed a sync.
    async fn get_feed_sync_time(&self, group: &NewsgroupName, peer_label: &str) -> anyhow::Result<i64>;

    /// Advance the `(group, peer)` feed's last sync time to `observed`, but
    /// never move it backward.
    async fn advance_feed_sync_time(
        &self,
        group: &NewsgroupName,
        peer_label: &str,
        observed: i64,
    ) -> anyhow::Result<()>;
}
