//! A minimal in-memory `PersistenceService`/`IdentityService`/
//! `PolicyService` implementation, used only by the demo binary (`main.rs`)
//! to have something to serve against. Not durable, not concurrent beyond
//! a single internal mutex, and allows everything by default — a
//! production deployment supplies its own backends instead of this module.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_core::stream::BoxStream;
use futures_util::stream;

use crate::capabilities::persistence::ArticleLocator;
use crate::capabilities::{GroupRecord, IdentityService, PersistenceService, PolicyService};
use crate::domain::{Article, ArticleHeaders, ArticleRange, MessageId, NewsgroupArticle,
    NewsgroupName, Peer, PostingMode};

#[derive(Default)]
struct GroupState {
    record: GroupRecord,
    links: Vec<(u32, String)>,
    next_number: u32,
    feeds: Vec<Peer>,
}

#[derive(Default)]
struct State {
    groups: HashMap<NewsgroupName, GroupState>,
    articles: HashMap<String, Article>,
    peers: Vec<Peer>,
    feed_sync_times: HashMap<(NewsgroupName, String), i64>,
}

pub struct InMemoryPersistence {
    state: Mutex<State>,
}

impl InMemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self { state: Mutex::new(State::default()) }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceService for InMemoryPersistence {
    async fn get_group_by_name(&self, name: &NewsgroupName) -> anyhow::Result<Option<GroupRecord>> {
        Ok(self.state.lock().unwrap().groups.get(name).map(|g| g.record.clone()))
    }

    async fn add_group(
        &self,
        name: NewsgroupName,
        description: String,
        posting_mode: PostingMode,
        created_at: i64,
        created_by: String,
        ignored: bool,
    ) -> anyhow::Result<GroupRecord> {
        let mut state = self.state.lock().unwrap();
        if state.groups.contains_key(&name) {
            anyhow::bail!("newsgroup {name} already exists");
        }
        let record = GroupRecord { name: name.clone(), description, posting_mode, created_at, created_by, ignored };
        state.groups.insert(
            name,
            GroupState { record: record.clone(), links: Vec::new(), next_number: 1, feeds: Vec::new() },
        );
        Ok(record)
    }

    fn list_all_groups(
        &self,
        include_ignored: bool,
        include_local: bool,
    ) -> BoxStream<'_, anyhow::Result<GroupRecord>> {
        let state = self.state.lock().unwrap();
        let records: Vec<anyhow::Result<GroupRecord>> = state
            .groups
            .values()
            .filter(|g| include_ignored || !g.record.ignored)
            .filter(|g| include_local || !g.record.name.is_local_only())
            .map(|g| Ok(g.record.clone()))
            .collect();
        Box::pin(stream::iter(records))
    }

    async fn has_article(&self, mid: &str) -> anyhow::Result<bool> {
        Ok(self.state.lock().unwrap().articles.contains_key(mid))
    }

    async fn get_article(&self, mid: &str) -> anyhow::Result<Option<Article>> {
        Ok(self.state.lock().unwrap().articles.get(mid).cloned())
    }

    async fn reject_article(&self, _mid: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn get_feeds(&self, group: &NewsgroupName) -> anyhow::Result<Vec<Peer>> {
        Ok(self.state.lock().unwrap().groups.get(group).map(|g| g.feeds.clone()).unwrap_or_default())
    }

    async fn add_feed(&self, group: &NewsgroupName, peer: Peer) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        let g = state.groups.get_mut(group).ok_or_else(|| anyhow::anyhow!("no such group"))?;
        if g.feeds.iter().any(|p| p.address == peer.address) {
            anyhow::bail!("feed for peer {} already exists", peer.address);
        }
        g.feeds.push(peer);
        Ok(())
    }

    async fn get_group_article(
        &self,
        group: &NewsgroupName,
        locator: ArticleLocator,
    ) -> anyhow::Result<Option<NewsgroupArticle>> {
        let state = self.state.lock().unwrap();
        let Some(g) = state.groups.get(group) else { return Ok(None) };
        let found = match locator {
            ArticleLocator::Number(n) => g.links.iter().find(|(num, _)| *num == n),
            ArticleLocator::MessageId(ref mid) => g.links.iter().find(|(_, m)| m == mid),
        };
        let Some((number, mid)) = found else { return Ok(None) };
        let Some(article) = state.articles.get(mid) else { return Ok(None) };
        Ok(Some(NewsgroupArticle::new(group.clone(), *number, article.clone(), true)))
    }

    async fn add_article(
        &self,
        group: &NewsgroupName,
        mid: &str,
        headers: ArticleHeaders,
        body: Vec<String>,
        is_allowed: bool,
    ) -> anyhow::Result<u32> {
        let mut state = self.state.lock().unwrap();
        if state.articles.contains_key(mid) {
            anyhow::bail!("article {mid} already exists");
        }
        let message_id = MessageId::new(mid)?;
        state.articles.insert(mid.to_string(), Article { message_id, headers, body });
        let g = state.groups.get_mut(group).ok_or_else(|| anyhow::anyhow!("no such group"))?;
        let number = g.next_number;
        g.next_number += 1;
        if is_allowed {
            g.links.push((number, mid.to_string()));
        }
        Ok(number)
    }

    async fn include_article(&self, group: &NewsgroupName, mid: &str) -> anyhow::Result<u32> {
        let mut state = self.state.lock().unwrap();
        if !state.articles.contains_key(mid) {
            anyhow::bail!("article {mid} not found");
        }
        let g = state.groups.get_mut(group).ok_or_else(|| anyhow::anyhow!("no such group"))?;
        let number = g.next_number;
        g.next_number += 1;
        g.links.push((number, mid.to_string()));
        Ok(number)
    }

    fn get_articles_since<'a>(
        &'a self,
        group: &'a NewsgroupName,
        _since: i64,
    ) -> BoxStream<'a, anyhow::Result<String>> {
        let state = self.state.lock().unwrap();
        let ids: Vec<anyhow::Result<String>> = state
            .groups
            .get(group)
            .map(|g| g.links.iter().map(|(_, mid)| Ok(mid.clone())).collect())
            .unwrap_or_default();
        Box::pin(stream::iter(ids))
    }

    async fn set_ignored(&self, group: &NewsgroupName, ignored: bool) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(g) = state.groups.get_mut(group) {
            g.record.ignored = ignored;
        }
        Ok(())
    }

    async fn get_current_article_range(&self, group: &NewsgroupName) -> anyhow::Result<ArticleRange> {
        let state = self.state.lock().unwrap();
        let Some(g) = state.groups.get(group) else { return Ok(ArticleRange::empty()) };
        if g.links.is_empty() {
            return Ok(ArticleRange::empty());
        }
        let low = g.links.iter().map(|(n, _)| *n).min().unwrap();
        let high = g.links.iter().map(|(n, _)| *n).max().unwrap();
        Ok(ArticleRange::coerce(i64::from(low), i64::from(high)))
    }

    async fn get_peers(&self) -> anyhow::Result<Vec<Peer>> {
        Ok(self.state.lock().unwrap().peers.clone())
    }

    async fn add_peer(&self, label: String, address: String) -> anyhow::Result<Peer> {
        let mut state = self.state.lock().unwrap();
        if state.peers.iter().any(|p| p.label == label) {
            anyhow::bail!("peer {label} already exists");
        }
        let peer = Peer::new(label, address);
        state.peers.push(peer.clone());
        Ok(peer)
    }

    async fn update_peer(&self, peer: Peer) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.peers.iter_mut().find(|p| p.label == peer.label) {
            *existing = peer;
        }
        Ok(())
    }

    async fn get_feed_sync_time(&self, group: &NewsgroupName, peer_label: &str) -> anyhow::Result<i64> {
        let key = (group.clone(), peer_label.to_string());
        Ok(self.state.lock().unwrap().feed_sync_times.get(&key).copied().unwrap_or(0))
    }

    async fn advance_feed_sync_time(
        &self,
        group: &NewsgroupName,
        peer_label: &str,
        observed: i64,
    ) -> anyhow::Result<()> {
        let key = (group.clone(), peer_label.to_string());
        let mut state = self.state.lock().unwrap();
        let entry = state.feed_sync_times.entry(key).or_insert(0);
        if observed > *entry {
            *entry = observed;
        }
        Ok(())
    }
}

pub struct InMemoryIdentity {
    host_id: String,
    next_mid_seq: Mutex<u64>,
}

impl InMemoryIdentity {
    #[must_use]
    pub fn new(host_id: impl Into<String>) -> Self {
        Self { host_id: host_id.into(), next_mid_seq: Mutex::new(0) }
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentity {
    async fn authenticate(&self, _subject: &str, _credentials: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    async fn is_valid(&self, _token: &str) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn host_identifier(&self) -> String {
        self.host_id.clone()
    }

    async fn create_message_id(&self, _headers: &ArticleHeaders) -> anyhow::Result<MessageId> {
        let mut seq = self.next_mid_seq.lock().unwrap();
        *seq += 1;
        Ok(MessageId::new(format!("<generated-{}@{}>", *seq, self.host_id))?)
    }
}

pub struct InMemoryPolicy;

impl InMemoryPolicy {
    #[must_use]
    pub fn allow_all() -> Self {
        Self
    }
}

#[async_trait]
impl PolicyService for InMemoryPolicy {
    async fn is_posting_allowed(&self, _submitter: Option<&str>) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn is_ihave_transfer_allowed(&self, _submitter: Option<&str>) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn is_newsgroup_allowed(
        &self,
        _name: &NewsgroupName,
        _mode: PostingMode,
        _est_num_articles: u64,
        _advertiser: &str,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn is_article_allowed(
        &self,
        _mid: &str,
        _headers: &ArticleHeaders,
        _body: &[String],
        _destination: &NewsgroupName,
        _mode: PostingMode,
        _submitter: Option<&str>,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }
}
