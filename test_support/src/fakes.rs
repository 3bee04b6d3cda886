//! In-memory `PersistenceService`/`IdentityService`/`PolicyService`
//! doubles. Not a production backend: no durability, no concurrency
//! control beyond a single internal mutex.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_core::stream::BoxStream;
use futures_util::stream;

use nntp_node::capabilities::persistence::ArticleLocator;
use nntp_node::capabilities::{GroupRecord, IdentityService, PersistenceService, PolicyService};
use nntp_node::domain::{Article, ArticleHeaders, ArticleRange, MessageId, NewsgroupArticle,
    NewsgroupName, Peer, PostingMode};

#[derive(Default)]
struct GroupState {
    record: GroupRecord,
    // article number -> message-id, in insertion order.
    links: Vec<(u32, String)>,
    next_number: u32,
    feeds: Vec<Peer>,
}

#[derive(Default)]
struct State {
    groups: HashMap<NewsgroupName, GroupState>,
    articles: HashMap<String, Article>,
    rejected: std::collections::HashSet<String>,
    peers: Vec<Peer>,
    feed_sync_times: HashMap<(NewsgroupName, String), i64>,
}

/// An in-memory `PersistenceService`. Article numbers start at 1 and are
/// assigned per group on first link.
pub struct InMemoryPersistence {
    state: Mutex<State>,
}

impl InMemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self { state: Mutex::new(State::default()) }
    }

    /// Test setup helper: seed a group with a starting article range.
    pub fn seed_group(&self, name: &NewsgroupName, posting_mode: PostingMode, created_at: i64) {
        let mut state = self.state.lock().unwrap();
        state.groups.entry(name.clone()).or_insert_with(|| GroupState {
            record: GroupRecord {
                name: name.clone(),
                description: String::new(),
                posting_mode,
                created_at,
                created_by: "test".to_string(),
                ignored: false,
            },
            links: Vec::new(),
            next_number: 1,
            feeds: Vec::new(),
        });
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

    async fn reject_article(&self, mid: &str) -> anyhow::Result<()> {
        self.state.lock().unwrap().rejected.insert(mid.to_string());
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
        since: i64,
    ) -> BoxStream<'a, anyhow::Result<String>> {
        // The reference store does not track per-article insertion
        // timestamps; it returns every linked id, which is sufficient for
        // an empty-since baseline sync.
        let _ = since;
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

/// An in-memory `IdentityService`: a fixed host identifier and a small
/// username/password table.
pub struct InMemoryIdentity {
    host_id: String,
    credentials: Mutex<HashMap<String, String>>,
    tokens: Mutex<HashMap<String, String>>,
    next_mid_seq: Mutex<u64>,
}

impl InMemoryIdentity {
    #[must_use]
    pub fn new(host_id: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            credentials: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            next_mid_seq: Mutex::new(0),
        }
    }

    pub fn add_credential(&self, username: impl Into<String>, password: impl Into<String>) {
        self.credentials.lock().unwrap().insert(username.into(), password.into());
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentity {
    async fn authenticate(&self, subject: &str, credentials: &str) -> anyhow::Result<Option<String>> {
        let creds = self.credentials.lock().unwrap();
        if creds.get(subject).is_some_and(|p| p == credentials) {
            let token = format!("token-{subject}");
            self.tokens.lock().unwrap().insert(token.clone(), subject.to_string());
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }

    async fn is_valid(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.tokens.lock().unwrap().contains_key(token))
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

/// A `PolicyService` that can be configured to allow everything (the
/// common case for protocol-engine tests) or to reject by predicate.
pub struct InMemoryPolicy {
    allow_posting: bool,
    allow_ihave: bool,
    allow_new_groups: bool,
    allow_articles: bool,
}

impl InMemoryPolicy {
    #[must_use]
    pub fn allow_all() -> Self {
        Self { allow_posting: true, allow_ihave: true, allow_new_groups: true, allow_articles: true }
    }

    #[must_use]
    pub fn deny_all() -> Self {
        Self { allow_posting: false, allow_ihave: false, allow_new_groups: false, allow_articles: false }
    }
}

#[async_trait]
impl PolicyService for InMemoryPolicy {
    async fn is_posting_allowed(&self, _submitter: Option<&str>) -> anyhow::Result<bool> {
        Ok(self.allow_posting)
    }

    async fn is_ihave_transfer_allowed(&self, _submitter: Option<&str>) -> anyhow::Result<bool> {
        Ok(self.allow_ihave)
    }

    async fn is_newsgroup_allowed(
        &self,
        _name: &NewsgroupName,
        _mode: PostingMode,
        _est_num_articles: u64,
        _advertiser: &str,
    ) -> anyhow::Result<bool> {
        Ok(self.allow_new_groups)
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
        Ok(self.allow_articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_article_then_get_group_article_round_trips() {
        let persistence = InMemoryPersistence::new();
        let name = NewsgroupName::new("comp.lang.rust").unwrap();
        persistence.seed_group(&name, PostingMode::Allowed, 0);

        let mut headers = ArticleHeaders::new();
        headers.insert("Message-ID", "<a@h>");
        let number = persistence
            .add_article(&name, "<a@h>", headers, vec!["body".to_string()], true)
            .await
            .unwrap();
        assert_eq!(number, 1);

        let found = persistence
            .get_group_article(&name, ArticleLocator::Number(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.article.message_id.as_str(), "<a@h>");
    }

    #[tokio::test]
    async fn duplicate_article_is_rejected() {
        let persistence = InMemoryPersistence::new();
        let name = NewsgroupName::new("comp.lang.rust").unwrap();
        persistence.seed_group(&name, PostingMode::Allowed, 0);
        let mut headers = ArticleHeaders::new();
        headers.insert("Message-ID", "<a@h>");
        persistence
            .add_article(&name, "<a@h>", headers.clone(), vec![], true)
            .await
            .unwrap();
        assert!(persistence.add_article(&name, "<a@h>", headers, vec![], true).await.is_err());
    }

    #[tokio::test]
    async fn identity_authenticates_known_credentials_only() {
        let identity = InMemoryIdentity::new("news.example");
        identity.add_credential("alice", "secret");
        assert!(identity.authenticate("alice", "wrong").await.unwrap().is_none());
        let token = identity.authenticate("alice", "secret").await.unwrap().unwrap();
        assert!(identity.is_valid(&token).await.unwrap());
    }
}
