//! Per-connection session state. Only the Protocol Engine and its
//! dispatched handlers mutate this; the Session owns its transport streams
//! exclusively and releases them on termination.

use std::collections::BTreeSet;

use crate::domain::{ArticleRange, NewsgroupName, PostingMode};

/// Capabilities negotiated (or assumed) for this connection. The Domain
/// Model names these as a flag set; we store the raw token strings since
/// the Protocol Engine only ever tests membership (`CAPABILITIES`
/// emission, `MODE READER` gating).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, capability: impl Into<String>) {
        self.0.insert(capability.into().to_ascii_uppercase());
    }

    #[must_use]
    pub fn contains(&self, capability: &str) -> bool {
        self.0.contains(&capability.to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// The article-relative cursor state: `None` until a group is selected,
/// then tracks the current article number within that group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedGroup {
    pub name: NewsgroupName,
    pub range: ArticleRange,
    pub current_article: Option<u32>,
}

/// Per-connection state for one Protocol Engine session. Does not own
/// transport streams directly — the engine loop owns those and passes
/// `&mut Session` to each dispatched handler, per the "no command handler
/// retains state across its own invocation" design note.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub current_group: Option<SelectedGroup>,
    pub auth_token: Option<String>,
    pub negotiated_caps: CapabilitySet,
    pub pending_username: Option<String>,
    pub posting_mode: PostingMode,
}

impl Session {
    #[must_use]
    pub fn new(posting_mode: PostingMode) -> Self {
        Self {
            current_group: None,
            auth_token: None,
            negotiated_caps: CapabilitySet::new(),
            pending_username: None,
            posting_mode,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Select `name` as the current group with the given article range,
    /// per `GROUP g -> Group(g)+Article(low)` if non-empty else
    /// `Group(g)`.
    pub fn select_group(&mut self, name: NewsgroupName, range: ArticleRange) {
        let current_article = if range.is_empty() { None } else { Some(range.low) };
        self.current_group = Some(SelectedGroup {
            name,
            range,
            current_article,
        });
    }

    #[must_use]
    pub fn has_group_selected(&self) -> bool {
        self.current_group.is_some()
    }
}

impl Default for PostingMode {
    fn default() -> Self {
        Self::Prohibited
    }
}
