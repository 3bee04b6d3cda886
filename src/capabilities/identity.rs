//! `IdentityService`: authentication token lifecycle, host identifier, and
//! Message-ID synthesis for `POST`.

use async_trait::async_trait;

use crate::domain::{ArticleHeaders, MessageId};

/// Authentication and article-identity seams the Protocol Engine calls
/// into. Out of scope to implement here beyond an in-memory reference used
/// by tests and the demo binary.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange a subject/credential pair for an opaque token, or `None` if
    /// the credentials are not accepted.
    async fn authenticate(&self, subject: &str, credentials: &str) -> anyhow::Result<Option<String>>;

    async fn is_valid(&self, token: &str) -> anyhow::Result<bool>;

    /// A stable opaque string unique across this host's peers and
    /// immutable for the host's lifetime. Falls back to `HOSTNAME` /
    /// `COMPUTERNAME` when no override is configured.
    fn host_identifier(&self) -> String;

    /// Synthesize a fresh, valid `Message-ID` for a `POST`ed article that
    /// did not supply one.
    async fn create_message_id(&self, headers: &ArticleHeaders) -> anyhow::Result<MessageId>;
}
