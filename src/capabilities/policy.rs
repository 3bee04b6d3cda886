//! `PolicyService`: admission decisions for posting, `IHAVE`, new groups,
//! and new articles.

use async_trait::async_trait;

use crate::domain::{ArticleHeaders, NewsgroupName, PostingMode};

#[async_trait]
pub trait PolicyService: Send + Sync {
    async fn is_posting_allowed(&self, submitter: Option<&str>) -> anyhow::Result<bool>;

    async fn is_ihave_transfer_allowed(&self, submitter: Option<&str>) -> anyhow::Result<bool>;

    async fn is_newsgroup_allowed(
        &self,
        name: &NewsgroupName,
        mode: PostingMode,
        est_num_articles: u64,
        advertiser: &str,
    ) -> anyhow::Result<bool>;

    async fn is_article_allowed(
        &self,
        mid: &str,
        headers: &ArticleHeaders,
        body: &[String],
        destination: &NewsgroupName,
        mode: PostingMode,
        submitter: Option<&str>,
    ) -> anyhow::Result<bool>;
}
