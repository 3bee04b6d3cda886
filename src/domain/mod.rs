//! The shared domain model: value types and entities used by both the
//! Protocol Engine and the Peer Synchronizer.

pub mod article;
pub mod article_number;
pub mod headers;
pub mod message_id;
pub mod newsgroup;
pub mod peer;
pub mod posting_mode;

pub use article::{Article, InvalidArticle, InvalidProtoArticle, NewsgroupArticle, ProtoArticle};
pub use article_number::{ArticleRange, NO_ARTICLES_HIGHEST_NUMBER, NO_ARTICLES_LOWEST_NUMBER};
pub use headers::{ArticleHeaders, InvalidArticleHeader};
pub use message_id::{InvalidMessageId, MessageId};
pub use newsgroup::{InvalidNewsgroupName, NewsgroupName};
pub use peer::{Feed, Peer};
pub use posting_mode::PostingMode;
