//! Wire-level article splitting and the stored/posted article shapes.

use thiserror::Error;

use super::headers::ArticleHeaders;
use super::message_id::MessageId;
use super::newsgroup::NewsgroupName;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidProtoArticle {
    #[error("article has no blank-line separator between headers and body")]
    MissingSeparator,
    #[error("header line {0:?} has no colon")]
    MalformedHeaderLine(String),
}

/// The raw split of an article's dot-unstuffed lines into headers and body,
/// before any per-field validation of the header values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoArticle {
    pub headers: ArticleHeaders,
    pub body: Vec<String>,
}

impl ProtoArticle {
    /// Split already dot-unstuffed wire lines (no terminating `.` line) into
    /// a header block and body. Headers end at the first blank line;
    /// folded continuation lines (leading space/tab) are appended to the
    /// previous header's value.
    ///
    /// # Errors
    ///
    /// Returns `MissingSeparator` if no blank line is found, or
    /// `MalformedHeaderLine` if a non-continuation header line has no colon.
    pub fn from_lines(lines: &[String]) -> Result<Self, InvalidProtoArticle> {
        let split = lines
            .iter()
            .position(|line| line.is_empty())
            .ok_or(InvalidProtoArticle::MissingSeparator)?;

        let mut headers = ArticleHeaders::new();
        let mut last_name: Option<String> = None;
        for line in &lines[..split] {
            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some(name) = &last_name {
                    headers.append_to_last(name, line.trim());
                }
                continue;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| InvalidProtoArticle::MalformedHeaderLine(line.clone()))?;
            let name = name.trim();
            let value = value.trim();
            headers.insert(name, value);
            last_name = Some(name.to_string());
        }

        let body = lines[split + 1..].to_vec();
        Ok(Self { headers, body })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidArticle {
    #[error(transparent)]
    MalformedHeader(#[from] super::headers::InvalidArticleHeader),
    #[error("article is missing required header {0}")]
    MissingRequiredHeader(&'static str),
}

/// A validated article as stored by the Persistence capability, independent
/// of which newsgroup(s) carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub message_id: MessageId,
    pub headers: ArticleHeaders,
    pub body: Vec<String>,
}

impl Article {
    /// Validate a `ProtoArticle` and lift it into a stored `Article`.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredHeader` if `Message-ID` is absent, or
    /// `MalformedHeader` if any standard header fails its validator.
    pub fn from_proto(proto: ProtoArticle) -> Result<Self, InvalidArticle> {
        proto.headers.validate_all()?;
        let raw_id = proto
            .headers
            .get("Message-ID")
            .ok_or(InvalidArticle::MissingRequiredHeader("Message-ID"))?;
        let message_id =
            MessageId::new(raw_id).map_err(|_| InvalidArticle::MissingRequiredHeader("Message-ID"))?;
        Ok(Self {
            message_id,
            headers: proto.headers,
            body: proto.body,
        })
    }
}

/// The per-newsgroup placement of a stored article: its assigned article
/// number and whether Policy allows it to be enumerated in that group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsgroupArticle {
    pub newsgroup: NewsgroupName,
    pub article_number: u32,
    pub article: Article,
    pub is_allowed: bool,
}

impl NewsgroupArticle {
    #[must_use]
    pub fn new(
        newsgroup: NewsgroupName,
        article_number: u32,
        article: Article,
        is_allowed: bool,
    ) -> Self {
        Self {
            newsgroup,
            article_number,
            article,
            is_allowed,
        }
    }

    /// Quarantined articles are stored and retrievable by Message-ID, but
    /// excluded from group enumeration (`GROUP`/`LISTGROUP`/article-number
    /// lookups).
    #[must_use]
    pub fn is_enumerable(&self) -> bool {
        self.is_allowed
    }
}
