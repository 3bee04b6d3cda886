//! The domain error taxonomy: every recoverable condition the Protocol
//! Engine and Peer Synchronizer can hit, mapped to its RFC 3977 response
//! code and a client-safe message. Capability trait methods return
//! `anyhow::Result` (their concrete failure shapes are a backend concern);
//! the engines themselves return `NntpError` so call sites can match on
//! error kind rather than string-sniff an opaque error.

use thiserror::Error;

use crate::responses;

#[derive(Debug, Error)]
pub enum NntpError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unrecognized command: {0}")]
    UnrecognizedCommand(String),

    #[error("protocol failure: {0}")]
    Protocol(String),

    #[error("capability unsupported: {0}")]
    CapabilityUnsupported(String),

    #[error("state precondition violated: {0}")]
    StatePrecondition(StatePrecondition),

    #[error("lookup failure: {0}")]
    Lookup(LookupFailure),

    #[error("policy rejection: {0}")]
    PolicyRejected(PolicyRejection),

    #[error("validation failure: {0}")]
    Validation(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StatePrecondition {
    #[error("no newsgroup selected")]
    NoGroupSelected,
    #[error("no current article")]
    NoCurrentArticle,
    #[error("no next article")]
    NoNextArticle,
    #[error("no previous article")]
    NoPrevArticle,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("no such newsgroup")]
    NoSuchGroup,
    #[error("no such article number")]
    NoSuchArticleNumber,
    #[error("no such message-id")]
    NoSuchArticleId,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRejection {
    #[error("article not wanted")]
    NotWanted,
    #[error("transfer should be retried later")]
    TransferRetry,
    #[error("transfer permanently rejected")]
    TransferRejected,
    #[error("posting not permitted")]
    PostingNotPermitted,
    #[error("posting failed")]
    PostingFailed,
}

impl NntpError {
    /// Map this error to the exact response code assigned to its kind.
    /// `Transport` and `UnrecognizedCommand` both answer `500`; `Protocol`
    /// is reserved for a syntax error within an otherwise-recognized
    /// command and answers `501`.
    #[must_use]
    pub fn response_code(&self) -> u16 {
        match self {
            Self::Transport(_) => responses::COMMAND_NOT_RECOGNIZED,
            Self::UnrecognizedCommand(_) => responses::COMMAND_NOT_RECOGNIZED,
            Self::Protocol(_) => responses::COMMAND_SYNTAX_ERROR,
            Self::CapabilityUnsupported(_) => responses::COMMAND_NOT_SUPPORTED,
            Self::StatePrecondition(p) => match p {
                StatePrecondition::NoGroupSelected => responses::NO_GROUP_SELECTED,
                StatePrecondition::NoCurrentArticle => responses::NO_CURRENT_ARTICLE,
                StatePrecondition::NoNextArticle => responses::NO_NEXT_ARTICLE,
                StatePrecondition::NoPrevArticle => responses::NO_PREV_ARTICLE,
            },
            Self::Lookup(l) => match l {
                LookupFailure::NoSuchGroup => responses::NO_SUCH_GROUP,
                LookupFailure::NoSuchArticleNumber => responses::NO_SUCH_ARTICLE_NUMBER,
                LookupFailure::NoSuchArticleId => responses::NO_SUCH_ARTICLE_ID,
            },
            Self::PolicyRejected(p) => match p {
                PolicyRejection::NotWanted => responses::NOT_WANTED,
                PolicyRejection::TransferRetry => responses::TRANSFER_RETRY,
                PolicyRejection::TransferRejected => responses::TRANSFER_REJECTED,
                PolicyRejection::PostingNotPermitted => responses::POSTING_NOT_PERMITTED,
                PolicyRejection::PostingFailed => responses::POSTING_FAILED,
            },
            Self::Validation(_) => responses::TRANSFER_REJECTED,
        }
    }

    /// Generic, client-safe phrasing: never echoes internal error detail
    /// onto the wire.
    #[must_use]
    pub fn client_text(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport error",
            Self::UnrecognizedCommand(_) => "command not recognized",
            Self::Protocol(_) => "syntax error",
            Self::CapabilityUnsupported(_) => "feature not supported",
            Self::StatePrecondition(StatePrecondition::NoGroupSelected) => "no newsgroup selected",
            Self::StatePrecondition(StatePrecondition::NoCurrentArticle) => "no current article",
            Self::StatePrecondition(StatePrecondition::NoNextArticle) => "no next article in this group",
            Self::StatePrecondition(StatePrecondition::NoPrevArticle) => {
                "no previous article in this group"
            }
            Self::Lookup(LookupFailure::NoSuchGroup) => "no such newsgroup",
            Self::Lookup(LookupFailure::NoSuchArticleNumber) => "no such article number in this group",
            Self::Lookup(LookupFailure::NoSuchArticleId) => "no such article found",
            Self::PolicyRejected(PolicyRejection::NotWanted) => "not wanted, do not send it",
            Self::PolicyRejected(PolicyRejection::TransferRetry) => "transfer failed, try again later",
            Self::PolicyRejected(PolicyRejection::TransferRejected) => "transfer rejected, do not retry",
            Self::PolicyRejected(PolicyRejection::PostingNotPermitted) => "posting not permitted",
            Self::PolicyRejected(PolicyRejection::PostingFailed) => "posting failed",
            Self::Validation(_) => "article validation failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_precondition_variants_map_to_spec_codes() {
        assert_eq!(
            NntpError::StatePrecondition(StatePrecondition::NoGroupSelected).response_code(),
            412
        );
        assert_eq!(
            NntpError::StatePrecondition(StatePrecondition::NoCurrentArticle).response_code(),
            420
        );
        assert_eq!(
            NntpError::StatePrecondition(StatePrecondition::NoNextArticle).response_code(),
            421
        );
        assert_eq!(
            NntpError::StatePrecondition(StatePrecondition::NoPrevArticle).response_code(),
            422
        );
    }

    #[test]
    fn lookup_failure_variants_map_to_spec_codes() {
        assert_eq!(NntpError::Lookup(LookupFailure::NoSuchGroup).response_code(), 411);
        assert_eq!(
            NntpError::Lookup(LookupFailure::NoSuchArticleNumber).response_code(),
            423
        );
        assert_eq!(
            NntpError::Lookup(LookupFailure::NoSuchArticleId).response_code(),
            430
        );
    }

    #[test]
    fn policy_rejection_variants_map_to_spec_codes() {
        assert_eq!(NntpError::PolicyRejected(PolicyRejection::NotWanted).response_code(), 435);
        assert_eq!(
            NntpError::PolicyRejected(PolicyRejection::TransferRetry).response_code(),
            436
        );
        assert_eq!(
            NntpError::PolicyRejected(PolicyRejection::TransferRejected).response_code(),
            437
        );
        assert_eq!(
            NntpError::PolicyRejected(PolicyRejection::PostingNotPermitted).response_code(),
            440
        );
        assert_eq!(
            NntpError::PolicyRejected(PolicyRejection::PostingFailed).response_code(),
            441
        );
    }

    #[test]
    fn client_text_never_echoes_internal_detail() {
        let err = NntpError::Transport("connection reset by peer at 10.0.0.5:9001".to_string());
        assert_eq!(err.client_text(), "transport error");
    }
}
