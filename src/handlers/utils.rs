//! Helpers shared by every command handler: response emission and the
//! `<mid>` vs numeric vs invalid argument classification.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec::{self, Command};
use crate::domain::MessageId;
use crate::error::{LookupFailure, NntpError, StatePrecondition};
use crate::session::Session;

/// What the dispatch loop does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Terminate,
}

/// Write a single status line, e.g. `205 closing connection`.
///
/// # Errors
/// Propagates the underlying `FramingError`.
pub async fn respond<W>(writer: &mut W, code: u16, text: &str) -> Result<(), NntpError>
where
    W: AsyncWrite + Unpin,
{
    codec::write_line(writer, &format!("{code} {text}"))
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))
}

/// Write a status line followed by a dot-terminated multi-line payload.
///
/// # Errors
/// Propagates the underlying `FramingError`.
pub async fn respond_multiline<W>(
    writer: &mut W,
    code: u16,
    text: &str,
    lines: &[String],
) -> Result<(), NntpError>
where
    W: AsyncWrite + Unpin,
{
    respond(writer, code, text).await?;
    codec::write_dot_terminated(writer, lines)
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))
}

/// Ensure a command took exactly `n` args, else a `501` protocol error.
///
/// # Errors
/// Returns `NntpError::Protocol` if arity does not match.
pub fn require_arity(cmd: &Command, n: usize) -> Result<(), NntpError> {
    if cmd.args.len() == n {
        Ok(())
    } else {
        Err(NntpError::Protocol(format!(
            "{} expects {n} argument(s), got {}",
            cmd.verb,
            cmd.args.len()
        )))
    }
}

/// Ensure a command took at most `n` args, else a `501` protocol error.
///
/// # Errors
/// Returns `NntpError::Protocol` if more than `n` args were given.
pub fn require_max_arity(cmd: &Command, n: usize) -> Result<(), NntpError> {
    if cmd.args.len() <= n {
        Ok(())
    } else {
        Err(NntpError::Protocol(format!(
            "{} takes at most {n} argument(s), got {}",
            cmd.verb,
            cmd.args.len()
        )))
    }
}

/// Require a newsgroup to currently be selected, per the `Session`
/// validity invariant.
///
/// # Errors
/// Returns `NntpError::StatePrecondition(NoGroupSelected)` if unset.
pub fn require_group_selected(session: &Session) -> Result<(), NntpError> {
    if session.has_group_selected() {
        Ok(())
    } else {
        Err(NntpError::StatePrecondition(StatePrecondition::NoGroupSelected))
    }
}

/// The parsed shape of a single article-target argument token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleTarget {
    MessageId(MessageId),
    Number(u32),
}

/// Classify a single article-target argument: a token starting with `<`
/// and ending with `>` is a `MessageId`; an all-digit token is a number;
/// anything else is `501`.
///
/// # Errors
/// Returns `NntpError::Protocol` if the token is neither shape.
pub fn parse_article_target(token: &str) -> Result<ArticleTarget, NntpError> {
    if token.starts_with('<') && token.ends_with('>') {
        MessageId::new(token)
            .map(ArticleTarget::MessageId)
            .map_err(|e| NntpError::Protocol(format!("invalid message-id argument: {e}")))
    } else if let Ok(n) = token.parse::<u32>() {
        Ok(ArticleTarget::Number(n))
    } else {
        Err(NntpError::Protocol(format!("invalid article argument: {token:?}")))
    }
}

/// Raise `NoSuchArticleNumber`/`NoSuchArticleId` matched to the target
/// shape, for a lookup that came back empty.
#[must_use]
pub fn lookup_failure_for(target: &ArticleTarget) -> NntpError {
    match target {
        ArticleTarget::MessageId(_) => NntpError::Lookup(LookupFailure::NoSuchArticleId),
        ArticleTarget::Number(_) => NntpError::Lookup(LookupFailure::NoSuchArticleNumber),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_message_id_and_number_targets() {
        assert_eq!(
            parse_article_target("<a@h>").unwrap(),
            ArticleTarget::MessageId(MessageId::new("<a@h>").unwrap())
        );
        assert_eq!(parse_article_target("42").unwrap(), ArticleTarget::Number(42));
    }

    #[test]
    fn rejects_garbage_target() {
        assert!(parse_article_target("not-valid").is_err());
    }

    #[test]
    fn arity_helpers_reject_wrong_counts() {
        let cmd = Command {
            verb: "GROUP".to_string(),
            args: vec!["a".to_string(), "b".to_string()],
        };
        assert!(require_arity(&cmd, 1).is_err());
        assert!(require_max_arity(&cmd, 1).is_err());
        assert!(require_max_arity(&cmd, 2).is_ok());
    }
}
