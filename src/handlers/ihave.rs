//! `IHAVE` transfer state machine: `Idle -> Offered(mid) -> Receiving ->
//! Terminal`.

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::codec::{self, Command};
use crate::domain::{Article, MessageId, NewsgroupName, ProtoArticle};
use crate::error::NntpError;
use crate::responses;

use super::utils::{self, Disposition};
use super::HandlerContext;

fn local_destinations(headers: &crate::domain::ArticleHeaders) -> Vec<NewsgroupName> {
    headers
        .get_all("Newsgroups")
        .iter()
        .flat_map(|v| v.split(','))
        .filter_map(|tok| NewsgroupName::new(tok.trim()).ok())
        .filter(|g| !g.is_local_only())
        .collect()
}

/// # Errors
/// `501` on wrong arity or malformed message-id; transport errors from the
/// reader propagate and terminate the session per the transfer-failure
/// rule.
pub async fn ihave<R, W>(
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    reader: &mut R,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    utils::require_arity(cmd, 1)?;
    let mid = MessageId::new(&cmd.args[0])
        .map_err(|e| NntpError::Protocol(format!("invalid message-id argument: {e}")))?;

    let known = ctx
        .persistence
        .has_article(mid.as_str())
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))?;
    if known {
        utils::respond(writer, responses::NOT_WANTED, "already have it, do not send it").await?;
        return Ok(Disposition::Continue);
    }

    utils::respond(writer, responses::SEND_ARTICLE_FOR_IHAVE, "send article").await?;
    let lines = codec::read_dot_terminated(reader)
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))?;

    match accept_transfer(ctx, &mid, lines).await {
        Ok(()) => {
            utils::respond(writer, responses::TRANSFERRED_OK, "article transferred ok").await?;
        }
        Err(TransferOutcome::Reject) => {
            let _ = ctx.persistence.reject_article(mid.as_str()).await;
            utils::respond(writer, responses::TRANSFER_REJECTED, "transfer rejected, do not retry")
                .await?;
        }
        Err(TransferOutcome::Retry) => {
            utils::respond(writer, responses::TRANSFER_RETRY, "transfer failed, try again later")
                .await?;
        }
    }
    Ok(Disposition::Continue)
}

enum TransferOutcome {
    Reject,
    Retry,
}

async fn accept_transfer(
    ctx: &HandlerContext<'_>,
    expected_mid: &MessageId,
    lines: Vec<String>,
) -> Result<(), TransferOutcome> {
    let proto = ProtoArticle::from_lines(&lines).map_err(|_| TransferOutcome::Reject)?;
    let article = Article::from_proto(proto).map_err(|_| TransferOutcome::Reject)?;
    if article.message_id != *expected_mid {
        return Err(TransferOutcome::Reject);
    }

    let allowed = ctx
        .policy
        .is_ihave_transfer_allowed(None)
        .await
        .map_err(|_| TransferOutcome::Retry)?;
    if !allowed {
        return Err(TransferOutcome::Reject);
    }

    let destinations = local_destinations(&article.headers);
    let mut stored = false;
    for (i, group) in destinations.iter().enumerate() {
        let accepted = ctx
            .policy
            .is_article_allowed(
                article.message_id.as_str(),
                &article.headers,
                &article.body,
                group,
                crate::domain::PostingMode::Allowed,
                None,
            )
            .await
            .map_err(|_| TransferOutcome::Retry)?;
        if !accepted {
            continue;
        }
        if !stored {
            ctx.persistence
                .add_article(
                    group,
                    article.message_id.as_str(),
                    article.headers.clone(),
                    article.body.clone(),
                    accepted,
                )
                .await
                .map_err(|_| TransferOutcome::Retry)?;
            stored = true;
        } else {
            ctx.persistence
                .include_article(group, article.message_id.as_str())
                .await
                .map_err(|_| TransferOutcome::Retry)?;
        }
        let _ = i;
    }

    if stored {
        Ok(())
    } else {
        Err(TransferOutcome::Reject)
    }
}
