//! `POST` transfer state machine: symmetric to `IHAVE`, with Identity
//! synthesizing `Message-ID`, `Path`, and `Date` when the client omits
//! them.

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::codec;
use crate::domain::{Article, NewsgroupName, ProtoArticle};
use crate::error::{NntpError, PolicyRejection};
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
/// `440` if posting is not permitted; `441` on malformed article or if no
/// destination newsgroup is admissible; transport errors from the reader.
pub async fn post<R, W>(
    cmd: &crate::codec::Command,
    ctx: &HandlerContext<'_>,
    reader: &mut R,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    utils::require_arity(cmd, 0)?;

    let allowed = ctx
        .policy
        .is_posting_allowed(None)
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))?;
    if !allowed {
        return Err(NntpError::PolicyRejected(PolicyRejection::PostingNotPermitted));
    }

    utils::respond(writer, responses::SEND_ARTICLE_FOR_POST, "send article").await?;
    let lines = codec::read_dot_terminated(reader)
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))?;

    let result = finish_post(ctx, lines).await;
    match result {
        Ok(()) => {
            utils::respond(writer, responses::POSTED_OK, "article posted").await?;
            Ok(Disposition::Continue)
        }
        Err(_) => {
            utils::respond(writer, responses::POSTING_FAILED, "posting failed").await?;
            Ok(Disposition::Continue)
        }
    }
}

async fn finish_post(ctx: &HandlerContext<'_>, lines: Vec<String>) -> Result<(), NntpError> {
    let mut proto = ProtoArticle::from_lines(&lines)
        .map_err(|e| NntpError::Validation(e.to_string()))?;

    if !proto.headers.contains("Message-ID") {
        let mid = ctx
            .identity
            .create_message_id(&proto.headers)
            .await
            .map_err(|e| NntpError::Transport(e.to_string()))?;
        proto.headers.insert("Message-ID", mid.into_inner());
    }
    if !proto.headers.contains("Path") {
        proto.headers.insert("Path", ctx.identity.host_identifier());
    } else {
        let existing = proto.headers.get("Path").unwrap_or_default().to_string();
        proto.headers.insert("Path", format!("{}!{existing}", ctx.identity.host_identifier()));
    }
    if !proto.headers.contains("Date") {
        proto
            .headers
            .insert("Date", chrono::Utc::now().format("%d %b %Y %H:%M:%S +0000").to_string());
    }

    let article = Article::from_proto(proto).map_err(|e| NntpError::Validation(e.to_string()))?;
    let destinations = local_destinations(&article.headers);
    if destinations.is_empty() {
        return Err(NntpError::PolicyRejected(PolicyRejection::PostingFailed));
    }

    let mut stored = false;
    for group in &destinations {
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
            .map_err(|e| NntpError::Transport(e.to_string()))?;
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
                    true,
                )
                .await
                .map_err(|e| NntpError::Transport(e.to_string()))?;
            stored = true;
        } else {
            ctx.persistence
                .include_article(group, article.message_id.as_str())
                .await
                .map_err(|e| NntpError::Transport(e.to_string()))?;
        }
    }

    Ok(())
}
