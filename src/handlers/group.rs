//! Group-selection and listing commands: `GROUP`, `LISTGROUP`, `LIST`,
//! `NEWGROUPS`, `NEWNEWS`.

use chrono::{NaiveDateTime, TimeZone, Utc};
use futures_util::StreamExt;
use tokio::io::AsyncWrite;

use crate::capabilities::persistence::ArticleLocator;
use crate::codec::Command;
use crate::domain::{ArticleRange, NewsgroupName};
use crate::error::{LookupFailure, NntpError};
use crate::session::Session;

use super::utils::{self, Disposition};
use super::HandlerContext;

fn parse_wire_timestamp(date_tok: &str, time_tok: &str) -> Option<chrono::DateTime<Utc>> {
    let fmt = if date_tok.len() == 6 { "%y%m%d%H%M%S" } else { "%Y%m%d%H%M%S" };
    let combined = format!("{date_tok}{time_tok}");
    NaiveDateTime::parse_from_str(&combined, fmt)
        .ok()
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

/// # Errors
/// `501` on wrong arity or malformed/invalid name; `411` if unknown or
/// ignored.
pub async fn group<W>(
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    session: &mut Session,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_arity(cmd, 1)?;
    let name = NewsgroupName::new(&cmd.args[0])
        .map_err(|e| NntpError::Protocol(format!("invalid newsgroup name: {e}")))?;

    let record = ctx
        .persistence
        .get_group_by_name(&name)
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))?;
    let record = match record {
        Some(r) if !r.ignored => r,
        _ => return Err(NntpError::Lookup(LookupFailure::NoSuchGroup)),
    };

    let range = ctx
        .persistence
        .get_current_article_range(&record.name)
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))?;
    session.select_group(record.name.clone(), range);

    utils::respond(
        writer,
        crate::responses::GROUP_SELECTED,
        &format!("{} {} {} {}", range.count(), range.low, range.high, record.name),
    )
    .await?;
    Ok(Disposition::Continue)
}

/// # Errors
/// `412` if no group is selected and none was given; `411` if the named
/// group does not exist.
pub async fn listgroup<W>(
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    session: &mut Session,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_max_arity(cmd, 2)?;

    let (name, range) = if let Some(arg) = cmd.args.first() {
        let name = NewsgroupName::new(arg)
            .map_err(|e| NntpError::Protocol(format!("invalid newsgroup name: {e}")))?;
        let record = ctx
            .persistence
            .get_group_by_name(&name)
            .await
            .map_err(|e| NntpError::Transport(e.to_string()))?
            .filter(|r| !r.ignored)
            .ok_or(NntpError::Lookup(LookupFailure::NoSuchGroup))?;
        let range = ctx
            .persistence
            .get_current_article_range(&record.name)
            .await
            .map_err(|e| NntpError::Transport(e.to_string()))?;
        session.select_group(record.name.clone(), range);
        (record.name, range)
    } else {
        utils::require_group_selected(session)?;
        let selected = session.current_group.as_ref().unwrap();
        (selected.name.clone(), selected.range)
    };

    let numbers: Vec<String> = if range.is_empty() {
        Vec::new()
    } else {
        (range.low..=range.high).map(|n| n.to_string()).collect()
    };
    utils::respond_multiline(
        writer,
        crate::responses::GROUP_SELECTED,
        &format!("{} {} {} {}", range.count(), range.low, range.high, name),
        &numbers,
    )
    .await?;
    Ok(Disposition::Continue)
}

/// # Errors
/// `501` if too many keywords given; `503` for an unrecognized variant.
pub async fn list<W>(
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_max_arity(cmd, 1)?;
    let variant = cmd.args.first().map_or_else(|| "ACTIVE".to_string(), |s| s.to_ascii_uppercase());

    let mut lines = Vec::new();
    let mut groups = ctx.persistence.list_all_groups(false, false);
    match variant.as_str() {
        "ACTIVE" => {
            while let Some(record) = groups.next().await {
                let record = record.map_err(|e| NntpError::Transport(e.to_string()))?;
                let range = ctx
                    .persistence
                    .get_current_article_range(&record.name)
                    .await
                    .map_err(|e| NntpError::Transport(e.to_string()))?;
                lines.push(format!(
                    "{} {} {} {}",
                    record.name,
                    range.high,
                    range.low,
                    record.posting_mode.to_wire()
                ));
            }
        }
        "NEWSGROUPS" => {
            while let Some(record) = groups.next().await {
                let record = record.map_err(|e| NntpError::Transport(e.to_string()))?;
                lines.push(format!("{} {}", record.name, record.description));
            }
        }
        other => {
            return Err(NntpError::CapabilityUnsupported(format!("LIST {other}")));
        }
    }

    utils::respond_multiline(writer, crate::responses::LIST_FOLLOWS, "list follows", &lines).await?;
    Ok(Disposition::Continue)
}

/// # Errors
/// `501` if the timestamp arguments are malformed.
pub async fn newgroups<W>(
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_max_arity(cmd, 3)?;
    if cmd.args.len() < 2 {
        return Err(NntpError::Protocol("NEWGROUPS requires a date and time".to_string()));
    }
    let since = parse_wire_timestamp(&cmd.args[0], &cmd.args[1])
        .ok_or_else(|| NntpError::Protocol(format!("malformed NEWGROUPS timestamp: {cmd:?}")))?;

    let mut lines = Vec::new();
    let mut groups = ctx.persistence.list_all_groups(false, false);
    while let Some(record) = groups.next().await {
        let record = record.map_err(|e| NntpError::Transport(e.to_string()))?;
        if record.created_at >= since.timestamp() {
            let range = ctx
                .persistence
                .get_current_article_range(&record.name)
                .await
                .map_err(|e| NntpError::Transport(e.to_string()))?;
            lines.push(format!(
                "{} {} {} {}",
                record.name,
                range.high,
                range.low,
                record.posting_mode.to_wire()
            ));
        }
    }
    utils::respond_multiline(writer, crate::responses::NEWGROUPS_FOLLOWS, "new groups follow", &lines)
        .await?;
    Ok(Disposition::Continue)
}

/// # Errors
/// `501` if the timestamp arguments are malformed, or the group name is
/// invalid.
pub async fn newnews<W>(
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_max_arity(cmd, 4)?;
    if cmd.args.len() < 3 {
        return Err(NntpError::Protocol("NEWNEWS requires group, date and time".to_string()));
    }
    let name = NewsgroupName::new(&cmd.args[0])
        .map_err(|e| NntpError::Protocol(format!("invalid newsgroup name: {e}")))?;
    let since = parse_wire_timestamp(&cmd.args[1], &cmd.args[2])
        .ok_or_else(|| NntpError::Protocol(format!("malformed NEWNEWS timestamp: {cmd:?}")))?;

    let mut ids = ctx.persistence.get_articles_since(&name, since.timestamp());
    let mut lines = Vec::new();
    while let Some(id) = ids.next().await {
        lines.push(id.map_err(|e| NntpError::Transport(e.to_string()))?);
    }
    utils::respond_multiline(writer, crate::responses::NEWNEWS_FOLLOWS, "new news follows", &lines)
        .await?;
    Ok(Disposition::Continue)
}

/// `NEXT`/`LAST`: move the article-relative cursor by one within the
/// current group's range.
///
/// # Errors
/// `412` no group selected, `420` no current article, `421`/`422` at the
/// respective bound.
pub async fn step<W>(
    forward: bool,
    ctx: &HandlerContext<'_>,
    session: &mut Session,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_group_selected(session)?;
    let selected = session.current_group.as_mut().unwrap();
    let current = selected
        .current_article
        .ok_or(NntpError::StatePrecondition(crate::error::StatePrecondition::NoCurrentArticle))?;

    let next = if forward {
        if current >= selected.range.high {
            return Err(NntpError::StatePrecondition(crate::error::StatePrecondition::NoNextArticle));
        }
        current + 1
    } else {
        if current <= selected.range.low {
            return Err(NntpError::StatePrecondition(crate::error::StatePrecondition::NoPrevArticle));
        }
        current - 1
    };

    let name = selected.name.clone();
    let found = ctx
        .persistence
        .get_group_article(&name, ArticleLocator::Number(next))
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))?
        .ok_or(NntpError::Lookup(LookupFailure::NoSuchArticleNumber))?;

    session.current_group.as_mut().unwrap().current_article = Some(next);
    utils::respond(
        writer,
        crate::responses::ARTICLE_SELECTED,
        &format!("{next} {}", found.article.message_id),
    )
    .await?;
    Ok(Disposition::Continue)
}
