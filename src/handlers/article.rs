//! Article retrieval commands: `ARTICLE`, `HEAD`, `BODY`, `STAT`.

use tokio::io::AsyncWrite;

use crate::capabilities::persistence::ArticleLocator;
use crate::codec::Command;
use crate::domain::Article;
use crate::error::{LookupFailure, NntpError, StatePrecondition};
use crate::responses;
use crate::session::Session;

use super::utils::{self, ArticleTarget, Disposition};
use super::HandlerContext;

/// Which payload (if any) this command emits alongside the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Article,
    Head,
    Body,
    Stat,
}

impl Kind {
    fn success_code(self) -> u16 {
        match self {
            Self::Article => responses::ARTICLE_FOLLOWS,
            Self::Head => responses::HEAD_FOLLOWS,
            Self::Body => responses::BODY_FOLLOWS,
            Self::Stat => responses::ARTICLE_SELECTED,
        }
    }

    fn payload(self, article: &Article) -> Option<Vec<String>> {
        match self {
            Self::Stat => None,
            Self::Head => Some(
                article
                    .headers
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect(),
            ),
            Self::Body => Some(article.body.clone()),
            Self::Article => {
                let mut lines: Vec<String> = article
                    .headers
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect();
                lines.push(String::new());
                lines.extend(article.body.clone());
                Some(lines)
            }
        }
    }
}

async fn resolve(
    target: Option<ArticleTarget>,
    ctx: &HandlerContext<'_>,
    session: &mut Session,
) -> Result<(Article, u32), NntpError> {
    match target {
        None => {
            utils::require_group_selected(session)?;
            let selected = session.current_group.as_ref().unwrap();
            let current = selected
                .current_article
                .ok_or(NntpError::StatePrecondition(StatePrecondition::NoCurrentArticle))?;
            let found = ctx
                .persistence
                .get_group_article(&selected.name, ArticleLocator::Number(current))
                .await
                .map_err(|e| NntpError::Transport(e.to_string()))?
                .ok_or(NntpError::Lookup(LookupFailure::NoSuchArticleNumber))?;
            Ok((found.article, found.article_number))
        }
        Some(ArticleTarget::Number(n)) => {
            utils::require_group_selected(session)?;
            let name = session.current_group.as_ref().unwrap().name.clone();
            let found = ctx
                .persistence
                .get_group_article(&name, ArticleLocator::Number(n))
                .await
                .map_err(|e| NntpError::Transport(e.to_string()))?
                .ok_or(NntpError::Lookup(LookupFailure::NoSuchArticleNumber))?;
            session.current_group.as_mut().unwrap().current_article = Some(n);
            Ok((found.article, found.article_number))
        }
        Some(ArticleTarget::MessageId(mid)) => {
            let article = ctx
                .persistence
                .get_article(mid.as_str())
                .await
                .map_err(|e| NntpError::Transport(e.to_string()))?
                .ok_or(NntpError::Lookup(LookupFailure::NoSuchArticleId))?;

            // "same by <mid> sets cursor iff the article is present in the
            // current group" -- an out-of-group mid reports number 0.
            let mut number = 0;
            if let Some(selected) = session.current_group.as_ref() {
                let name = selected.name.clone();
                if let Some(found) = ctx
                    .persistence
                    .get_group_article(&name, ArticleLocator::MessageId(mid.into_inner()))
                    .await
                    .map_err(|e| NntpError::Transport(e.to_string()))?
                {
                    number = found.article_number;
                    session.current_group.as_mut().unwrap().current_article = Some(number);
                }
            }
            Ok((article, number))
        }
    }
}

/// # Errors
/// `412`/`420`/`423`/`430`/`501` per the article-target resolution rules.
pub async fn retrieve<W>(
    kind: Kind,
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    session: &mut Session,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_max_arity(cmd, 1)?;
    let target = match cmd.args.first() {
        Some(tok) => Some(utils::parse_article_target(tok)?),
        None => None,
    };
    let (article, number) = resolve(target, ctx, session).await?;

    let text = format!("{number} {}", article.message_id);
    match kind.payload(&article) {
        Some(lines) => utils::respond_multiline(writer, kind.success_code(), &text, &lines).await?,
        None => utils::respond(writer, kind.success_code(), &text).await?,
    }
    Ok(Disposition::Continue)
}
