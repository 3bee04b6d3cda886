//! Stateless informational commands: `CAPABILITIES`, `MODE READER`,
//! `QUIT`, `DATE`, `HELP`.

use chrono::Utc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec::Command;
use crate::domain::PostingMode;
use crate::error::NntpError;
use crate::responses;
use crate::session::Session;

use super::utils::{self, Disposition};

/// # Errors
/// Returns `NntpError::Protocol` if arguments were given.
pub async fn capabilities<W>(
    cmd: &Command,
    session: &Session,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_arity(cmd, 0)?;
    let mut lines = vec!["VERSION 2".to_string(), "READER".to_string(), "IHAVE".to_string()];
    lines.extend(session.negotiated_caps.iter().map(str::to_string));
    utils::respond_multiline(writer, responses::CAPABILITIES_LIST, "Capability list:", &lines).await?;
    Ok(Disposition::Continue)
}

/// # Errors
/// Returns `NntpError::Protocol` if the mode argument is not `READER`.
pub async fn mode_reader<W>(
    cmd: &Command,
    session: &Session,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_arity(cmd, 1)?;
    if !cmd.args[0].eq_ignore_ascii_case("reader") {
        return Err(NntpError::Protocol(format!("unknown MODE argument {:?}", cmd.args[0])));
    }
    let (code, text) = match session.posting_mode {
        PostingMode::Allowed | PostingMode::Moderated => {
            (responses::POSTING_ALLOWED, "posting allowed")
        }
        PostingMode::Prohibited => (responses::POSTING_PROHIBITED, "reading only"),
    };
    utils::respond(writer, code, text).await?;
    Ok(Disposition::Continue)
}

/// # Errors
/// Propagates transport failures from `respond`.
pub async fn quit<W>(writer: &mut W) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::respond(writer, responses::CLOSING_CONNECTION, "closing connection").await?;
    Ok(Disposition::Terminate)
}

/// # Errors
/// Returns `NntpError::Protocol` if arguments were given.
pub async fn date<W>(cmd: &Command, writer: &mut W) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    utils::require_arity(cmd, 0)?;
    let stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    utils::respond(writer, responses::SERVER_DATE, &stamp).await?;
    Ok(Disposition::Continue)
}

/// # Errors
/// Propagates transport failures from `respond_multiline`.
pub async fn help<W>(writer: &mut W) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    let lines = vec![
        "CAPABILITIES".to_string(),
        "MODE READER".to_string(),
        "QUIT".to_string(),
        "DATE".to_string(),
        "GROUP".to_string(),
        "LISTGROUP".to_string(),
        "LIST".to_string(),
        "NEWGROUPS".to_string(),
        "NEWNEWS".to_string(),
        "ARTICLE".to_string(),
        "HEAD".to_string(),
        "BODY".to_string(),
        "STAT".to_string(),
        "NEXT".to_string(),
        "LAST".to_string(),
        "POST".to_string(),
        "IHAVE".to_string(),
        "AUTHINFO".to_string(),
    ];
    utils::respond_multiline(writer, responses::HELP_TEXT, "Legal commands", &lines).await?;
    Ok(Disposition::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(verb: &str, args: &[&str]) -> Command {
        Command {
            verb: verb.to_string(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn mode_reader_reports_posting_allowed() {
        let session = Session::new(PostingMode::Allowed);
        let mut buf = Vec::new();
        mode_reader(&cmd("MODE", &["READER"]), &session, &mut buf)
            .await
            .unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("200"));
    }

    #[tokio::test]
    async fn mode_reader_reports_reading_only_when_prohibited() {
        let session = Session::new(PostingMode::Prohibited);
        let mut buf = Vec::new();
        mode_reader(&cmd("MODE", &["READER"]), &session, &mut buf)
            .await
            .unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("201"));
    }

    #[tokio::test]
    async fn quit_terminates_the_session() {
        let mut buf = Vec::new();
        let disposition = quit(&mut buf).await.unwrap();
        assert_eq!(disposition, Disposition::Terminate);
        assert!(String::from_utf8(buf).unwrap().starts_with("205"));
    }

    #[tokio::test]
    async fn date_matches_fourteen_digit_utc_stamp() {
        let mut buf = Vec::new();
        date(&cmd("DATE", &[]), &mut buf).await.unwrap();
        let line = String::from_utf8(buf).unwrap();
        let stamp = line.trim().trim_start_matches("111 ").trim_end();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn date_rejects_extra_arguments() {
        let mut buf = Vec::new();
        assert!(date(&cmd("DATE", &["extra"]), &mut buf).await.is_err());
    }
}
