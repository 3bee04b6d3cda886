//! The Protocol Engine: startup greeting, read-dispatch loop, and command
//! dispatch over the handler modules. Drives one `Session` from accept
//! until `QUIT` or stream EOF.

use tracing::{debug, info, instrument, warn};

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::codec::{self, Command};
use crate::error::NntpError;
use crate::handlers::{article, auth, group, ihave, info as info_handler, post, utils::Disposition,
    HandlerContext};
use crate::responses;
use crate::session::Session;

/// Drive one connection end to end: send the greeting, then loop reading
/// and dispatching commands until `QUIT` or EOF.
///
/// # Errors
/// Propagates transport failures; any other condition is handled inline
/// and does not terminate the loop.
#[instrument(skip_all)]
pub async fn run_session<R, W>(
    reader: &mut R,
    writer: &mut W,
    session: &mut Session,
    ctx: &HandlerContext<'_>,
) -> Result<(), NntpError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (code, text) = match session.posting_mode {
        crate::domain::PostingMode::Allowed | crate::domain::PostingMode::Moderated => {
            (responses::POSTING_ALLOWED, "service available, posting allowed")
        }
        crate::domain::PostingMode::Prohibited => {
            (responses::POSTING_PROHIBITED, "service available, posting prohibited")
        }
    };
    utils_respond(writer, code, text).await?;
    info!("session started");

    loop {
        let line = match codec::read_line(reader).await {
            Ok(line) => line,
            Err(codec::FramingError::UnexpectedEof) => {
                debug!("connection closed by peer");
                return Ok(());
            }
            Err(e) => return Err(NntpError::Transport(e.to_string())),
        };

        let cmd = match codec::parse_command(&line) {
            Ok(cmd) => cmd,
            Err(codec::ParseError::Empty) => continue,
            Err(_) => {
                utils_respond(writer, responses::COMMAND_NOT_RECOGNIZED, "command not recognized")
                    .await?;
                continue;
            }
        };

        match dispatch(&cmd, ctx, session, reader, writer).await {
            Ok(Disposition::Continue) => {}
            Ok(Disposition::Terminate) => {
                info!("session terminated by QUIT");
                return Ok(());
            }
            Err(NntpError::Transport(detail)) => {
                warn!(detail, "transport failure, terminating session");
                return Err(NntpError::Transport(detail));
            }
            Err(err) => {
                utils_respond(writer, err.response_code(), err.client_text()).await?;
            }
        }
    }
}

async fn utils_respond<W>(writer: &mut W, code: u16, text: &str) -> Result<(), NntpError>
where
    W: AsyncWrite + Unpin,
{
    codec::write_line(writer, &format!("{code} {text}"))
        .await
        .map_err(|e| NntpError::Transport(e.to_string()))
}

async fn dispatch<R, W>(
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    session: &mut Session,
    reader: &mut R,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match cmd.verb.as_str() {
        "CAPABILITIES" => info_handler::capabilities(cmd, session, writer).await,
        "MODE" => info_handler::mode_reader(cmd, session, writer).await,
        "QUIT" => info_handler::quit(writer).await,
        "DATE" => info_handler::date(cmd, writer).await,
        "HELP" => info_handler::help(writer).await,
        "GROUP" => group::group(cmd, ctx, session, writer).await,
        "LISTGROUP" => group::listgroup(cmd, ctx, session, writer).await,
        "LIST" => group::list(cmd, ctx, writer).await,
        "NEWGROUPS" => group::newgroups(cmd, ctx, writer).await,
        "NEWNEWS" => group::newnews(cmd, ctx, writer).await,
        "ARTICLE" => article::retrieve(article::Kind::Article, cmd, ctx, session, writer).await,
        "HEAD" => article::retrieve(article::Kind::Head, cmd, ctx, session, writer).await,
        "BODY" => article::retrieve(article::Kind::Body, cmd, ctx, session, writer).await,
        "STAT" => article::retrieve(article::Kind::Stat, cmd, ctx, session, writer).await,
        "NEXT" => group::step(true, ctx, session, writer).await,
        "LAST" => group::step(false, ctx, session, writer).await,
        "POST" => post::post(cmd, ctx, reader, writer).await,
        "IHAVE" => ihave::ihave(cmd, ctx, reader, writer).await,
        "AUTHINFO" => auth::authinfo(cmd, ctx, session, writer).await,
        other => Err(NntpError::UnrecognizedCommand(format!("unrecognized command {other:?}"))),
    }
}
