//! `AUTHINFO USER`/`AUTHINFO PASS` — the ambient supplement described in
//! `SPEC_FULL.md` §4.4, required because `Session.auth_token` and
//! `IdentityService::authenticate` presuppose a command surface to
//! acquire a token.

use tokio::io::AsyncWrite;

use crate::codec::Command;
use crate::error::NntpError;
use crate::responses;
use crate::session::Session;

use super::utils::{self, Disposition};
use super::HandlerContext;

/// # Errors
/// `501` on wrong arity; `482` if `PASS` arrives with no prior `USER`.
pub async fn authinfo<W>(
    cmd: &Command,
    ctx: &HandlerContext<'_>,
    session: &mut Session,
    writer: &mut W,
) -> Result<Disposition, NntpError>
where
    W: AsyncWrite + Unpin,
{
    if cmd.args.len() != 2 {
        return Err(NntpError::Protocol("AUTHINFO requires a sub-keyword and value".to_string()));
    }
    let sub_keyword = cmd.args[0].to_ascii_uppercase();
    let value = cmd.args[1].clone();

    match sub_keyword.as_str() {
        "USER" => {
            session.pending_username = Some(value);
            utils::respond(writer, responses::AUTH_CONTINUE, "password required").await?;
        }
        "PASS" => {
            let Some(username) = session.pending_username.take() else {
                utils::respond(writer, responses::AUTH_COMMAND_ORDER, "AUTHINFO USER first").await?;
                return Ok(Disposition::Continue);
            };
            let token = ctx
                .identity
                .authenticate(&username, &value)
                .await
                .map_err(|e| NntpError::Transport(e.to_string()))?;
            match token {
                Some(token) => {
                    session.auth_token = Some(token);
                    utils::respond(writer, responses::AUTH_ACCEPTED, "authentication accepted").await?;
                }
                None => {
                    utils::respond(writer, responses::AUTH_REJECTED, "authentication failed").await?;
                }
            }
        }
        other => {
            return Err(NntpError::Protocol(format!("unrecognized AUTHINFO sub-keyword {other:?}")));
        }
    }
    Ok(Disposition::Continue)
}
