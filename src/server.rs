//! TCP accept loop: binds the listen port and drives one `run_session` per
//! accepted connection, each spawned onto its own task.

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::capabilities::{IdentityService, PersistenceService, PolicyService};
use crate::config::Config;
use crate::domain::PostingMode;
use crate::handlers::HandlerContext;
use crate::session::Session;

/// Bind `cfg.port` and serve connections until the process is killed. Each
/// connection is handled on its own task against the given capability
/// implementations, shared via `Arc`.
///
/// # Errors
/// Returns an error if the listen port cannot be bound.
pub async fn serve(
    cfg: Config,
    persistence: Arc<dyn PersistenceService>,
    identity: Arc<dyn IdentityService>,
    policy: Arc<dyn PolicyService>,
) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    loop {
        let (socket, peer_addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "failed to accept connection");
                continue;
            }
        };
        info!(%peer_addr, "accepted connection");

        let persistence = persistence.clone();
        let identity = identity.clone();
        let policy = policy.clone();
        let idle_timeout = cfg.idle_timeout_secs;

        tokio::spawn(async move {
            if let Err(e) =
                handle_connection(socket, persistence, identity, policy, idle_timeout).await
            {
                error!(%peer_addr, error = %e, "connection ended with an error");
            }
        });
    }
}

async fn handle_connection(
    socket: tokio::net::TcpStream,
    persistence: Arc<dyn PersistenceService>,
    identity: Arc<dyn IdentityService>,
    policy: Arc<dyn PolicyService>,
    idle_timeout_secs: u64,
) -> anyhow::Result<()> {
    let (read_half, mut write_half) = tokio::io::split(socket);
    let mut reader = BufReader::new(read_half);
    let ctx = HandlerContext::new(persistence.as_ref(), identity.as_ref(), policy.as_ref());
    let mut session = Session::new(PostingMode::Allowed);

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(idle_timeout_secs),
        crate::engine::run_session(&mut reader, &mut write_half, &mut session, &ctx),
    )
    .await;

    match outcome {
        Ok(result) => result.map_err(|e| anyhow::anyhow!(e)),
        Err(_) => {
            info!("connection idle timeout, closing");
            Ok(())
        }
    }
}
