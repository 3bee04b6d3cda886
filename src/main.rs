use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use nntp_node::config::Config;
use nntp_node::server;

/// Demo NNTP node binary: serves the Protocol Engine against an in-memory
/// reference Persistence/Identity/Policy implementation. Not a production
/// deployment — a real one supplies its own capability backends.
#[derive(Parser)]
struct Args {
    /// Listen port, overriding the configuration file's `port`.
    port: Option<u16>,
    /// Path to the configuration file.
    #[arg(long, env = "NNTP_NODE_CONFIG", default_value = "/etc/nntp-node.toml")]
    config: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = if std::path::Path::new(&args.config).exists() {
        match Config::from_file(&args.config) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        tracing::warn!(path = %args.config, "no configuration file found, using defaults");
        Config::default()
    };
    if let Some(port) = args.port {
        cfg.port = port;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let persistence: Arc<dyn nntp_node::capabilities::PersistenceService> =
            Arc::new(nntp_node::reference::InMemoryPersistence::new());
        let identity: Arc<dyn nntp_node::capabilities::IdentityService> =
            Arc::new(nntp_node::reference::InMemoryIdentity::new(cfg.site_name.clone()));
        let policy: Arc<dyn nntp_node::capabilities::PolicyService> =
            Arc::new(nntp_node::reference::InMemoryPolicy::allow_all());

        if let Err(e) = server::serve(cfg, persistence, identity, policy).await {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        Ok(())
    })
}
