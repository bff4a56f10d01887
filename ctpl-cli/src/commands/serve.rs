//! Serve command for running the policy API server

use anyhow::{Context, Result};
use clap::Args;
use ctpl_core::{DataStore, LibsqlStore, MemoryStore};
use ctpl_server::{AppState, CtplServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{ConfigLoader, DatabaseConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Local database file (overrides config)
    #[arg(long, conflicts_with = "memory")]
    pub database: Option<PathBuf>,

    /// Keep policies in memory only
    #[arg(long)]
    pub memory: bool,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.database {
        config.database.url = None;
        config.database.path = path;
    }

    let store = if args.memory {
        info!("Using in-memory policy store");
        Arc::new(MemoryStore::new()) as Arc<dyn DataStore>
    } else {
        open_store(&config.database).await?
    };

    let server_config = config.server_config();
    info!("Starting ctpl server on {}", server_config.addr());

    let state = Arc::new(AppState::new(store));
    CtplServer::new(server_config, state).run().await?;

    Ok(())
}

async fn open_store(database: &DatabaseConfig) -> Result<Arc<dyn DataStore>> {
    let store = match &database.url {
        Some(url) => {
            info!(url = %url, "Connecting to remote policy store");
            let token = database.auth_token.clone().unwrap_or_default();
            LibsqlStore::new_remote(url, &token)
                .await
                .with_context(|| format!("Failed to connect to {}", url))?
        }
        None => {
            info!(path = %database.path.display(), "Opening local policy store");
            LibsqlStore::new_local(&database.path)
                .await
                .with_context(|| format!("Failed to open {}", database.path.display()))?
        }
    };
    Ok(Arc::new(store))
}
