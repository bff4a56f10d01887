//! ctpl-server - HTTP server for the ctpl policy records API
//!
//! This crate provides the axum router, the auth gate and the server
//! lifecycle around [`ctpl_core::PolicyService`]. Each request is handled
//! independently; the only shared resource is the store handle inside
//! [`AppState`].

mod error;
pub mod http;
pub mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use ctpl_core::AuthConfig;
use tokio::net::TcpListener;

pub use error::{ApiError, ServerError};
pub use http::{ApiResponse, create_router};
pub use middleware::{AuthLayer, auth_middleware};
pub use state::AppState;

/// Default port for the ctpl server
pub const DEFAULT_PORT: u16 = 7450;
/// Default host for the ctpl server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default mount point for the policy routes
pub const DEFAULT_MOUNT_PATH: &str = "/api/policies";

/// The main ctpl server
pub struct CtplServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl CtplServer {
    /// Create a server over the given state
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        self.run_with_listener(listener).await
    }

    /// Run the server on an already bound listener until Ctrl+C
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        self.config.validate()?;

        if let Ok(local) = listener.local_addr() {
            tracing::info!(
                "ctpl server listening on {} (policies at {})",
                local,
                self.config.mount_path
            );
        }
        if !self.config.auth.enabled {
            tracing::warn!("authentication is disabled; every request is treated as local");
        }

        let router = create_router(self.state, &self.config);
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!("ctpl server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path the policy routes are nested under
    pub mount_path: String,
    /// Answer cross-origin requests permissively
    pub cors: bool,
    /// Request authentication
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            cors: true,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Returns the socket address string (e.g., "127.0.0.1:7450")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ServerError> {
        if !self.auth.is_valid() {
            return Err(ServerError::Config(
                "auth is enabled but auth.jwt_secret is empty".to_string(),
            ));
        }
        if !self.mount_path.starts_with('/') {
            return Err(ServerError::Config(format!(
                "mount path must start with '/': {}",
                self.mount_path
            )));
        }
        Ok(())
    }
}
