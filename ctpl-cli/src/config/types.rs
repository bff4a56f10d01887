use ctpl_core::AuthConfig;
use ctpl_server::{DEFAULT_HOST, DEFAULT_MOUNT_PATH, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default local database file
pub const DEFAULT_DATABASE_PATH: &str = "ctpl.db";

/// Placeholder shown instead of secrets
const REDACTED: &str = "********";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCtplConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub database: RawDatabaseConfig,

    #[serde(default)]
    pub auth: RawAuthConfig,
}

/// Server config as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub mount_path: Option<String>,
    pub cors: Option<bool>,
}

/// Database config as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDatabaseConfig {
    pub url: Option<String>,
    pub auth_token: Option<String>,
    pub path: Option<PathBuf>,
}

/// Auth config as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAuthConfig {
    pub enabled: Option<bool>,
    pub jwt_secret: Option<String>,
    pub audience: Option<String>,
    pub bypass_localhost: Option<bool>,
    pub clock_skew_seconds: Option<u64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CtplConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Host address to bind to
    pub host: String,

    /// Port for the ctpl server
    pub port: u16,

    /// Path the policy routes are nested under
    pub mount_path: String,

    /// Answer cross-origin requests
    pub cors: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            cors: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Remote libSQL/Turso URL; when unset the local file is used
    pub url: Option<String>,

    /// Token for the remote database
    pub auth_token: Option<String>,

    /// Local database file
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            auth_token: None,
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl CtplConfig {
    /// Server settings for [`ctpl_server::CtplServer`]
    pub fn server_config(&self) -> ctpl_server::ServerConfig {
        ctpl_server::ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            mount_path: self.server.mount_path.clone(),
            cors: self.server.cors,
            auth: self.auth.clone(),
        }
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.auth.jwt_secret.is_empty() {
            config.auth.jwt_secret = REDACTED.to_string();
        }
        if config.database.auth_token.is_some() {
            config.database.auth_token = Some(REDACTED.to_string());
        }
        config
    }
}
