use super::types::{
    CtplConfig, DEFAULT_DATABASE_PATH, DatabaseConfig, RawAuthConfig, RawCtplConfig,
    RawDatabaseConfig, RawServerConfig, ServerSection,
};
use anyhow::{Context, Result};
use ctpl_core::AuthConfig;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<CtplConfig> {
        Self::load_from(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Load and merge the given config files; missing files are skipped
    pub fn load_from(user_path: Option<&Path>, project_path: &Path) -> Result<CtplConfig> {
        let mut raw = RawCtplConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ctpl").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with CTPL_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("CTPL_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".ctpl/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawCtplConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawCtplConfig, overlay: RawCtplConfig) -> RawCtplConfig {
        RawCtplConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                mount_path: overlay.server.mount_path.or(base.server.mount_path),
                cors: overlay.server.cors.or(base.server.cors),
            },
            database: RawDatabaseConfig {
                url: overlay.database.url.or(base.database.url),
                auth_token: overlay.database.auth_token.or(base.database.auth_token),
                path: overlay.database.path.or(base.database.path),
            },
            auth: RawAuthConfig {
                enabled: overlay.auth.enabled.or(base.auth.enabled),
                jwt_secret: overlay.auth.jwt_secret.or(base.auth.jwt_secret),
                audience: overlay.auth.audience.or(base.auth.audience),
                bypass_localhost: overlay.auth.bypass_localhost.or(base.auth.bypass_localhost),
                clock_skew_seconds: overlay
                    .auth
                    .clock_skew_seconds
                    .or(base.auth.clock_skew_seconds),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawCtplConfig) -> CtplConfig {
        let server = ServerSection::default();
        let auth = AuthConfig::default();

        CtplConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or(server.host),
                port: raw.server.port.unwrap_or(server.port),
                mount_path: raw.server.mount_path.unwrap_or(server.mount_path),
                cors: raw.server.cors.unwrap_or(server.cors),
            },
            database: DatabaseConfig {
                url: raw.database.url,
                auth_token: raw.database.auth_token,
                path: raw
                    .database
                    .path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            },
            auth: AuthConfig {
                enabled: raw.auth.enabled.unwrap_or(auth.enabled),
                jwt_secret: raw.auth.jwt_secret.unwrap_or(auth.jwt_secret),
                audience: raw.auth.audience,
                bypass_localhost: raw.auth.bypass_localhost.unwrap_or(auth.bypass_localhost),
                clock_skew_seconds: raw
                    .auth
                    .clock_skew_seconds
                    .unwrap_or(auth.clock_skew_seconds),
            },
        }
    }
}
