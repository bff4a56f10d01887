//! Configuration for bearer token authentication

use serde::{Deserialize, Serialize};

/// Configuration for bearer token authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether authentication is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Shared HS256 secret used to sign access tokens
    #[serde(default)]
    pub jwt_secret: String,

    /// Expected audience claim, if tokens carry one
    #[serde(default)]
    pub audience: Option<String>,

    /// Whether to bypass authentication for localhost requests
    #[serde(default = "default_bypass_localhost")]
    pub bypass_localhost: bool,

    /// Clock skew leeway in seconds for token expiry validation
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: u64,
}

fn default_bypass_localhost() -> bool {
    true
}

fn default_clock_skew() -> u64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            jwt_secret: String::new(),
            audience: None,
            bypass_localhost: default_bypass_localhost(),
            clock_skew_seconds: default_clock_skew(),
        }
    }
}

impl AuthConfig {
    /// Create an enabled AuthConfig with the given signing secret
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            enabled: true,
            jwt_secret: jwt_secret.into(),
            ..Self::default()
        }
    }

    /// Require tokens to carry this audience
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set whether loopback peers skip validation
    pub fn with_bypass_localhost(mut self, bypass: bool) -> Self {
        self.bypass_localhost = bypass;
        self
    }

    /// Check if the config is valid (has a secret when enabled)
    pub fn is_valid(&self) -> bool {
        if !self.enabled {
            return true;
        }
        !self.jwt_secret.is_empty()
    }
}
