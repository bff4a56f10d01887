//! HS256 bearer token validation

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use super::{AuthConfig, AuthError, Identity};

/// Claims read from an access token
#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// JWT validator for tokens signed with a shared secret
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new JwtValidator with the given configuration
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.clock_skew_seconds;
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate a JWT token and return the identity
    pub fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        let token_data = decode::<AccessClaims>(token, &self.key, &self.validation)?;
        let claims = token_data.claims;

        let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
        let mut identity = Identity::new(claims.sub, expires_at);

        if let Some(email) = claims.email {
            identity = identity.with_email(email);
        }
        if let Some(role) = claims.role {
            identity = identity.with_role(role);
        }

        Ok(identity)
    }
}
