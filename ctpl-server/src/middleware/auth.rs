//! Authentication middleware for axum

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use ctpl_core::{AuthConfig, AuthContext, AuthError, JwtValidator};

use crate::ApiError;

/// Authentication layer state
#[derive(Clone)]
pub struct AuthLayer {
    validator: Option<Arc<JwtValidator>>,
    config: AuthConfig,
}

impl AuthLayer {
    /// Create a new AuthLayer with the given configuration
    pub fn new(config: AuthConfig) -> Self {
        let validator = if config.enabled && config.is_valid() {
            Some(Arc::new(JwtValidator::new(&config)))
        } else {
            None
        };

        Self { validator, config }
    }

    /// Create a disabled AuthLayer (for testing or when auth is not configured)
    pub fn disabled() -> Self {
        Self::new(AuthConfig::default())
    }
}

/// Check if the request is from localhost
fn is_localhost(addr: &SocketAddr) -> bool {
    addr.ip().is_loopback()
}

/// Extract the bearer token from the Authorization header
fn extract_bearer(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication middleware function
///
/// Runs before every policy handler. A rejected request never reaches the
/// handler, so the store is not touched.
pub async fn auth_middleware(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    axum::Extension(auth_layer): axum::Extension<AuthLayer>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let from_localhost = connect_info
        .map(|ConnectInfo(addr)| is_localhost(&addr))
        .unwrap_or(false);

    let auth_context = if !auth_layer.config.enabled {
        // Auth not enabled, treat as local
        AuthContext::Local
    } else if auth_layer.config.bypass_localhost && from_localhost {
        AuthContext::Local
    } else {
        let Some(validator) = &auth_layer.validator else {
            return Err(ApiError::Unauthorized(
                "authentication is enabled but no signing secret is configured".to_string(),
            ));
        };
        let token = extract_bearer(&request).ok_or(AuthError::MissingToken)?;
        let identity = validator.validate(token)?;
        tracing::debug!(subject = %identity.subject, "request authenticated");
        AuthContext::Authenticated { identity }
    };

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}
