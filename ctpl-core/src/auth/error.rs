//! Authentication error types

use thiserror::Error;

/// Errors that can occur during authentication
#[derive(Debug, Error)]
pub enum AuthError {
    /// No authentication token was provided in the request
    #[error("no authentication token provided")]
    MissingToken,

    /// The token format is invalid (not a valid JWT)
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// The token signature verification failed
    #[error("token signature verification failed")]
    InvalidSignature,

    /// The token has expired
    #[error("token has expired")]
    Expired,

    /// The token's audience claim doesn't match the expected value
    #[error("invalid audience claim")]
    InvalidAudience,

    /// Any other JWT decoding error from the jsonwebtoken crate
    #[error("JWT error: {0}")]
    JwtError(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                AuthError::InvalidFormat(err.to_string())
            }
            _ => AuthError::JwtError(err),
        }
    }
}
