//! Server error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ctpl_core::{AuthError, PolicyError, StoreError};
use thiserror::Error;

use crate::http::ApiResponse;

/// Errors that can occur running the ctpl server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server configuration cannot be used
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

/// A failed API request, rendered as an error envelope
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected input (400)
    #[error("{0}")]
    BadRequest(String),

    /// No matching policy (404)
    #[error("{0}")]
    NotFound(String),

    /// Authentication failed (401)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The store failed while performing `context` (500)
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Map a policy operation failure, naming the operation for store errors
    pub fn from_policy(err: PolicyError, context: &'static str) -> Self {
        match err {
            PolicyError::Validation(message) => ApiError::BadRequest(message),
            PolicyError::NotFound(message) => ApiError::NotFound(message),
            PolicyError::Store(source) => ApiError::Store { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::BadRequest(message) | ApiError::NotFound(message) => {
                tracing::warn!(%status, "{}", message);
                ApiResponse::<()>::failure(message.clone(), None)
            }
            ApiError::Unauthorized(reason) => {
                tracing::warn!(%status, "request rejected: {}", reason);
                ApiResponse::<()>::failure("Unauthorized", Some(reason.clone()))
            }
            ApiError::Store { context, source } => {
                tracing::error!(%status, "{}: {}", context, source);
                ApiResponse::<()>::failure(*context, Some(source.to_string()))
            }
        };

        (status, Json(body)).into_response()
    }
}
