//! Policy operation errors

use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by [`PolicyService`](super::PolicyService) operations
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The request was rejected before touching the store
    #[error("{0}")]
    Validation(String),

    /// No row matched the operation's filter
    #[error("{0}")]
    NotFound(String),

    /// The store reported a failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PolicyError {
    pub(crate) fn not_found() -> Self {
        PolicyError::NotFound("Policy not found".to_string())
    }
}
