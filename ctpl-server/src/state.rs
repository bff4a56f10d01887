//! Shared application state for the ctpl server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ctpl_core::{DataStore, MemoryStore, PolicyService};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Policy operations over the configured store
    pub policies: PolicyService,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create AppState over the given store
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            policies: PolicyService::new(store),
            started_at: Utc::now(),
        }
    }

    /// Create AppState backed by an empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
