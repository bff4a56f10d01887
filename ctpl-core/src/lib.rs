//! ctpl-core: Core library for the ctpl policy records service
//!
//! This crate provides the domain components behind the HTTP API:
//!
//! - **Policy domain** - [`Policy`], [`PolicyPayload`] and [`PolicyService`] for
//!   create, read, update, soft-delete and restore of insurance policies
//! - **Normalization** - [`policy::validate_date`], [`policy::format_date`] and the
//!   numeric parsers that coerce loosely shaped request bodies
//! - **Premium calculation** - [`PremiumBreakdown`] for the derived monetary fields
//! - **Data store** - the [`DataStore`] trait with [`MemoryStore`] and [`LibsqlStore`]
//! - **Authentication** - [`JwtValidator`] and [`AuthContext`] for the request gate
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ctpl_core::{MemoryStore, PolicyPayload, PolicyService};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = PolicyService::new(Arc::new(MemoryStore::new()));
//!
//!     let payload: PolicyPayload = serde_json::from_value(serde_json::json!({
//!         "assured": "Juan Dela Cruz",
//!         "premium": "1000",
//!     }))?;
//!     let id = service.create(payload).await?;
//!
//!     let policy = service.get(&id.to_string()).await?;
//!     println!("total premium: {}", policy.total_premium);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod policy;
pub mod store;

// Re-export key types for convenience
pub use auth::{AuthConfig, AuthContext, AuthError, Identity, JwtValidator};
pub use policy::{
    DEFAULT_AUTH_FEE, Policy, PolicyError, PolicyFields, PolicyId, PolicyPayload, PolicyService,
    PremiumBreakdown,
};
pub use store::{
    Columns, DataStore, Direction, Filter, InsertQuery, LibsqlStore, MemoryStore, Ordering, Row,
    SelectQuery, StoreError, UpdateQuery,
};
