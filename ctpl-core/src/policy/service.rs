//! Policy operations over an injected data store.
//!
//! Every operation is a single store round trip. The service holds no
//! state of its own beyond the store handle, so one instance can serve any
//! number of concurrent requests.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{Policy, PolicyError, PolicyFields, PolicyId, PolicyPayload};
use crate::store::{
    DataStore, Filter, InsertQuery, Ordering, Row, SelectQuery, StoreError, UpdateQuery,
};

/// Table holding policy rows
pub const POLICIES_TABLE: &str = "policies";

type Result<T> = std::result::Result<T, PolicyError>;

/// Create, read, update, soft-delete and restore operations on policies.
#[derive(Clone)]
pub struct PolicyService {
    store: Arc<dyn DataStore>,
}

impl PolicyService {
    /// Create a service backed by the given store
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Insert a new policy with computed premium amounts, returning its id.
    #[instrument(skip(self, payload), level = "debug")]
    pub async fn create(&self, payload: PolicyPayload) -> Result<PolicyId> {
        let fields = PolicyFields::for_create(&payload);
        debug!(
            raw_date_issued = ?payload.date_issued,
            raw_date_received = ?payload.date_received,
            raw_insurance_from_date = ?payload.insurance_from_date,
            raw_insurance_to_date = ?payload.insurance_to_date,
            date_issued = ?fields.date_issued,
            date_received = ?fields.date_received,
            insurance_from_date = ?fields.insurance_from_date,
            insurance_to_date = ?fields.insurance_to_date,
            "validated policy dates"
        );

        let rows = self
            .store
            .insert(InsertQuery::new(POLICIES_TABLE, fields.to_row()?))
            .await?;

        let row = rows
            .first()
            .ok_or_else(|| StoreError::InvalidData("insert returned no rows".to_string()))?;
        Ok(Policy::from_row(row)?.id)
    }

    /// All active policies, newest id first.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_active(&self) -> Result<Vec<Policy>> {
        let rows = self
            .store
            .select(
                SelectQuery::from(POLICIES_TABLE)
                    .filter(Filter::is_null("deleted_at"))
                    .order(Ordering::desc("id")),
            )
            .await?;
        to_policies(&rows)
    }

    /// One active policy by id.
    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, id: &str) -> Result<Policy> {
        let id = PolicyId::parse(id).ok_or_else(PolicyError::not_found)?;
        let rows = self
            .store
            .select(
                SelectQuery::from(POLICIES_TABLE)
                    .filter(Filter::eq("id", id.0))
                    .filter(Filter::is_null("deleted_at")),
            )
            .await?;
        first_policy(&rows)
    }

    /// Overwrite every field of a policy. Derived amounts are stored as sent.
    ///
    /// No soft-delete filter is applied, so deleted policies can be edited.
    #[instrument(skip(self, payload), level = "debug")]
    pub async fn update(&self, id: &str, payload: PolicyPayload) -> Result<Policy> {
        let fields = PolicyFields::for_update(&payload);
        if fields.missing_required() {
            return Err(PolicyError::Validation(
                "Assured, COC number, and OR number are required".to_string(),
            ));
        }

        let id = PolicyId::parse(id).ok_or_else(PolicyError::not_found)?;
        let rows = self
            .store
            .update(
                UpdateQuery::new(POLICIES_TABLE, fields.to_row()?).filter(Filter::eq("id", id.0)),
            )
            .await?;
        first_policy(&rows)
    }

    /// Mark an active policy as deleted.
    #[instrument(skip(self), level = "debug")]
    pub async fn soft_delete(&self, id: &str) -> Result<Policy> {
        let id = PolicyId::parse(id)
            .ok_or_else(|| PolicyError::Validation("Invalid policy ID".to_string()))?;

        let mut values = Row::new();
        values.insert(
            "deleted_at".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        let rows = self
            .store
            .update(
                UpdateQuery::new(POLICIES_TABLE, values)
                    .filter(Filter::eq("id", id.0))
                    .filter(Filter::is_null("deleted_at")),
            )
            .await?;
        first_policy(&rows)
    }

    /// All soft-deleted policies, most recently deleted first.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_deleted(&self) -> Result<Vec<Policy>> {
        let rows = self
            .store
            .select(
                SelectQuery::from(POLICIES_TABLE)
                    .filter(Filter::not_null("deleted_at"))
                    .order(Ordering::desc("deleted_at")),
            )
            .await?;
        to_policies(&rows)
    }

    /// Clear the deletion marker. Restoring an active policy is a no-op success.
    #[instrument(skip(self), level = "debug")]
    pub async fn restore(&self, id: &str) -> Result<Policy> {
        let id = PolicyId::parse(id).ok_or_else(PolicyError::not_found)?;

        let mut values = Row::new();
        values.insert("deleted_at".into(), Value::Null);

        let rows = self
            .store
            .update(UpdateQuery::new(POLICIES_TABLE, values).filter(Filter::eq("id", id.0)))
            .await?;
        first_policy(&rows)
    }
}

fn to_policies(rows: &[Row]) -> Result<Vec<Policy>> {
    rows.iter()
        .map(|row| Policy::from_row(row).map_err(PolicyError::from))
        .collect()
}

fn first_policy(rows: &[Row]) -> Result<Policy> {
    let row = rows.first().ok_or_else(PolicyError::not_found)?;
    Ok(Policy::from_row(row)?)
}
