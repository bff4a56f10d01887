//! Policy REST API endpoints
//!
//! Every handler runs behind the auth middleware and answers with an
//! [`ApiResponse`] envelope.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use ctpl_core::{AuthContext, Policy, PolicyId, PolicyPayload};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiResponse;
use crate::{ApiError, AppState};

type ApiResult<T> = Result<T, ApiError>;

/// Data returned by a successful create
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedPolicy {
    pub id: PolicyId,
}

/// POST / - Create a policy
pub async fn create_policy(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<PolicyPayload>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreatedPolicy>>)> {
    let id = state
        .policies
        .create(payload)
        .await
        .map_err(|e| ApiError::from_policy(e, "Failed to create policy"))?;

    info!(%id, principal = auth.principal(), "policy created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Policy created successfully",
            CreatedPolicy { id },
        )),
    ))
}

/// GET / - List active policies, newest first
pub async fn list_policies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<Policy>>>> {
    let policies = state
        .policies
        .list_active()
        .await
        .map_err(|e| ApiError::from_policy(e, "Failed to fetch policies"))?;

    Ok(Json(ApiResponse::ok(policies)))
}

/// GET /:id - Get one active policy
pub async fn get_policy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Policy>>> {
    let policy = state
        .policies
        .get(&id)
        .await
        .map_err(|e| ApiError::from_policy(e, "Failed to fetch policy"))?;

    Ok(Json(ApiResponse::ok(policy)))
}

/// PUT /:id - Overwrite a policy
pub async fn update_policy(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<PolicyPayload>,
) -> ApiResult<Json<ApiResponse<Policy>>> {
    let policy = state
        .policies
        .update(&id, payload)
        .await
        .map_err(|e| ApiError::from_policy(e, "Failed to update policy"))?;

    info!(id = %policy.id, principal = auth.principal(), "policy updated");
    Ok(Json(ApiResponse::with_message(
        "Policy updated successfully",
        policy,
    )))
}

/// DELETE /:id - Soft-delete an active policy
pub async fn delete_policy(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Policy>>> {
    let policy = state
        .policies
        .soft_delete(&id)
        .await
        .map_err(|e| ApiError::from_policy(e, "Failed to delete policy"))?;

    info!(id = %policy.id, principal = auth.principal(), "policy deleted");
    Ok(Json(ApiResponse::with_message(
        "Policy deleted successfully",
        policy,
    )))
}

/// GET /deleted/list - List soft-deleted policies, most recently deleted first
pub async fn list_deleted_policies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<Policy>>>> {
    let policies = state
        .policies
        .list_deleted()
        .await
        .map_err(|e| ApiError::from_policy(e, "Failed to fetch deleted policies"))?;

    Ok(Json(ApiResponse::ok(policies)))
}

/// PUT /:id/restore - Clear a policy's deletion marker
pub async fn restore_policy(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Policy>>> {
    let policy = state
        .policies
        .restore(&id)
        .await
        .map_err(|e| ApiError::from_policy(e, "Failed to restore policy"))?;

    info!(id = %policy.id, principal = auth.principal(), "policy restored");
    Ok(Json(ApiResponse::with_message(
        "Policy restored successfully",
        policy,
    )))
}
