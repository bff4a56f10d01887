//! HTTP server module

mod api;
mod envelope;
mod policies;

use std::sync::Arc;

use axum::{
    Extension, Router, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{AuthLayer, auth_middleware};
use crate::{AppState, ServerConfig};

pub use api::HealthResponse;
pub use envelope::ApiResponse;
pub use policies::CreatedPolicy;

/// Policy routes, relative to the mount path, behind the auth gate
fn policy_routes(auth: AuthLayer) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(policies::create_policy).get(policies::list_policies),
        )
        .route("/deleted/list", get(policies::list_deleted_policies))
        .route(
            "/:id",
            get(policies::get_policy)
                .put(policies::update_policy)
                .delete(policies::delete_policy),
        )
        .route("/:id/restore", put(policies::restore_policy))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(auth))
}

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let policies = policy_routes(AuthLayer::new(config.auth.clone()));
    let mount = config.mount_path.trim_end_matches('/');

    let router = Router::new().route("/api/health", get(api::health));
    let router = if mount.is_empty() {
        router.merge(policies)
    } else {
        router.nest(mount, policies)
    };

    let router = router.layer(TraceLayer::new_for_http());
    let router = if config.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
