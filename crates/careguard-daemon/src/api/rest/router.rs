//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Access policy
        .route("/access/evaluate", post(handlers::evaluate))
        .route(
            "/access/identities/:id/profile",
            get(handlers::get_profile).put(handlers::put_profile),
        )
        .route(
            "/access/identities/:id/evaluate",
            post(handlers::evaluate_identity),
        )
        // Route gate
        .route("/gate/check", post(handlers::check_gate))
        // Catalog
        .route("/routes", get(handlers::list_routes))
        .route("/roles", get(handlers::list_roles));

    let router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
