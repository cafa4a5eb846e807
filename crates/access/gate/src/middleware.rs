//! Axum middleware enforcing the route gate
//!
//! Expects the upstream identity layer to have placed verified
//! [`SessionClaims`] into the request extensions. Requests without claims
//! are treated as signed out.

use crate::claims::SessionClaims;
use crate::gate::{GateOutcome, RouteGate};
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Middleware function; use with `middleware::from_fn_with_state`
pub async fn enforce_route_gate(
    State(gate): State<Arc<RouteGate>>,
    request: Request,
    next: Next,
) -> Response {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let claims = request.extensions().get::<SessionClaims>();

    match gate.check(&target, claims).outcome {
        GateOutcome::Proceed => next.run(request).await,
        GateOutcome::Redirect { kind, location } => {
            info!(path = %target, kind = ?kind, location = %location, "Gate redirected request");
            Redirect::to(&location).into_response()
        }
    }
}

/// Wrap every route of `router` with the gate
pub fn route_gate_layer<S>(router: Router<S>, gate: Arc<RouteGate>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, enforce_route_gate))
}
