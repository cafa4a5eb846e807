//! Route gate handler

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use access_gate::{GateCheck, SessionClaims};
use axum::{extract::State, Json};
use serde::Deserialize;

/// Gate check request.
///
/// Claims may be sent decoded or as the raw token payload.
#[derive(Debug, Deserialize)]
pub struct GateCheckRequest {
    pub path: String,
    #[serde(default)]
    pub claims: Option<SessionClaims>,
    #[serde(default)]
    pub claims_payload: Option<String>,
}

/// POST /gate/check
pub async fn check_gate(
    State(state): State<AppState>,
    Json(request): Json<GateCheckRequest>,
) -> ApiResult<Json<GateCheck>> {
    if !request.path.starts_with('/') {
        return Err(ApiError::BadRequest(format!(
            "path must start with '/': {}",
            request.path
        )));
    }

    let claims = match (request.claims, request.claims_payload) {
        (Some(_), Some(_)) => {
            return Err(ApiError::BadRequest(
                "send either claims or claims_payload, not both".to_string(),
            ))
        }
        (Some(claims), None) => Some(claims),
        (None, Some(payload)) => Some(SessionClaims::from_payload(&payload)?),
        (None, None) => None,
    };

    Ok(Json(state.gate.check(&request.path, claims.as_ref())))
}
