//! Access policy handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use access_guard::GuardOutcome;
use access_types::{
    AccessVerdict, ApprovalStatus, IdentityId, IdentityProfile, ProfileLookup, RoleAssignment,
    RouteRequirement,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// Evaluate a caller-supplied profile
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    /// Profile subscription has not produced a value yet
    #[serde(default)]
    pub loading: bool,

    /// `null` or absent means no profile exists for the identity
    #[serde(default)]
    pub profile: Option<IdentityProfile>,

    #[serde(default)]
    pub requirement: RouteRequirement,
}

/// Evaluate the stored profile of an identity
#[derive(Debug, Default, Deserialize)]
pub struct EvaluateIdentityRequest {
    #[serde(default)]
    pub requirement: RouteRequirement,
}

/// Verdict plus what the presentation layer should show
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    #[serde(flatten)]
    pub verdict: AccessVerdict,
    pub outcome: GuardOutcome,
}

/// Profile fields the backend writes
#[derive(Debug, Deserialize)]
pub struct PutProfileRequest {
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub role: RoleAssignment,
}

fn respond(
    state: &AppState,
    lookup: &ProfileLookup,
    requirement: &RouteRequirement,
) -> EvaluateResponse {
    let verdict = state.evaluator.explain(lookup, requirement);
    EvaluateResponse {
        outcome: GuardOutcome::from_verdict(&verdict),
        verdict,
    }
}

/// POST /access/evaluate
pub async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Json<EvaluateResponse> {
    let lookup = if request.loading {
        ProfileLookup::Loading
    } else {
        ProfileLookup::from(request.profile)
    };
    Json(respond(&state, &lookup, &request.requirement))
}

/// POST /access/identities/:id/evaluate
pub async fn evaluate_identity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EvaluateIdentityRequest>,
) -> ApiResult<Json<EvaluateResponse>> {
    let lookup = state.profiles.lookup(&IdentityId::new(id))?;
    Ok(Json(respond(&state, &lookup, &request.requirement)))
}

/// GET /access/identities/:id/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<IdentityProfile>> {
    let identity = IdentityId::new(id);
    state
        .profiles
        .get(&identity)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("profile for {}", identity)))
}

/// PUT /access/identities/:id/profile
pub async fn put_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PutProfileRequest>,
) -> ApiResult<Json<IdentityProfile>> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("identity id is empty".to_string()));
    }
    let profile = IdentityProfile::new(IdentityId::new(id))
        .with_status(request.approval_status)
        .with_role_assignment(request.role);
    state.profiles.provision(profile.clone())?;
    Ok(Json(profile))
}
