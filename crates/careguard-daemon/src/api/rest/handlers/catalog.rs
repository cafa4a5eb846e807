//! Route table and role ladder listings

use crate::api::rest::state::AppState;
use access_policy::RouteTable;
use access_types::Role;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// One rung of the role ladder
#[derive(Debug, Serialize, Deserialize)]
pub struct RoleInfo {
    pub role: Role,
    pub rank: u8,
    pub label: String,
}

/// GET /routes
pub async fn list_routes(State(state): State<AppState>) -> Json<RouteTable> {
    Json(state.gate.table().clone())
}

/// GET /roles, highest rank first
pub async fn list_roles() -> Json<Vec<RoleInfo>> {
    Json(
        Role::ALL
            .into_iter()
            .map(|role| RoleInfo {
                role,
                rank: role.rank(),
                label: role.label().to_string(),
            })
            .collect(),
    )
}
