//! Route requirements

use crate::role::Role;
use serde::{Deserialize, Serialize};

/// What a route demands of the viewing profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequirement {
    /// Any one of these roles (or a higher-ranked one) is enough
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub admin_only: bool,

    #[serde(default = "default_true")]
    pub require_approval: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RouteRequirement {
    fn default() -> Self {
        Self {
            roles: Vec::new(),
            admin_only: false,
            require_approval: true,
        }
    }
}

impl RouteRequirement {
    /// Approval only, no role constraint
    pub fn approved() -> Self {
        Self::default()
    }

    pub fn role(role: Role) -> Self {
        Self {
            roles: vec![role],
            ..Self::default()
        }
    }

    pub fn any_of(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn admin_only() -> Self {
        Self {
            admin_only: true,
            ..Self::default()
        }
    }

    pub fn without_approval(mut self) -> Self {
        self.require_approval = false;
        self
    }

    pub fn has_role_requirement(&self) -> bool {
        !self.roles.is_empty()
    }

    /// Highest rank among the required roles
    pub fn max_required_rank(&self) -> Option<u8> {
        self.roles.iter().map(|r| r.rank()).max()
    }
}
