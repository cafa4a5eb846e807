//! Identity profiles as read from the backend

use crate::role::{Role, RoleAssignment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque subject id issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(pub String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Approval state of a profile.
///
/// Values outside the known three keep the backend's raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Unrecognized(String),
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ApprovalStatus::Rejected)
    }
}

impl From<String> for ApprovalStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => ApprovalStatus::Pending,
            "approved" => ApprovalStatus::Approved,
            "rejected" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Unrecognized(value),
        }
    }
}

impl From<ApprovalStatus> for String {
    fn from(value: ApprovalStatus) -> Self {
        match value {
            ApprovalStatus::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-owned record mirroring an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub identity_id: IdentityId,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub role: RoleAssignment,
}

impl IdentityProfile {
    /// A freshly provisioned profile: pending, no role
    pub fn new(identity_id: IdentityId) -> Self {
        Self {
            identity_id,
            approval_status: ApprovalStatus::Pending,
            role: RoleAssignment::Unset,
        }
    }

    pub fn with_status(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = status;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = RoleAssignment::Known(role);
        self
    }

    pub fn with_role_assignment(mut self, role: RoleAssignment) -> Self {
        self.role = role;
        self
    }

    /// Approved profile holding `role`
    pub fn approved(identity_id: IdentityId, role: Role) -> Self {
        Self::new(identity_id)
            .with_status(ApprovalStatus::Approved)
            .with_role(role)
    }
}

/// Result of reading the current profile from the data layer.
///
/// Mirrors a subscription that is undefined while loading and null when
/// no record exists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "profile", rename_all = "snake_case")]
pub enum ProfileLookup {
    #[default]
    Loading,
    NotFound,
    Found(IdentityProfile),
}

impl ProfileLookup {
    pub fn is_loading(&self) -> bool {
        matches!(self, ProfileLookup::Loading)
    }

    pub fn profile(&self) -> Option<&IdentityProfile> {
        match self {
            ProfileLookup::Found(profile) => Some(profile),
            _ => None,
        }
    }
}

impl From<Option<IdentityProfile>> for ProfileLookup {
    fn from(value: Option<IdentityProfile>) -> Self {
        match value {
            Some(profile) => ProfileLookup::Found(profile),
            None => ProfileLookup::NotFound,
        }
    }
}
