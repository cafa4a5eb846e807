//! Session claims issued by the identity provider

use crate::error::{GateError, Result};
use access_types::{ApprovalStatus, IdentityId, IdentityProfile, ProfileLookup, RoleAssignment};
use serde::{Deserialize, Serialize};

/// Public metadata the backend copies onto the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsMetadata {
    #[serde(default, alias = "approvalStatus", skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(default)]
    pub role: RoleAssignment,
}

/// Decoded session token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: IdentityId,
    #[serde(default, alias = "publicMetadata")]
    pub metadata: ClaimsMetadata,
}

impl SessionClaims {
    pub fn new(sub: IdentityId) -> Self {
        Self {
            sub,
            metadata: ClaimsMetadata::default(),
        }
    }

    pub fn with_status(mut self, status: ApprovalStatus) -> Self {
        self.metadata.approval_status = Some(status);
        self
    }

    pub fn with_role(mut self, role: impl Into<RoleAssignment>) -> Self {
        self.metadata.role = role.into();
        self
    }

    /// Parse a JSON token payload. Signature checks happen upstream.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let claims: SessionClaims = serde_json::from_str(payload)?;
        if claims.sub.as_str().is_empty() {
            return Err(GateError::MissingSubject);
        }
        Ok(claims)
    }

    /// The profile these claims describe.
    ///
    /// Claims without an approval status mean the profile has not been
    /// provisioned yet.
    pub fn profile_lookup(&self) -> ProfileLookup {
        match &self.metadata.approval_status {
            Some(status) => ProfileLookup::Found(
                IdentityProfile::new(self.sub.clone())
                    .with_status(status.clone())
                    .with_role_assignment(self.metadata.role.clone()),
            ),
            None => ProfileLookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_types::Role;

    #[test]
    fn test_parse_payload() {
        let claims = SessionClaims::from_payload(
            r#"{"sub":"user_9","publicMetadata":{"approvalStatus":"approved","role":"family"}}"#,
        )
        .unwrap();
        assert_eq!(claims.metadata.approval_status, Some(ApprovalStatus::Approved));
        assert_eq!(claims.metadata.role, RoleAssignment::Known(Role::Family));
    }

    #[test]
    fn test_parse_rejects_empty_subject() {
        assert!(matches!(
            SessionClaims::from_payload(r#"{"sub":""}"#),
            Err(GateError::MissingSubject)
        ));
        assert!(matches!(
            SessionClaims::from_payload("not json"),
            Err(GateError::MalformedClaims(_))
        ));
    }

    #[test]
    fn test_claims_without_status_have_no_profile() {
        let claims = SessionClaims::new(IdentityId::new("fresh")).with_role(Role::Admin);
        assert_eq!(claims.profile_lookup(), ProfileLookup::NotFound);
    }

    #[test]
    fn test_claims_to_profile() {
        let claims = SessionClaims::new(IdentityId::new("u"))
            .with_status(ApprovalStatus::Approved)
            .with_role(Role::SupportWorker);
        let lookup = claims.profile_lookup();
        let profile = lookup.profile().unwrap();
        assert_eq!(profile.role.role(), Some(Role::SupportWorker));
    }
}
