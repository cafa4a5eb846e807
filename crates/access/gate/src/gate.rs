//! Claims-based route gate

use crate::claims::SessionClaims;
use crate::error::GateError;
use access_policy::{AccessEvaluator, RouteTable};
use access_types::{AccessDecision, AccessVerdict, DecisionReason, RouteRequirement};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where each kind of redirect lands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRedirects {
    #[serde(default = "default_sign_in")]
    pub sign_in: String,
    #[serde(default = "default_pending")]
    pub pending: String,
    #[serde(default = "default_rejected")]
    pub rejected: String,
    #[serde(default = "default_role_missing")]
    pub role_missing: String,
    #[serde(default = "default_no_access")]
    pub no_access: String,
}

impl Default for GateRedirects {
    fn default() -> Self {
        Self {
            sign_in: default_sign_in(),
            pending: default_pending(),
            rejected: default_rejected(),
            role_missing: default_role_missing(),
            no_access: default_no_access(),
        }
    }
}

impl GateRedirects {
    /// Every configured target with the redirect that uses it
    pub fn targets(&self) -> [(RedirectKind, &str); 5] {
        [
            (RedirectKind::SignIn, self.sign_in.as_str()),
            (RedirectKind::Pending, self.pending.as_str()),
            (RedirectKind::Rejected, self.rejected.as_str()),
            (RedirectKind::RoleMissing, self.role_missing.as_str()),
            (RedirectKind::NoAccess, self.no_access.as_str()),
        ]
    }
}

fn default_sign_in() -> String {
    "/sign-in".to_string()
}

fn default_pending() -> String {
    "/pending".to_string()
}

fn default_rejected() -> String {
    "/rejected".to_string()
}

fn default_role_missing() -> String {
    "/role-missing".to_string()
}

fn default_no_access() -> String {
    "/no-access".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectKind {
    SignIn,
    Pending,
    Rejected,
    RoleMissing,
    NoAccess,
}

impl RedirectKind {
    /// Redirect for a verdict that did not grant access
    pub fn for_verdict(verdict: &AccessVerdict) -> Option<Self> {
        match verdict.decision {
            AccessDecision::Approved => None,
            AccessDecision::Rejected => Some(RedirectKind::Rejected),
            AccessDecision::NoAccess => Some(RedirectKind::NoAccess),
            AccessDecision::Pending if verdict.reason == DecisionReason::RoleUnset => {
                Some(RedirectKind::RoleMissing)
            }
            // Claims are read synchronously, so loading only shows up if a
            // caller builds the lookup by hand; hold the request back.
            AccessDecision::Pending | AccessDecision::Loading => Some(RedirectKind::Pending),
        }
    }
}

/// What the gate does with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GateOutcome {
    Proceed,
    Redirect { kind: RedirectKind, location: String },
}

impl GateOutcome {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateOutcome::Proceed)
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            GateOutcome::Proceed => None,
            GateOutcome::Redirect { location, .. } => Some(location),
        }
    }

    pub fn redirect_kind(&self) -> Option<RedirectKind> {
        match self {
            GateOutcome::Proceed => None,
            GateOutcome::Redirect { kind, .. } => Some(*kind),
        }
    }
}

/// Full result of a gate check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateCheck {
    pub outcome: GateOutcome,
    /// `None` for public paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<RouteRequirement>,
    /// `None` when no evaluation ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<AccessVerdict>,
}

/// Route gate over a requirement table
#[derive(Debug, Clone)]
pub struct RouteGate {
    table: RouteTable,
    redirects: GateRedirects,
    evaluator: AccessEvaluator,
}

impl RouteGate {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            redirects: GateRedirects::default(),
            evaluator: AccessEvaluator::new(),
        }
    }

    pub fn with_redirects(mut self, redirects: GateRedirects) -> Self {
        self.redirects = redirects;
        self
    }

    pub fn with_evaluator(mut self, evaluator: AccessEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn redirects(&self) -> &GateRedirects {
        &self.redirects
    }

    /// Check that every redirect target resolves to a public path
    pub fn validate(&self) -> crate::error::Result<()> {
        for (kind, location) in self.redirects.targets() {
            if !self.table.resolve(location).is_public() {
                return Err(GateError::ProtectedRedirect {
                    kind,
                    location: location.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Decide what to do with a request for `path`
    pub fn check(&self, path: &str, claims: Option<&SessionClaims>) -> GateCheck {
        let Some(requirement) = self.table.resolve(path).requirement() else {
            return GateCheck {
                outcome: GateOutcome::Proceed,
                requirement: None,
                verdict: None,
            };
        };

        let Some(claims) = claims else {
            debug!(path, "No session; redirecting to sign-in");
            return GateCheck {
                outcome: GateOutcome::Redirect {
                    kind: RedirectKind::SignIn,
                    location: self.sign_in_location(path),
                },
                requirement: Some(requirement),
                verdict: None,
            };
        };

        let verdict = self.evaluator.explain(&claims.profile_lookup(), &requirement);
        let outcome = match RedirectKind::for_verdict(&verdict) {
            None => GateOutcome::Proceed,
            Some(kind) => GateOutcome::Redirect {
                kind,
                location: self.location_for(kind, path),
            },
        };

        debug!(
            path,
            identity = %claims.sub,
            decision = %verdict.decision,
            proceed = outcome.is_proceed(),
            "Gate checked route"
        );

        GateCheck {
            outcome,
            requirement: Some(requirement),
            verdict: Some(verdict),
        }
    }

    /// Convenience wrapper returning only the outcome
    pub fn outcome(&self, path: &str, claims: Option<&SessionClaims>) -> GateOutcome {
        self.check(path, claims).outcome
    }

    fn location_for(&self, kind: RedirectKind, path: &str) -> String {
        match kind {
            RedirectKind::SignIn => self.sign_in_location(path),
            RedirectKind::Pending => self.redirects.pending.clone(),
            RedirectKind::Rejected => self.redirects.rejected.clone(),
            RedirectKind::RoleMissing => self.redirects.role_missing.clone(),
            RedirectKind::NoAccess => self.redirects.no_access.clone(),
        }
    }

    fn sign_in_location(&self, path: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
        format!("{}?redirect_url={}", self.redirects.sign_in, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_policy::explain;
    use access_types::{ApprovalStatus, IdentityId, Role, RoleAssignment};
    use proptest::prelude::*;

    fn gate() -> RouteGate {
        RouteGate::new(RouteTable::care_defaults())
            .with_evaluator(AccessEvaluator::new().with_emit_audit_events(false))
    }

    fn claims(status: ApprovalStatus, role: impl Into<RoleAssignment>) -> SessionClaims {
        SessionClaims::new(IdentityId::new("user-1"))
            .with_status(status)
            .with_role(role)
    }

    #[test]
    fn test_public_path_proceeds_without_claims() {
        let check = gate().check("/sign-in", None);
        assert!(check.outcome.is_proceed());
        assert!(check.verdict.is_none());
    }

    #[test]
    fn test_missing_session_redirects_to_sign_in() {
        let outcome = gate().outcome("/clients/7", None);
        assert_eq!(outcome.redirect_kind(), Some(RedirectKind::SignIn));
        assert_eq!(
            outcome.location(),
            Some("/sign-in?redirect_url=%2Fclients%2F7")
        );
    }

    #[test]
    fn test_unprovisioned_claims_redirect_pending() {
        let claims = SessionClaims::new(IdentityId::new("fresh"));
        let outcome = gate().outcome("/dashboard", Some(&claims));
        assert_eq!(outcome.redirect_kind(), Some(RedirectKind::Pending));
        assert_eq!(outcome.location(), Some("/pending"));
    }

    #[test]
    fn test_role_missing_redirect() {
        let claims = claims(ApprovalStatus::Approved, RoleAssignment::Unset);
        let outcome = gate().outcome("/goals", Some(&claims));
        assert_eq!(outcome.redirect_kind(), Some(RedirectKind::RoleMissing));
        assert_eq!(outcome.location(), Some("/role-missing"));

        // No role requirement on the dashboard, so an unset role is fine there.
        assert!(gate().outcome("/dashboard", Some(&claims)).is_proceed());
    }

    #[test]
    fn test_rejected_and_no_access() {
        let rejected = claims(ApprovalStatus::Rejected, Role::Admin);
        assert_eq!(
            gate().outcome("/dashboard", Some(&rejected)).redirect_kind(),
            Some(RedirectKind::Rejected)
        );

        let family = claims(ApprovalStatus::Approved, Role::Family);
        assert_eq!(
            gate().outcome("/reports", Some(&family)).redirect_kind(),
            Some(RedirectKind::NoAccess)
        );
        assert!(gate().outcome("/family/calendar", Some(&family)).is_proceed());
    }

    #[test]
    fn test_coordinator_reaches_worker_pages() {
        let coordinator = claims(ApprovalStatus::Approved, Role::SupportCoordinator);
        for path in ["/clients", "/shift-notes/3", "/activities", "/reports"] {
            assert!(gate().outcome(path, Some(&coordinator)).is_proceed(), "{path}");
        }
        assert!(!gate().outcome("/admin", Some(&coordinator)).is_proceed());
    }

    #[test]
    fn test_default_redirects_are_public() {
        assert!(gate().validate().is_ok());
    }

    #[test]
    fn test_protected_redirect_target_rejected() {
        let redirects = GateRedirects {
            pending: "/waiting".to_string(),
            ..GateRedirects::default()
        };
        let gate = gate().with_redirects(redirects);
        let pending = claims(ApprovalStatus::Pending, Role::Family);
        let location = gate.outcome("/dashboard", Some(&pending)).location().map(String::from);
        assert_eq!(location.as_deref(), Some("/waiting"));
        // The target itself would redirect again.
        assert!(!gate.outcome("/waiting", Some(&pending)).is_proceed());

        match gate.validate() {
            Err(GateError::ProtectedRedirect { kind, location }) => {
                assert_eq!(kind, RedirectKind::Pending);
                assert_eq!(location, "/waiting");
            }
            other => panic!("expected protected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_redirect_target_query_ignored() {
        let redirects = GateRedirects {
            no_access: "/no-access?from=gate".to_string(),
            ..GateRedirects::default()
        };
        assert!(gate().with_redirects(redirects).validate().is_ok());
    }

    #[test]
    fn test_custom_redirects() {
        let redirects = GateRedirects {
            pending: "/waiting-room".to_string(),
            ..GateRedirects::default()
        };
        let table = RouteTable::care_defaults().with_public("/waiting-room");
        let gate = RouteGate::new(table)
            .with_evaluator(AccessEvaluator::new().with_emit_audit_events(false))
            .with_redirects(redirects);
        assert!(gate.validate().is_ok());
        let pending = claims(ApprovalStatus::Pending, Role::Family);
        assert_eq!(
            gate.outcome("/family", Some(&pending)).location(),
            Some("/waiting-room")
        );
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        proptest::sample::select(vec![
            "/dashboard",
            "/clients/1",
            "/goals",
            "/incidents",
            "/behavior-plans/4",
            "/reports",
            "/family",
            "/admin/users",
            "/settings",
        ])
        .prop_map(String::from)
    }

    fn claims_strategy() -> impl Strategy<Value = SessionClaims> {
        let status = prop_oneof![
            Just(None),
            Just(Some(ApprovalStatus::Pending)),
            Just(Some(ApprovalStatus::Approved)),
            Just(Some(ApprovalStatus::Rejected)),
        ];
        let role = prop_oneof![
            Just(RoleAssignment::Unset),
            proptest::sample::select(Role::ALL.to_vec()).prop_map(RoleAssignment::Known),
            Just(RoleAssignment::Unrecognized("owner".to_string())),
        ];
        (status, role).prop_map(|(status, role)| {
            let mut claims = SessionClaims::new(IdentityId::new("prop-user")).with_role(role);
            claims.metadata.approval_status = status;
            claims
        })
    }

    proptest! {
        #[test]
        fn property_gate_mirrors_evaluator(path in path_strategy(), claims in claims_strategy()) {
            let gate = gate();
            let check = gate.check(&path, Some(&claims));
            let requirement = gate.table().resolve(&path).requirement().unwrap();
            let verdict = explain(&claims.profile_lookup(), &requirement);

            prop_assert_eq!(check.verdict, Some(verdict));
            prop_assert_eq!(check.outcome.is_proceed(), verdict.decision.is_approved());
            prop_assert_eq!(check.outcome.redirect_kind(), RedirectKind::for_verdict(&verdict));
        }
    }
}
