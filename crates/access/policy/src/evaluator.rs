//! Access policy evaluator
//!
//! Rules are checked in a fixed order and the first match wins:
//! loading, missing profile, rejected, not approved, admin-only,
//! role requirement, granted. The caller handles the no-identity case
//! (a sign-in redirect) before reaching the evaluator.

use access_types::{
    AccessDecision, AccessVerdict, DecisionReason, IdentityProfile, ProfileLookup,
    RouteRequirement,
};
use tracing::{debug, info, warn};

/// Evaluate `profile` against `requirement`
pub fn evaluate(profile: &ProfileLookup, requirement: &RouteRequirement) -> AccessDecision {
    explain(profile, requirement).decision
}

/// Evaluate and report which rule decided
pub fn explain(profile: &ProfileLookup, requirement: &RouteRequirement) -> AccessVerdict {
    let reason = match profile {
        ProfileLookup::Loading => DecisionReason::ProfileLoading,
        ProfileLookup::NotFound => DecisionReason::ProfileMissing,
        ProfileLookup::Found(profile) => check_profile(profile, requirement),
    };
    AccessVerdict::from(reason)
}

fn check_profile(profile: &IdentityProfile, requirement: &RouteRequirement) -> DecisionReason {
    if requirement.require_approval {
        if profile.approval_status.is_rejected() {
            return DecisionReason::ApprovalRejected;
        }
        if !profile.approval_status.is_approved() {
            return DecisionReason::ApprovalPending;
        }
    }

    if requirement.admin_only && !profile.role.is_admin() {
        return DecisionReason::AdminOnly;
    }

    if requirement.has_role_requirement() {
        if profile.role.is_unset() {
            return DecisionReason::RoleUnset;
        }
        let satisfied = requirement
            .roles
            .iter()
            .any(|required| profile.role.satisfies(*required));
        if !satisfied {
            return DecisionReason::RoleInsufficient;
        }
    }

    DecisionReason::Granted
}

/// Evaluator with audit logging.
///
/// Holds no state across calls; every evaluation depends only on its inputs.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    emit_audit_events: bool,
}

impl Default for AccessEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessEvaluator {
    pub fn new() -> Self {
        Self {
            emit_audit_events: true,
        }
    }

    /// Set whether to emit audit events
    pub fn with_emit_audit_events(mut self, emit: bool) -> Self {
        self.emit_audit_events = emit;
        self
    }

    pub fn evaluate(&self, profile: &ProfileLookup, requirement: &RouteRequirement) -> AccessDecision {
        self.explain(profile, requirement).decision
    }

    pub fn explain(&self, profile: &ProfileLookup, requirement: &RouteRequirement) -> AccessVerdict {
        let verdict = explain(profile, requirement);

        debug!(
            identity = profile.profile().map(|p| p.identity_id.as_str()).unwrap_or("-"),
            roles = ?requirement.roles,
            admin_only = requirement.admin_only,
            require_approval = requirement.require_approval,
            decision = %verdict.decision,
            "Evaluated access policy"
        );

        if self.emit_audit_events {
            self.log_verdict(profile, &verdict);
        }

        verdict
    }

    fn log_verdict(&self, profile: &ProfileLookup, verdict: &AccessVerdict) {
        let Some(profile) = profile.profile() else {
            return;
        };
        match verdict.decision {
            AccessDecision::Rejected | AccessDecision::NoAccess => {
                warn!(
                    identity = %profile.identity_id,
                    role = ?profile.role,
                    reason = verdict.reason.describe(),
                    "Access denied"
                );
            }
            AccessDecision::Pending => {
                info!(
                    identity = %profile.identity_id,
                    reason = verdict.reason.describe(),
                    "Access pending"
                );
            }
            AccessDecision::Approved | AccessDecision::Loading => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_types::{ApprovalStatus, IdentityId, Role, RoleAssignment};
    use proptest::prelude::*;

    fn found(status: ApprovalStatus, role: RoleAssignment) -> ProfileLookup {
        ProfileLookup::Found(
            IdentityProfile::new(IdentityId::new("user-1"))
                .with_status(status)
                .with_role_assignment(role),
        )
    }

    fn approved(role: Role) -> ProfileLookup {
        found(ApprovalStatus::Approved, role.into())
    }

    #[test]
    fn test_coordinator_satisfies_worker_route() {
        let decision = evaluate(
            &approved(Role::SupportCoordinator),
            &RouteRequirement::role(Role::SupportWorker),
        );
        assert_eq!(decision, AccessDecision::Approved);
    }

    #[test]
    fn test_family_denied_coordinator_route() {
        let decision = evaluate(
            &approved(Role::Family),
            &RouteRequirement::role(Role::SupportCoordinator),
        );
        assert_eq!(decision, AccessDecision::NoAccess);
    }

    #[test]
    fn test_pending_without_requirement() {
        let profile = found(ApprovalStatus::Pending, RoleAssignment::Unset);
        assert_eq!(
            evaluate(&profile, &RouteRequirement::default()),
            AccessDecision::Pending
        );
    }

    #[test]
    fn test_missing_profile_is_pending() {
        let verdict = explain(&ProfileLookup::NotFound, &RouteRequirement::default());
        assert_eq!(verdict.decision, AccessDecision::Pending);
        assert_eq!(verdict.reason, DecisionReason::ProfileMissing);
    }

    #[test]
    fn test_loading_comes_first() {
        let decision = evaluate(&ProfileLookup::Loading, &RouteRequirement::admin_only());
        assert_eq!(decision, AccessDecision::Loading);
    }

    #[test]
    fn test_unrecognized_status_is_pending() {
        let profile = found(ApprovalStatus::Unrecognized("suspended".into()), Role::Admin.into());
        let verdict = explain(&profile, &RouteRequirement::default());
        assert_eq!(verdict.reason, DecisionReason::ApprovalPending);
    }

    #[test]
    fn test_approval_not_required_skips_status() {
        let profile = found(ApprovalStatus::Rejected, Role::SupportWorker.into());
        let req = RouteRequirement::role(Role::SupportWorker).without_approval();
        assert_eq!(evaluate(&profile, &req), AccessDecision::Approved);
    }

    #[test]
    fn test_role_unset_is_pending() {
        let profile = found(ApprovalStatus::Approved, RoleAssignment::Unset);
        let verdict = explain(&profile, &RouteRequirement::role(Role::Family));
        assert_eq!(verdict.decision, AccessDecision::Pending);
        assert_eq!(verdict.reason, DecisionReason::RoleUnset);
    }

    #[test]
    fn test_role_unset_passes_route_without_roles() {
        let profile = found(ApprovalStatus::Approved, RoleAssignment::Unset);
        assert_eq!(
            evaluate(&profile, &RouteRequirement::approved()),
            AccessDecision::Approved
        );
    }

    #[test]
    fn test_unrecognized_role_is_no_access() {
        let profile = found(
            ApprovalStatus::Approved,
            RoleAssignment::Unrecognized("superuser".into()),
        );
        let verdict = explain(&profile, &RouteRequirement::role(Role::Family));
        assert_eq!(verdict.reason, DecisionReason::RoleInsufficient);
        assert_eq!(
            evaluate(&profile, &RouteRequirement::admin_only()),
            AccessDecision::NoAccess
        );
    }

    #[test]
    fn test_any_of_roles() {
        let req = RouteRequirement::any_of([Role::Admin, Role::BehaviorPractitioner]);
        assert_eq!(
            evaluate(&approved(Role::BehaviorPractitioner), &req),
            AccessDecision::Approved
        );
        assert_eq!(
            evaluate(&approved(Role::SupportCoordinator), &req),
            AccessDecision::Approved
        );
        assert_eq!(
            evaluate(&approved(Role::SupportWorker), &req),
            AccessDecision::NoAccess
        );
    }

    #[test]
    fn test_admin_only_checked_before_roles() {
        let mut req = RouteRequirement::admin_only();
        req.roles = vec![Role::Family];
        let verdict = explain(&approved(Role::PublicGuardian), &req);
        assert_eq!(verdict.reason, DecisionReason::AdminOnly);
        assert!(evaluate(&approved(Role::Admin), &req).is_approved());
    }

    #[test]
    fn test_evaluator_matches_pure_function() {
        let evaluator = AccessEvaluator::new().with_emit_audit_events(false);
        let profile = approved(Role::Family);
        let req = RouteRequirement::role(Role::SupportWorker);
        assert_eq!(evaluator.evaluate(&profile, &req), evaluate(&profile, &req));
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        proptest::sample::select(Role::ALL.to_vec())
    }

    fn assignment_strategy() -> impl Strategy<Value = RoleAssignment> {
        prop_oneof![
            Just(RoleAssignment::Unset),
            role_strategy().prop_map(RoleAssignment::Known),
            "[a-z]{3,10}".prop_map(|name| RoleAssignment::from(Some(format!("x_{name}")))),
        ]
    }

    fn status_strategy() -> impl Strategy<Value = ApprovalStatus> {
        prop_oneof![
            Just(ApprovalStatus::Pending),
            Just(ApprovalStatus::Approved),
            Just(ApprovalStatus::Rejected),
            Just(ApprovalStatus::Unrecognized("suspended".to_string())),
        ]
    }

    fn requirement_strategy() -> impl Strategy<Value = RouteRequirement> {
        (
            proptest::collection::vec(role_strategy(), 0..3),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(roles, admin_only, require_approval)| RouteRequirement {
                roles,
                admin_only,
                require_approval,
            })
    }

    fn lookup_strategy() -> impl Strategy<Value = ProfileLookup> {
        prop_oneof![
            1 => Just(ProfileLookup::Loading),
            1 => Just(ProfileLookup::NotFound),
            8 => (status_strategy(), assignment_strategy())
                .prop_map(|(status, role)| found(status, role)),
        ]
    }

    proptest! {
        #[test]
        fn property_rejected_always_rejected(
            role in assignment_strategy(),
            mut req in requirement_strategy(),
        ) {
            req.require_approval = true;
            let profile = found(ApprovalStatus::Rejected, role);
            prop_assert_eq!(evaluate(&profile, &req), AccessDecision::Rejected);
        }

        #[test]
        fn property_admin_only_denies_non_admins(
            role in assignment_strategy(),
            mut req in requirement_strategy(),
        ) {
            prop_assume!(!role.is_admin());
            req.admin_only = true;
            let profile = found(ApprovalStatus::Approved, role);
            prop_assert_eq!(evaluate(&profile, &req), AccessDecision::NoAccess);
        }

        #[test]
        fn property_sufficient_rank_never_no_access(
            role in role_strategy(),
            mut req in requirement_strategy(),
        ) {
            req.admin_only = false;
            prop_assume!(req.max_required_rank().map_or(true, |max| role.rank() >= max));
            let decision = evaluate(&approved(role), &req);
            prop_assert_ne!(decision, AccessDecision::NoAccess);
        }

        #[test]
        fn property_missing_rank_never_satisfies(
            name in "[a-z]{3,10}",
            roles in proptest::collection::vec(role_strategy(), 1..4),
        ) {
            let role = RoleAssignment::Unrecognized(format!("x_{name}"));
            let profile = found(ApprovalStatus::Approved, role);
            let decision = evaluate(&profile, &RouteRequirement::any_of(roles));
            prop_assert_eq!(decision, AccessDecision::NoAccess);
        }

        #[test]
        fn property_evaluation_is_idempotent(
            profile in lookup_strategy(),
            req in requirement_strategy(),
        ) {
            prop_assert_eq!(evaluate(&profile, &req), evaluate(&profile, &req));
            prop_assert_eq!(explain(&profile, &req), explain(&profile, &req));
        }

        #[test]
        fn property_explain_agrees_with_evaluate(
            profile in lookup_strategy(),
            req in requirement_strategy(),
        ) {
            let verdict = explain(&profile, &req);
            prop_assert_eq!(verdict.decision, evaluate(&profile, &req));
            prop_assert_eq!(verdict.decision, verdict.reason.decision());
        }
    }
}
