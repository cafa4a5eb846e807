//! Access decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating a profile against a route requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Approved,
    Pending,
    Rejected,
    NoAccess,
    Loading,
}

impl AccessDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, AccessDecision::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessDecision::Approved => "approved",
            AccessDecision::Pending => "pending",
            AccessDecision::Rejected => "rejected",
            AccessDecision::NoAccess => "no_access",
            AccessDecision::Loading => "loading",
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    ProfileLoading,
    ProfileMissing,
    ApprovalRejected,
    ApprovalPending,
    AdminOnly,
    RoleUnset,
    RoleInsufficient,
    Granted,
}

impl DecisionReason {
    /// The decision this reason always leads to
    pub fn decision(&self) -> AccessDecision {
        match self {
            DecisionReason::ProfileLoading => AccessDecision::Loading,
            DecisionReason::ProfileMissing
            | DecisionReason::ApprovalPending
            | DecisionReason::RoleUnset => AccessDecision::Pending,
            DecisionReason::ApprovalRejected => AccessDecision::Rejected,
            DecisionReason::AdminOnly | DecisionReason::RoleInsufficient => {
                AccessDecision::NoAccess
            }
            DecisionReason::Granted => AccessDecision::Approved,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            DecisionReason::ProfileLoading => "profile is still loading",
            DecisionReason::ProfileMissing => "no profile has been provisioned yet",
            DecisionReason::ApprovalRejected => "account was rejected",
            DecisionReason::ApprovalPending => "account is awaiting approval",
            DecisionReason::AdminOnly => "route is restricted to administrators",
            DecisionReason::RoleUnset => "no role has been assigned",
            DecisionReason::RoleInsufficient => "role does not meet the route requirement",
            DecisionReason::Granted => "access granted",
        }
    }
}

/// A decision together with the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessVerdict {
    pub decision: AccessDecision,
    pub reason: DecisionReason,
}

impl From<DecisionReason> for AccessVerdict {
    fn from(reason: DecisionReason) -> Self {
        Self {
            decision: reason.decision(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_wire_names() {
        assert_eq!(
            serde_json::to_string(&AccessDecision::NoAccess).unwrap(),
            "\"no_access\""
        );
        assert_eq!(AccessDecision::NoAccess.to_string(), "no_access");
    }

    #[test]
    fn test_role_unset_is_pending() {
        let verdict = AccessVerdict::from(DecisionReason::RoleUnset);
        assert_eq!(verdict.decision, AccessDecision::Pending);
    }
}
