//! What the presentation layer shows for a decision

use access_types::{AccessDecision, AccessVerdict};
use serde::{Deserialize, Serialize};

/// Navigation offered on an informational screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavAction {
    pub label: String,
    pub href: String,
}

impl NavAction {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Pending,
    Rejected,
    InsufficientPermission,
}

/// Informational screen shown instead of protected content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub kind: ScreenKind,
    pub title: String,
    pub message: String,
    pub action: NavAction,
}

impl Screen {
    pub fn pending() -> Self {
        Self {
            kind: ScreenKind::Pending,
            title: "Account pending approval".to_string(),
            message: "An administrator needs to approve your account and assign a role before you can continue.".to_string(),
            action: NavAction::new("Back to home", "/"),
        }
    }

    pub fn rejected() -> Self {
        Self {
            kind: ScreenKind::Rejected,
            title: "Access request declined".to_string(),
            message: "Your account request was not approved. Contact your organisation's administrator if you think this is a mistake.".to_string(),
            action: NavAction::new("Sign out", "/sign-in"),
        }
    }

    pub fn insufficient_permission() -> Self {
        Self {
            kind: ScreenKind::InsufficientPermission,
            title: "Insufficient permissions".to_string(),
            message: "Your role does not give access to this page.".to_string(),
            action: NavAction::new("Go to dashboard", "/dashboard"),
        }
    }
}

/// Guard result for the current inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuardOutcome {
    RenderContent,
    ShowLoading,
    RedirectToSignIn,
    Screen { screen: Screen },
}

impl GuardOutcome {
    /// Outcome for an identity that is present
    pub fn from_verdict(verdict: &AccessVerdict) -> Self {
        match verdict.decision {
            AccessDecision::Approved => GuardOutcome::RenderContent,
            AccessDecision::Loading => GuardOutcome::ShowLoading,
            AccessDecision::Pending => GuardOutcome::Screen {
                screen: Screen::pending(),
            },
            AccessDecision::Rejected => GuardOutcome::Screen {
                screen: Screen::rejected(),
            },
            AccessDecision::NoAccess => GuardOutcome::Screen {
                screen: Screen::insufficient_permission(),
            },
        }
    }

    pub fn screen_kind(&self) -> Option<ScreenKind> {
        match self {
            GuardOutcome::Screen { screen } => Some(screen.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_types::DecisionReason;

    #[test]
    fn test_outcome_per_decision() {
        let cases = [
            (DecisionReason::Granted, None),
            (DecisionReason::ProfileMissing, Some(ScreenKind::Pending)),
            (DecisionReason::RoleUnset, Some(ScreenKind::Pending)),
            (DecisionReason::ApprovalRejected, Some(ScreenKind::Rejected)),
            (
                DecisionReason::RoleInsufficient,
                Some(ScreenKind::InsufficientPermission),
            ),
        ];
        for (reason, expected) in cases {
            let outcome = GuardOutcome::from_verdict(&AccessVerdict::from(reason));
            assert_eq!(outcome.screen_kind(), expected, "{reason:?}");
        }
        assert_eq!(
            GuardOutcome::from_verdict(&AccessVerdict::from(DecisionReason::ProfileLoading)),
            GuardOutcome::ShowLoading
        );
    }

    #[test]
    fn test_outcome_serializes_with_kind() {
        let json = serde_json::to_value(GuardOutcome::RedirectToSignIn).unwrap();
        assert_eq!(json["kind"], "redirect_to_sign_in");
    }
}
