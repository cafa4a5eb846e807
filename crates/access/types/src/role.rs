//! Roles and the privilege ladder
//!
//! Roles form a single-axis ladder: a higher-ranked role satisfies any
//! requirement for a lower-ranked one.

use crate::error::RoleParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A role assignable to a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    PublicGuardian,
    SupportCoordinator,
    BehaviorPractitioner,
    SupportWorker,
    Family,
}

impl Role {
    /// Every role, highest rank first
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::PublicGuardian,
        Role::SupportCoordinator,
        Role::BehaviorPractitioner,
        Role::SupportWorker,
        Role::Family,
    ];

    /// Numeric privilege level
    pub const fn rank(self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::PublicGuardian => 80,
            Role::SupportCoordinator => 70,
            Role::BehaviorPractitioner => 60,
            Role::SupportWorker => 50,
            Role::Family => 30,
        }
    }

    /// Wire name, as stored by the backend
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::PublicGuardian => "public_guardian",
            Role::SupportCoordinator => "support_coordinator",
            Role::BehaviorPractitioner => "behavior_practitioner",
            Role::SupportWorker => "support_worker",
            Role::Family => "family",
        }
    }

    /// Human-readable label
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::PublicGuardian => "Public Guardian",
            Role::SupportCoordinator => "Support Coordinator",
            Role::BehaviorPractitioner => "Behavior Practitioner",
            Role::SupportWorker => "Support Worker",
            Role::Family => "Family",
        }
    }

    /// Does this role meet a requirement for `required`?
    pub fn outranks_or_equals(self, required: Role) -> bool {
        self == required || self.rank() >= required.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RoleParseError {
                name: s.to_string(),
            })
    }
}

/// The role slot of a profile as the backend reports it.
///
/// Unknown role names are kept rather than dropped so they can be told
/// apart from an unset role. They carry no rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum RoleAssignment {
    #[default]
    Unset,
    Known(Role),
    Unrecognized(String),
}

impl RoleAssignment {
    /// Rank of the assigned role; `None` when unset or unrecognized
    pub fn rank(&self) -> Option<u8> {
        self.role().map(Role::rank)
    }

    /// The assigned role if it is a known one
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleAssignment::Known(role) => Some(*role),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, RoleAssignment::Unset)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, RoleAssignment::Known(Role::Admin))
    }

    /// Equal to `required`, or ranked at least as high.
    ///
    /// A missing rank never satisfies.
    pub fn satisfies(&self, required: Role) -> bool {
        match self.role() {
            Some(role) => role.outranks_or_equals(required),
            None => false,
        }
    }
}

impl From<Role> for RoleAssignment {
    fn from(role: Role) -> Self {
        RoleAssignment::Known(role)
    }
}

impl From<Option<String>> for RoleAssignment {
    fn from(value: Option<String>) -> Self {
        match value {
            None => RoleAssignment::Unset,
            Some(name) if name.is_empty() => RoleAssignment::Unset,
            Some(name) => match name.parse::<Role>() {
                Ok(role) => RoleAssignment::Known(role),
                Err(_) => RoleAssignment::Unrecognized(name),
            },
        }
    }
}

impl From<RoleAssignment> for Option<String> {
    fn from(value: RoleAssignment) -> Self {
        match value {
            RoleAssignment::Unset => None,
            RoleAssignment::Known(role) => Some(role.as_str().to_string()),
            RoleAssignment::Unrecognized(name) => Some(name),
        }
    }
}
