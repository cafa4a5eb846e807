//! Careguard access types
//!
//! Shared vocabulary for the care application's access policy:
//! - [`Role`] and the static rank ladder
//! - [`ApprovalStatus`] and [`IdentityProfile`], read from the backend
//! - [`RouteRequirement`], declared per route
//! - [`AccessDecision`], the evaluator's output

#![deny(unsafe_code)]

pub mod decision;
pub mod error;
pub mod profile;
pub mod requirement;
pub mod role;

pub use decision::{AccessDecision, AccessVerdict, DecisionReason};
pub use error::{Result, RoleParseError};
pub use profile::{ApprovalStatus, IdentityId, IdentityProfile, ProfileLookup};
pub use requirement::RouteRequirement;
pub use role::{Role, RoleAssignment};
