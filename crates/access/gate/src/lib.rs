//! Careguard access gate
//!
//! Server-side mirror of the access policy. It re-derives decisions from
//! the identity provider's session claims so a request can be redirected
//! before a page renders. It evaluates through the same policy function as
//! the client-side guard, so the two cannot disagree.

#![deny(unsafe_code)]

pub mod claims;
pub mod error;
pub mod gate;
pub mod middleware;

pub use claims::{ClaimsMetadata, SessionClaims};
pub use error::{GateError, Result};
pub use gate::{GateCheck, GateOutcome, GateRedirects, RedirectKind, RouteGate};
pub use middleware::{enforce_route_gate, route_gate_layer};
