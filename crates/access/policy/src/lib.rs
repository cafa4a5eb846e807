//! Careguard access policy
//!
//! Decides whether a signed-in identity may view a route of the care
//! application, given its backend profile and the route's requirement.
//!
//! - [`evaluate`] / [`explain`]: the pure decision function
//! - [`AccessEvaluator`]: the same, with audit logging
//! - [`RouteTable`]: per-route requirements with longest-prefix lookup

#![deny(unsafe_code)]

pub mod error;
pub mod evaluator;
pub mod routes;

pub use error::{Result, RouteTableError};
pub use evaluator::{evaluate, explain, AccessEvaluator};
pub use routes::{RouteMatch, RouteRule, RouteTable};
