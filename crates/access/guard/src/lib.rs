//! Careguard access guard
//!
//! Re-runs the access policy whenever the signed-in identity, its profile
//! or the route requirement changes, and publishes what the presentation
//! layer should show.
//!
//! The external session and data layers are reached through
//! [`SessionSource`] and [`ProfileSource`]; in-memory versions are provided
//! for tests and for the daemon.

#![deny(unsafe_code)]

pub mod error;
pub mod outcome;
pub mod source;
pub mod watch;

pub use error::{GuardError, Result};
pub use outcome::{GuardOutcome, NavAction, Screen, ScreenKind};
pub use source::{InMemoryProfileDirectory, ProfileSource, SessionSource, StaticSession};
pub use watch::{AccessWatch, GuardInputs, GuardSnapshot};
