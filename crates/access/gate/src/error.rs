//! Error types for the access gate

use thiserror::Error;

/// Gate errors
#[derive(Debug, Error)]
pub enum GateError {
    /// Session claims payload could not be decoded
    #[error("Malformed session claims: {0}")]
    MalformedClaims(#[from] serde_json::Error),

    /// Claims carried an empty subject
    #[error("Session claims have no subject")]
    MissingSubject,

    /// A redirect target is itself protected by the route table
    #[error("Redirect target {location} for {kind:?} is not a public path")]
    ProtectedRedirect {
        kind: crate::gate::RedirectKind,
        location: String,
    },
}

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, GateError>;
