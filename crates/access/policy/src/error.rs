//! Error types for route table configuration

use thiserror::Error;

/// Route table validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    /// Prefix does not start with '/'
    #[error("Invalid route prefix: {prefix}")]
    InvalidPrefix { prefix: String },

    /// Same prefix declared twice
    #[error("Duplicate route prefix: {prefix}")]
    DuplicatePrefix { prefix: String },

    /// Admin-only rule that also names non-admin roles
    #[error("Admin-only route {prefix} cannot list non-admin roles")]
    ConflictingRequirement { prefix: String },
}

/// Result type for route table operations
pub type Result<T> = std::result::Result<T, RouteTableError>;
