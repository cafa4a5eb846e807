//! Error types for access type parsing

use thiserror::Error;

/// Raised when a role name is not one of the known roles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {name}")]
pub struct RoleParseError {
    pub name: String,
}

/// Result type for access type operations
pub type Result<T> = std::result::Result<T, RoleParseError>;
