//! Error types for the access guard

use thiserror::Error;

/// Guard errors
#[derive(Debug, Error)]
pub enum GuardError {
    /// Profile directory lock was poisoned
    #[error("Profile directory lock poisoned")]
    LockPoisoned,

    /// The watched channel has no sender left
    #[error("Access watch closed")]
    Closed,

    /// Failure reported by a `ProfileSource` backed by a remote store.
    ///
    /// The in-memory directory never returns it.
    #[error("Data layer error: {0}")]
    DataLayer(String),

    /// Following a subscription needs a tokio runtime to spawn onto
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),
}

/// Result type for guard operations
pub type Result<T> = std::result::Result<T, GuardError>;
