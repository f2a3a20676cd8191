//! Error kinds shared by every core operation.

use uuid::Uuid;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur during core operations.
///
/// Every operation returns a tagged result; the boundary layer maps these to
/// user-visible responses. A guard failure always rejects the operation
/// atomically - no partial state change is ever observable.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {entity} {uuid}")]
    NotFound { entity: &'static str, uuid: Uuid },

    #[error("{0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl CoreError {
    /// Shorthand for a missing entity.
    pub fn not_found(entity: &'static str, uuid: Uuid) -> Self {
        Self::NotFound { entity, uuid }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a permission failure.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// True when the error came from lock contention on a concurrent write.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Database(sqlx::Error::Database(e)) => {
                e.message().contains("database is locked")
            }
            _ => false,
        }
    }
}
