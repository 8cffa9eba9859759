// Central Error Type for the Engine

use crate::domain::ErrorKind;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Recipient suspended: {0}")]
    RecipientSuspended(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Classify the error for per-item results (which must stay cloneable)
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Timeout(_) => ErrorKind::Timeout,
            AppError::ValidationFailed(_) | AppError::Domain(_) => ErrorKind::ValidationFailed,
            AppError::DependencyUnavailable(_) => ErrorKind::DependencyUnavailable,
            AppError::UnknownAction(_) => ErrorKind::UnknownAction,
            AppError::RecipientSuspended(_) => ErrorKind::Suspended,
            AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::Config(_)
            | AppError::Internal(_) => ErrorKind::Store,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in the infra-sqlite crate
// by converting to AppError::Database(String)
