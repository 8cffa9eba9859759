// Domain Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Game name must not be empty")]
    EmptyName,

    #[error("Game name too long: {0} chars (max 200)")]
    NameTooLong(usize),

    #[error("Game price must not be negative: {0}")]
    NegativePrice(f64),

    #[error("Game price must be a finite number")]
    NonFinitePrice,

    #[error("Game description too long: {0} chars (max 2000)")]
    DescriptionTooLong(usize),

    #[error("Invalid category id: {0}")]
    InvalidCategory(i64),

    #[error("Invalid rating: {0} (expected 1..=5)")]
    InvalidRating(i32),
}

pub type Result<T> = std::result::Result<T, DomainError>;

/// Cloneable failure classification carried by per-item results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    Timeout,
    ValidationFailed,
    DependencyUnavailable,
    UnknownAction,
    Suspended,
    Store,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::Timeout => write!(f, "TIMEOUT"),
            ErrorKind::ValidationFailed => write!(f, "VALIDATION_FAILED"),
            ErrorKind::DependencyUnavailable => write!(f, "DEPENDENCY_UNAVAILABLE"),
            ErrorKind::UnknownAction => write!(f, "UNKNOWN_ACTION"),
            ErrorKind::Suspended => write!(f, "SUSPENDED"),
            ErrorKind::Store => write!(f, "STORE"),
        }
    }
}
