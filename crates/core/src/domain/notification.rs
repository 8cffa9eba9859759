// Notification Domain Model

use super::catalog::UserId;
use super::error::ErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Push,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTask {
    pub target_id: UserId,
    pub message: String,
    pub kind: NotificationKind,
}

impl NotificationTask {
    pub fn push(target_id: UserId, message: impl Into<String>) -> Self {
        Self {
            target_id,
            message: message.into(),
            kind: NotificationKind::Push,
        }
    }
}

/// Answer for the task at the same index of the dispatched list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResult {
    pub target_id: UserId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl NotificationResult {
    pub fn delivered(target_id: UserId) -> Self {
        Self {
            target_id,
            success: true,
            error: None,
        }
    }

    pub fn failed(target_id: UserId, error: ErrorKind) -> Self {
        Self {
            target_id,
            success: false,
            error: Some(error),
        }
    }
}
