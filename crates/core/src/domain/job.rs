// Bulk Job Domain Model

use super::catalog::{Game, GameId};
use super::error::ErrorKind;
use serde::{Deserialize, Serialize};

/// Action requested for every game of a bulk run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    /// Check catalog invariants, no writes
    Validate,
    /// Multiply the price by the factor and persist it
    UpdatePrices { factor: f64 },
    /// Anything the engine does not support (recorded per job as a failure)
    Unknown(String),
}

impl BulkAction {
    /// Parse the action name used by callers; `value` is the price factor
    pub fn parse(name: &str, value: f64) -> Self {
        match name {
            "validate" => BulkAction::Validate,
            "update_prices" | "discount" => BulkAction::UpdatePrices { factor: value },
            other => BulkAction::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BulkAction::Validate => "validate",
            BulkAction::UpdatePrices { .. } => "update_prices",
            BulkAction::Unknown(name) => name,
        }
    }
}

/// Unit of work for the bulk worker pool. Immutable once enqueued.
#[derive(Debug, Clone)]
pub struct BulkJob {
    pub game: Game,
    pub action: BulkAction,
}

impl BulkJob {
    pub fn new(game: Game, action: BulkAction) -> Self {
        Self { game, action }
    }

    pub fn id(&self) -> GameId {
        self.game.id
    }
}

/// Outcome of exactly one BulkJob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub game_id: GameId,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl JobResult {
    pub fn success(game_id: GameId, message: impl Into<String>) -> Self {
        Self {
            game_id,
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn failure(game_id: GameId, error: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            game_id,
            success: false,
            message: message.into(),
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!(BulkAction::parse("validate", 0.0), BulkAction::Validate);
        assert_eq!(
            BulkAction::parse("update_prices", 0.5),
            BulkAction::UpdatePrices { factor: 0.5 }
        );
        assert_eq!(
            BulkAction::parse("delete", 0.0),
            BulkAction::Unknown("delete".to_string())
        );
        assert_eq!(BulkAction::parse("delete", 0.0).as_str(), "delete");
    }
}
