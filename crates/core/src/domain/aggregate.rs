// Aggregate values returned to the Result Sink
//
// Each aggregate is assembled by the orchestrating task from values received
// over channels; no field is written by two tasks.

use super::catalog::{Game, GameId, Review};
use super::error::ErrorKind;
use super::job::JobResult;
use super::notification::NotificationResult;
use serde::{Serialize, Serializer};
use std::time::Duration;

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Per-game statistics computed alongside the details fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameStatistics {
    pub total_reviews: i64,
    pub average_rating: f64,
    pub total_owners: i64,
    /// Games sharing the primary game's category (depends on the primary load)
    pub same_category: i64,
}

/// Game with its related datasets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameDetails {
    pub game: Game,
    pub reviews: Vec<Review>,
    pub related_games: Vec<Game>,
    pub statistics: GameStatistics,
    /// Non-critical branches that fell back to their default value
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
    /// `DependencyUnavailable` when anything degraded
    pub error: Option<ErrorKind>,
}

/// Admin dashboard report; either fully computed or not returned at all
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_games: i64,
    pub total_reviews: i64,
    pub total_sales: i64,
    pub active_users: i64,
    pub recent_games: i64,
    pub average_rating: f64,
    pub top_category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// Deduplicated by game id, order unspecified
    pub games: Vec<Game>,
    pub total_found: usize,
    #[serde(rename = "search_time_ms", serialize_with = "as_millis")]
    pub search_time: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<JobResult>,
    #[serde(rename = "processing_time_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl BulkReport {
    pub fn new(results: Vec<JobResult>, elapsed: Duration) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
            elapsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidGame {
    pub game_id: GameId,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub total: usize,
    pub valid: Vec<GameId>,
    pub invalid: Vec<InvalidGame>,
    #[serde(rename = "validation_time_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl ValidationReport {
    pub fn new(results: Vec<JobResult>, elapsed: Duration) -> Self {
        let total = results.len();
        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for result in results {
            if result.success {
                valid.push(result.game_id);
            } else {
                invalid.push(InvalidGame {
                    game_id: result.game_id,
                    error: result.message,
                });
            }
        }
        valid.sort_unstable();
        invalid.sort_by_key(|g| g.game_id);
        Self {
            total,
            valid,
            invalid,
            elapsed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<NotificationResult>,
    #[serde(rename = "time_taken_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl DispatchReport {
    pub fn new(results: Vec<NotificationResult>, elapsed: Duration) -> Self {
        let sent = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            sent,
            failed: results.len() - sent,
            results,
            elapsed,
        }
    }

    pub fn failures_by_kind(&self, kind: ErrorKind) -> usize {
        self.results
            .iter()
            .filter(|r| r.error == Some(kind))
            .count()
    }
}
