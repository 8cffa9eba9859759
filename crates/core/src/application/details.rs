//! Game details fan-out / fan-in
//!
//! Four tasks run under one deadline: the primary game load, the recent
//! reviews, the related games and the per-game statistics. Related games and
//! the `same_category` statistic both depend on the primary game; they read it
//! from a write-once broadcast cell, so both observe the identical value.
//!
//! The primary load is critical: its failure is the call's error. Everything
//! else degrades to an empty/default value. On timeout the task set is
//! dropped, which aborts whatever is still running; their oneshot senders
//! never block, and nothing they produce is read.

use super::broadcast::{broadcast_once, Subscriber};
use super::constants::{DEFAULT_RELATED_LIMIT, DEFAULT_REVIEW_LIMIT};
use crate::domain::{ErrorKind, Game, GameDetails, GameId, GameStatistics, Review};
use crate::error::{AppError, Result};
use crate::port::{CountQuery, DataStore, GameFilter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct DetailsAggregator {
    store: Arc<dyn DataStore>,
    review_limit: usize,
    related_limit: usize,
}

/// Value plus the names of the branches that fell back to defaults
type Degradable<T> = (T, Vec<String>);

impl DetailsAggregator {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            review_limit: DEFAULT_REVIEW_LIMIT,
            related_limit: DEFAULT_RELATED_LIMIT,
        }
    }

    pub fn with_limits(mut self, review_limit: usize, related_limit: usize) -> Self {
        self.review_limit = review_limit;
        self.related_limit = related_limit;
        self
    }

    /// Fetch a game with its related datasets, bounded by `timeout`
    pub async fn fetch(&self, game_id: GameId, timeout: Duration) -> Result<GameDetails> {
        let started = tokio::time::Instant::now();
        match tokio::time::timeout(timeout, self.fan_out(game_id)).await {
            Ok(result) => {
                debug!(
                    game_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Details fetch finished"
                );
                result
            }
            Err(_) => {
                warn!(game_id, timeout_ms = timeout.as_millis() as u64, "Details fetch timed out");
                Err(AppError::Timeout(timeout.as_millis() as u64))
            }
        }
    }

    async fn fan_out(&self, game_id: GameId) -> Result<GameDetails> {
        // Dropping the set (on return or timeout) aborts every task still running
        let mut tasks = JoinSet::new();
        let (publisher, subscriber) = broadcast_once::<Game>();

        // (a) primary game
        let (primary_tx, primary_rx) = oneshot::channel::<Result<Arc<Game>>>();
        let store = Arc::clone(&self.store);
        tasks.spawn(async move {
            let outcome = match store.find_game(game_id).await {
                Ok(Some(game)) => Ok(publisher.publish(game)),
                Ok(None) => {
                    publisher.abandon();
                    Err(AppError::NotFound(format!("Game {} not found", game_id)))
                }
                Err(e) => {
                    publisher.abandon();
                    Err(e)
                }
            };
            let _ = primary_tx.send(outcome);
        });

        // (b) recent reviews
        let (reviews_tx, reviews_rx) = oneshot::channel::<Degradable<Vec<Review>>>();
        let store = Arc::clone(&self.store);
        let review_limit = self.review_limit;
        tasks.spawn(async move {
            let reviews = match store.list_recent_reviews(game_id, review_limit).await {
                Ok(reviews) => (reviews, Vec::new()),
                Err(e) => {
                    warn!(game_id, error = %e, "Reviews unavailable, using empty list");
                    (Vec::new(), vec!["reviews".to_string()])
                }
            };
            let _ = reviews_tx.send(reviews);
        });

        // (c) related games, after the primary game
        let (related_tx, related_rx) = oneshot::channel::<Degradable<Vec<Game>>>();
        let store = Arc::clone(&self.store);
        let mut primary = subscriber.clone();
        let related_limit = self.related_limit;
        tasks.spawn(async move {
            let related = match primary.wait().await {
                None => (Vec::new(), Vec::new()),
                Some(game) => {
                    let filter = GameFilter::InCategory {
                        category_id: game.category_id,
                        exclude: Some(game.id),
                    };
                    match store.list_games(&filter, related_limit).await {
                        Ok(games) => (games, Vec::new()),
                        Err(e) => {
                            warn!(game_id, error = %e, "Related games unavailable");
                            (Vec::new(), vec!["related_games".to_string()])
                        }
                    }
                }
            };
            let _ = related_tx.send(related);
        });

        // (d) statistics; same_category also waits for the primary game
        let (stats_tx, stats_rx) = oneshot::channel::<Degradable<GameStatistics>>();
        let store = Arc::clone(&self.store);
        tasks.spawn(async move {
            let stats = game_statistics(store.as_ref(), game_id, subscriber).await;
            let _ = stats_tx.send(stats);
        });

        let game = primary_rx
            .await
            .map_err(|_| AppError::Internal("primary game task dropped".to_string()))??;
        let (reviews, mut degraded) = reviews_rx
            .await
            .map_err(|_| AppError::Internal("reviews task dropped".to_string()))?;
        let (related_games, related_degraded) = related_rx
            .await
            .map_err(|_| AppError::Internal("related games task dropped".to_string()))?;
        let (statistics, stats_degraded) = stats_rx
            .await
            .map_err(|_| AppError::Internal("statistics task dropped".to_string()))?;
        degraded.extend(related_degraded);
        degraded.extend(stats_degraded);

        // The related/stats tasks may still hold a clone until they exit
        let game = Arc::try_unwrap(game).unwrap_or_else(|arc| (*arc).clone());
        info!(
            game_id,
            reviews = reviews.len(),
            related = related_games.len(),
            degraded = degraded.len(),
            "Game details assembled"
        );

        Ok(GameDetails {
            game,
            reviews,
            related_games,
            statistics,
            error: (!degraded.is_empty()).then_some(ErrorKind::DependencyUnavailable),
            degraded,
        })
    }
}

/// Each field comes from exactly one concurrent sub-query
async fn game_statistics(
    store: &dyn DataStore,
    game_id: GameId,
    mut primary: Subscriber<Game>,
) -> Degradable<GameStatistics> {
    let same_category = async {
        match primary.wait().await {
            Some(game) => store
                .count(CountQuery::GamesInCategory(game.category_id))
                .await
                .map(Some),
            None => Ok(None),
        }
    };

    let (total_reviews, average_rating, total_owners, same_category) = tokio::join!(
        store.count(CountQuery::ReviewsForGame(game_id)),
        store.average_rating(Some(game_id)),
        store.count(CountQuery::OwnersOfGame(game_id)),
        same_category,
    );

    let mut degraded = Vec::new();
    let mut field = |name: &str, outcome: Result<()>| {
        if let Err(e) = outcome {
            warn!(game_id, field = name, error = %e, "Statistic unavailable, using default");
            degraded.push(format!("statistics.{}", name));
        }
    };

    let mut stats = GameStatistics::default();
    field("total_reviews", total_reviews.map(|v| stats.total_reviews = v));
    field("average_rating", average_rating.map(|v| stats.average_rating = v));
    field("total_owners", total_owners.map(|v| stats.total_owners = v));
    field(
        "same_category",
        same_category.map(|v| stats.same_category = v.unwrap_or_default()),
    );
    (stats, degraded)
}
