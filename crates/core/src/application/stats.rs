//! Dashboard statistics
//!
//! Eight independent sub-queries run concurrently under one deadline. Each
//! sub-query produces exactly one field. The first error (or the deadline)
//! ends the whole report: the remaining sub-queries are dropped and no partial
//! report is returned.

use super::constants::{RECENT_GAMES_WINDOW_MS, TOP_CATEGORY_FALLBACK};
use crate::domain::DashboardStats;
use crate::error::{AppError, Result};
use crate::port::{CountQuery, DataStore, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct StatsAggregator {
    store: Arc<dyn DataStore>,
    time_provider: Arc<dyn TimeProvider>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn DataStore>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            store,
            time_provider,
        }
    }

    pub async fn compute(&self, timeout: Duration) -> Result<DashboardStats> {
        match tokio::time::timeout(timeout, self.compute_all()).await {
            Ok(Ok(stats)) => {
                info!(
                    games = stats.total_games,
                    users = stats.total_users,
                    top_category = %stats.top_category,
                    "Dashboard statistics computed"
                );
                Ok(stats)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Dashboard statistics failed");
                Err(e)
            }
            Err(_) => Err(AppError::Timeout(timeout.as_millis() as u64)),
        }
    }

    async fn compute_all(&self) -> Result<DashboardStats> {
        let store = self.store.as_ref();
        let recent_since = self.time_provider.now_millis() - RECENT_GAMES_WINDOW_MS;

        let (
            total_users,
            total_games,
            total_reviews,
            total_sales,
            active_users,
            recent_games,
            average_rating,
            top_category,
        ) = tokio::try_join!(
            store.count(CountQuery::Users),
            store.count(CountQuery::Games),
            store.count(CountQuery::Reviews),
            store.count(CountQuery::Ownerships),
            store.count(CountQuery::ActiveUsers),
            store.count(CountQuery::GamesCreatedSince(recent_since)),
            store.average_rating(None),
            top_category_label(store),
        )?;

        Ok(DashboardStats {
            total_users,
            total_games,
            total_reviews,
            total_sales,
            active_users,
            recent_games,
            average_rating,
            top_category,
        })
    }
}

/// Group-by-count winner, then the label lookup by the winning key
async fn top_category_label(store: &dyn DataStore) -> Result<String> {
    let Some((category_id, _)) = store.top_category().await? else {
        return Ok(TOP_CATEGORY_FALLBACK.to_string());
    };
    Ok(store
        .find_category(category_id)
        .await?
        .map(|c| c.name)
        .unwrap_or_else(|| TOP_CATEGORY_FALLBACK.to_string()))
}
