// Parallel search: name, description and category predicates merged by game id

use super::constants::DEFAULT_SEARCH_LIMIT;
use crate::domain::{Game, GameId, SearchResult};
use crate::error::{AppError, Result};
use crate::port::{DataStore, GameFilter};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

pub struct SearchMerger {
    store: Arc<dyn DataStore>,
    limit: usize,
}

impl SearchMerger {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Cap applied to each predicate query (not to the merged result)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub async fn search(&self, term: &str) -> Result<SearchResult> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::ValidationFailed(
                "search query is required".to_string(),
            ));
        }
        let started = Instant::now();
        let store = self.store.as_ref();
        let by_name_filter = GameFilter::NameContains(term.to_string());
        let by_description_filter = GameFilter::DescriptionContains(term.to_string());

        let (by_name, by_description, by_category) = tokio::try_join!(
            store.list_games(&by_name_filter, self.limit),
            store.list_games(&by_description_filter, self.limit),
            self.search_category(term),
        )?;

        let mut merged: HashMap<GameId, Game> = HashMap::new();
        for game in by_name.into_iter().chain(by_description).chain(by_category) {
            merged.insert(game.id, game);
        }
        let games: Vec<Game> = merged.into_values().collect();

        let search_time = started.elapsed();
        info!(
            term,
            total_found = games.len(),
            elapsed_ms = search_time.as_millis() as u64,
            "Search finished"
        );
        Ok(SearchResult {
            total_found: games.len(),
            games,
            search_time,
        })
    }

    /// A term that names no category is not an error
    async fn search_category(&self, term: &str) -> Result<Vec<Game>> {
        match self.store.find_category_by_name(term).await? {
            Some(category) => {
                let filter = GameFilter::InCategory {
                    category_id: category.id,
                    exclude: None,
                };
                self.store.list_games(&filter, self.limit).await
            }
            None => Ok(Vec::new()),
        }
    }
}
