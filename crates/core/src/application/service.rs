// Catalog Engine - one entry point per operation

use super::bulk::BulkProcessor;
use super::config::EngineConfig;
use super::details::DetailsAggregator;
use super::dispatcher::Dispatcher;
use super::pipeline::ImagePipeline;
use super::search::SearchMerger;
use super::stats::StatsAggregator;
use crate::domain::{
    BulkAction, BulkReport, CategoryId, DashboardStats, DispatchReport, Game, GameDetails,
    GameId, JobResult, NotificationResult, NotificationTask, PipelineItem, SearchResult, UserId,
    ValidationReport,
};
use crate::error::{AppError, Result};
use crate::port::{DataStore, GameFilter, Notifier, TimeProvider, UserFilter};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Catalog Engine
///
/// Owns no state between calls; every collaborator is injected once by the
/// process entry point and shared by reference.
pub struct CatalogEngine {
    store: Arc<dyn DataStore>,
    time_provider: Arc<dyn TimeProvider>,
    config: EngineConfig,
    bulk: BulkProcessor,
    details: DetailsAggregator,
    dispatcher: Dispatcher,
    stats: StatsAggregator,
    search: SearchMerger,
}

impl CatalogEngine {
    pub fn new(
        store: Arc<dyn DataStore>,
        notifier: Arc<dyn Notifier>,
        time_provider: Arc<dyn TimeProvider>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bulk: BulkProcessor::new(Arc::clone(&store), config.job_latency),
            details: DetailsAggregator::new(Arc::clone(&store))
                .with_limits(config.review_limit, config.related_limit),
            dispatcher: Dispatcher::new(Arc::clone(&store), notifier),
            stats: StatsAggregator::new(Arc::clone(&store), Arc::clone(&time_provider)),
            search: SearchMerger::new(Arc::clone(&store)).with_limit(config.search_limit),
            store,
            time_provider,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Game with reviews, related games and statistics (configured deadline)
    pub async fn fetch_game_details(&self, game_id: GameId) -> Result<GameDetails> {
        self.details.fetch(game_id, self.config.details_timeout).await
    }

    pub async fn fetch_game_details_within(
        &self,
        game_id: GameId,
        timeout: Duration,
    ) -> Result<GameDetails> {
        self.details.fetch(game_id, timeout).await
    }

    /// Details for every game the user owns; games that fail are left out entirely
    pub async fn library_details(&self, user_id: UserId) -> Result<Vec<GameDetails>> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        let game_ids = self.store.list_owned_game_ids(user_id).await?;

        let fetches = game_ids
            .iter()
            .map(|&id| async move { (id, self.fetch_game_details(id).await) });

        let mut library = Vec::with_capacity(game_ids.len());
        for (game_id, outcome) in join_all(fetches).await {
            match outcome {
                Ok(details) => library.push(details),
                Err(e) => warn!(user_id, game_id, error = %e, "Skipping library game"),
            }
        }
        info!(user_id, owned = game_ids.len(), returned = library.len(), "Library assembled");
        Ok(library)
    }

    /// Run one action over the given games with a bounded worker pool
    pub async fn process_bulk_games(
        &self,
        games: Vec<Game>,
        action: BulkAction,
        worker_count: usize,
    ) -> Vec<JobResult> {
        self.bulk.run(games, action, worker_count).await
    }

    /// Multiply the price of every game (optionally one category) by `factor`
    pub async fn bulk_update_prices(
        &self,
        category_id: Option<CategoryId>,
        factor: f64,
        worker_count: usize,
    ) -> Result<BulkReport> {
        let filter = match category_id {
            Some(category_id) => GameFilter::InCategory {
                category_id,
                exclude: None,
            },
            None => GameFilter::All,
        };
        let games = self.store.list_games(&filter, 0).await?;
        if games.is_empty() {
            return Err(AppError::NotFound("No games found".to_string()));
        }

        let started = Instant::now();
        let worker_count = self.workers_or(worker_count, self.config.bulk_workers);
        let results = self
            .bulk
            .run(games, BulkAction::UpdatePrices { factor }, worker_count)
            .await;
        Ok(BulkReport::new(results, started.elapsed()))
    }

    /// Validate the whole catalog
    pub async fn validate_all_games(&self, worker_count: usize) -> Result<ValidationReport> {
        let games = self.store.list_games(&GameFilter::All, 0).await?;
        let started = Instant::now();
        let worker_count = self.workers_or(worker_count, self.config.validation_workers);
        let results = self.bulk.run(games, BulkAction::Validate, worker_count).await;
        let report = ValidationReport::new(results, started.elapsed());
        info!(
            total = report.total,
            invalid = report.invalid.len(),
            "Catalog validation finished"
        );
        Ok(report)
    }

    /// Dispatch notifications with at most `max_concurrent` in flight
    pub async fn send_notifications(
        &self,
        tasks: Vec<NotificationTask>,
        max_concurrent: usize,
    ) -> Vec<NotificationResult> {
        self.dispatcher.dispatch(tasks, max_concurrent).await
    }

    /// Tell every active user about a game
    pub async fn notify_game_release(
        &self,
        game_id: GameId,
        max_concurrent: usize,
    ) -> Result<DispatchReport> {
        let game = self
            .store
            .find_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))?;
        let users = self.store.list_users(UserFilter::Active).await?;

        let message = format!("New game released: {}", game.name);
        let tasks: Vec<NotificationTask> = users
            .iter()
            .map(|u| NotificationTask::push(u.id, message.clone()))
            .collect();

        let started = Instant::now();
        let max_concurrent =
            self.workers_or(max_concurrent, self.config.max_concurrent_notifications);
        let results = self.dispatcher.dispatch(tasks, max_concurrent).await;
        Ok(DispatchReport::new(results, started.elapsed()))
    }

    /// Push a game's images through validate -> transform -> enrich
    pub async fn process_images(
        &self,
        game_id: GameId,
        files: Vec<(String, Vec<u8>)>,
    ) -> Vec<PipelineItem> {
        let items = files
            .into_iter()
            .map(|(filename, data)| PipelineItem::new(game_id, filename, data))
            .collect();
        let pipeline =
            ImagePipeline::new(self.config.pipeline.clone(), Arc::clone(&self.time_provider));
        pipeline.run(items).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.stats.compute(self.config.stats_timeout).await
    }

    pub async fn search_games(&self, term: &str) -> Result<SearchResult> {
        self.search.search(term).await
    }

    fn workers_or(&self, requested: usize, default: usize) -> usize {
        if requested == 0 {
            default
        } else {
            requested
        }
    }
}
