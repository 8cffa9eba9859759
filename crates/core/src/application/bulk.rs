// Bulk game processing (validate / update prices) on the worker pool

use super::worker_pool::run_pool;
use crate::domain::{BulkAction, BulkJob, ErrorKind, Game, JobResult};
use crate::error::AppError;
use crate::port::DataStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Processes one BulkJob; cheap to clone into every worker
#[derive(Clone)]
pub struct BulkProcessor {
    store: Arc<dyn DataStore>,
    job_latency: Duration,
}

impl BulkProcessor {
    pub fn new(store: Arc<dyn DataStore>, job_latency: Duration) -> Self {
        Self { store, job_latency }
    }

    /// Run `action` over every game with `worker_count` workers
    pub async fn run(
        &self,
        games: Vec<Game>,
        action: BulkAction,
        worker_count: usize,
    ) -> Vec<JobResult> {
        info!(
            games = games.len(),
            action = action.as_str(),
            workers = worker_count,
            "Bulk processing started"
        );
        let jobs: Vec<BulkJob> = games
            .into_iter()
            .map(|game| BulkJob::new(game, action.clone()))
            .collect();

        let processor = self.clone();
        let results = run_pool(jobs, worker_count, move |worker_id, job| {
            let processor = processor.clone();
            async move { processor.process(worker_id, job).await }
        })
        .await;

        let failed = results.iter().filter(|r| !r.success).count();
        info!(total = results.len(), failed, "Bulk processing finished");
        results
    }

    /// Job-level errors become failed results and never escape
    pub async fn process(&self, worker_id: usize, job: BulkJob) -> JobResult {
        if !self.job_latency.is_zero() {
            tokio::time::sleep(self.job_latency).await;
        }
        let game_id = job.id();
        debug!(game_id, worker_id, action = job.action.as_str(), "Processing job");

        match job.action {
            BulkAction::Validate => match job.game.validate() {
                Ok(()) => JobResult::success(
                    game_id,
                    format!("Worker {}: Validation passed", worker_id),
                ),
                Err(e) => JobResult::failure(
                    game_id,
                    ErrorKind::ValidationFailed,
                    format!("Worker {}: Invalid game data: {}", worker_id, e),
                ),
            },
            BulkAction::UpdatePrices { factor } => {
                if !factor.is_finite() || factor < 0.0 {
                    return JobResult::failure(
                        game_id,
                        ErrorKind::ValidationFailed,
                        format!("Worker {}: Invalid price factor {}", worker_id, factor),
                    );
                }
                let new_price = job.game.price * factor;
                match self.store.update_game_price(game_id, new_price).await {
                    Ok(()) => JobResult::success(
                        game_id,
                        format!("Worker {}: Price updated to {:.2}", worker_id, new_price),
                    ),
                    Err(e) => JobResult::failure(
                        game_id,
                        e.kind(),
                        format!("Worker {}: Price update failed: {}", worker_id, e),
                    ),
                }
            }
            BulkAction::Unknown(name) => {
                let err = AppError::UnknownAction(name);
                JobResult::failure(game_id, err.kind(), format!("Worker {}: {}", worker_id, err))
            }
        }
    }
}
