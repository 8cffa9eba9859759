// Engine configuration

use super::constants::*;
use super::pipeline::PipelineConfig;
use crate::error::{AppError, Result};
use std::time::Duration;

/// Limits and deadlines for every engine operation
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Workers for bulk price updates
    pub bulk_workers: usize,

    /// Workers for whole-catalog validation
    pub validation_workers: usize,

    /// In-flight cap for notification dispatch
    pub max_concurrent_notifications: usize,

    /// Deadline for the game details fan-out
    pub details_timeout: Duration,

    /// Deadline for the dashboard report
    pub stats_timeout: Duration,

    pub review_limit: usize,
    pub related_limit: usize,
    pub search_limit: usize,

    /// Simulated latency of one bulk job
    pub job_latency: Duration,

    pub pipeline: PipelineConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bulk_workers: DEFAULT_WORKER_COUNT,
            validation_workers: DEFAULT_VALIDATION_WORKERS,
            max_concurrent_notifications: DEFAULT_MAX_CONCURRENT_NOTIFICATIONS,
            details_timeout: DEFAULT_DETAILS_TIMEOUT,
            stats_timeout: DEFAULT_STATS_TIMEOUT,
            review_limit: DEFAULT_REVIEW_LIMIT,
            related_limit: DEFAULT_RELATED_LIMIT,
            search_limit: DEFAULT_SEARCH_LIMIT,
            job_latency: SIMULATED_JOB_LATENCY,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reject values that would make an operation hang or do nothing
    pub fn validate(&self) -> Result<()> {
        if self.details_timeout.is_zero() {
            return Err(AppError::Config("details_timeout must be > 0".to_string()));
        }
        if self.stats_timeout.is_zero() {
            return Err(AppError::Config("stats_timeout must be > 0".to_string()));
        }
        if self.search_limit == 0 {
            return Err(AppError::Config("search_limit must be > 0".to_string()));
        }
        let stages = [
            ("validate_workers", self.pipeline.validate_workers),
            ("transform_workers", self.pipeline.transform_workers),
            ("enrich_workers", self.pipeline.enrich_workers),
        ];
        for (name, workers) in stages {
            if workers == 0 {
                return Err(AppError::Config(format!("pipeline {} must be > 0", name)));
            }
        }
        Ok(())
    }
}
