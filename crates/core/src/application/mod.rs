// Application Layer - Engine operations

pub mod broadcast;
pub mod bulk;
pub mod config;
pub mod constants;
pub mod details;
pub mod dispatcher;
pub mod gate;
pub mod pipeline;
pub mod search;
pub mod service;
pub mod stats;
pub mod worker_pool;

// Re-exports
pub use broadcast::{broadcast_once, Publisher, Subscriber};
pub use bulk::BulkProcessor;
pub use config::EngineConfig;
pub use details::DetailsAggregator;
pub use dispatcher::Dispatcher;
pub use gate::StageGate;
pub use pipeline::{ImagePipeline, PipelineConfig, StageVisits};
pub use search::SearchMerger;
pub use service::CatalogEngine;
pub use stats::StatsAggregator;
pub use worker_pool::run_pool;
