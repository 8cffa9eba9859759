// Command line & environment configuration

use crate::logging::LogFormat;
use clap::{Parser, Subcommand};
use gamehub_core::application::EngineConfig;
use gamehub_core::domain::{CategoryId, GameId, UserId};
use gamehub_core::error::{AppError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "~/.gamehub/catalog.db";

#[derive(Debug, Parser)]
#[command(name = "gamehub-engine")]
#[command(about = "GameHub concurrent aggregation engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database file (or a full sqlite: URL)
    #[arg(long, global = true, env = "GAMEHUB_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    /// Deadline for a details fetch
    #[arg(long, global = true, env = "GAMEHUB_DETAILS_TIMEOUT_MS")]
    pub details_timeout_ms: Option<u64>,

    /// Deadline for the dashboard report
    #[arg(long, global = true, env = "GAMEHUB_STATS_TIMEOUT_MS")]
    pub stats_timeout_ms: Option<u64>,

    /// Default worker count for bulk operations
    #[arg(long, global = true, env = "GAMEHUB_WORKERS")]
    pub default_workers: Option<usize>,

    #[arg(long, global = true, env = "GAMEHUB_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Also write daily-rolling log files here
    #[arg(long, global = true, env = "GAMEHUB_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a small demo catalog into an empty database
    Seed,

    /// Game with reviews, related games and statistics
    Details { game_id: GameId },

    /// Details for every game a user owns (failures are skipped)
    Library { user_id: UserId },

    /// Dashboard statistics
    Stats,

    /// Search games by name, description and category
    Search { term: String },

    /// Validate every game in the catalog
    ValidateAll {
        /// Worker count (0 = configured default)
        #[arg(short, long, default_value = "0")]
        workers: usize,
    },

    /// Multiply game prices by a factor
    BulkPrices {
        /// Restrict to one category
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Price multiplier, e.g. 0.8 for a 20% discount
        #[arg(short, long)]
        factor: f64,

        /// Worker count (0 = configured default)
        #[arg(short, long, default_value = "0")]
        workers: usize,
    },

    /// Notify every active user about a game
    Notify {
        game_id: GameId,

        /// Maximum deliveries in flight (0 = configured default)
        #[arg(short, long, default_value = "0")]
        max_concurrent: usize,
    },

    /// Run image files through the processing pipeline
    ProcessImages {
        game_id: GameId,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    /// Defaults overridden by whatever flags / env vars were given
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::default();
        if let Some(ms) = self.details_timeout_ms {
            config.details_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.stats_timeout_ms {
            config.stats_timeout = Duration::from_millis(ms);
        }
        if let Some(workers) = self.default_workers {
            if workers == 0 {
                return Err(AppError::Config("GAMEHUB_WORKERS must be > 0".to_string()));
            }
            config.bulk_workers = workers;
            config.validation_workers = workers;
        }
        config.validate()?;
        Ok(config)
    }

    /// sqlx connection URL for the configured database
    pub fn database_url(&self) -> Result<String> {
        if self.db_path.starts_with("sqlite:") {
            return Ok(self.db_path.clone());
        }
        let path = shellexpand::full(&self.db_path)
            .map_err(|e| AppError::Config(format!("Invalid db path: {}", e)))?
            .into_owned();
        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Config(format!("Cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        Ok(format!("sqlite://{}", path))
    }
}
