//! GameHub Engine - Main Entry Point
//!
//! Composition root: wires the SQLite store, the notifier and the clock into
//! the engine, runs one operation and prints its result as JSON.

mod cli;
mod logging;
mod seed;
mod sink;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use gamehub_core::application::constants::SIMULATED_NOTIFICATION_LATENCY;
use gamehub_core::application::CatalogEngine;
use gamehub_core::port::{publish, LogNotifier, ResultSink, SystemTimeProvider, TimeProvider};
use gamehub_infra_sqlite::{create_pool, run_migrations, SqliteCatalogStore};
use sink::JsonSink;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging (guard flushes the file writer on exit)
    let _log_guard = logging::init(cli.log_format, cli.log_dir.as_deref())?;
    info!("GameHub engine v{} starting...", VERSION);

    // 2. Load configuration
    let config = cli.engine_config().context("Invalid configuration")?;
    let database_url = cli.database_url()?;

    // 3. Initialize database
    info!(database_url = %database_url, "Initializing database...");
    let pool = create_pool(&database_url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteCatalogStore::new(pool));
    let notifier = Arc::new(LogNotifier::new(SIMULATED_NOTIFICATION_LATENCY));
    let sink = JsonSink::stdout();
    let now_ms = time_provider.now_millis();
    let engine = CatalogEngine::new(store.clone(), notifier, time_provider, config)?;

    // 5. Run the requested operation
    run(&engine, &store, now_ms, &sink, cli.command).await
}

async fn run(
    engine: &CatalogEngine,
    store: &SqliteCatalogStore,
    now_ms: i64,
    sink: &dyn ResultSink,
    command: Command,
) -> Result<()> {
    match command {
        Command::Seed => {
            let inserted = seed::seed_demo_catalog(store, now_ms).await?;
            publish(sink, "seed", &serde_json::json!({ "games_inserted": inserted }))?;
        }
        Command::Details { game_id } => {
            let details = engine.fetch_game_details(game_id).await?;
            publish(sink, "details", &details)?;
        }
        Command::Library { user_id } => {
            let library = engine.library_details(user_id).await?;
            publish(sink, "library", &library)?;
        }
        Command::Stats => {
            let stats = engine.dashboard_stats().await?;
            publish(sink, "stats", &stats)?;
        }
        Command::Search { term } => {
            let result = engine.search_games(&term).await?;
            publish(sink, "search", &result)?;
        }
        Command::ValidateAll { workers } => {
            let report = engine.validate_all_games(workers).await?;
            publish(sink, "validate_all", &report)?;
        }
        Command::BulkPrices {
            category,
            factor,
            workers,
        } => {
            let report = engine.bulk_update_prices(category, factor, workers).await?;
            info!(
                total = report.total,
                successful = report.successful,
                failed = report.failed,
                "Bulk price update finished"
            );
            publish(sink, "bulk_prices", &report)?;
        }
        Command::Notify {
            game_id,
            max_concurrent,
        } => {
            let report = engine.notify_game_release(game_id, max_concurrent).await?;
            publish(sink, "notify", &report)?;
        }
        Command::ProcessImages { game_id, files } => {
            let mut inputs = Vec::with_capacity(files.len());
            for path in files {
                let data = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Cannot read {}", path.display()))?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                inputs.push((filename, data));
            }
            let started = Instant::now();
            let items = engine.process_images(game_id, inputs).await;
            info!(
                items = items.len(),
                failed = items.iter().filter(|i| i.is_failed()).count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Image pipeline finished"
            );
            publish(sink, "process_images", &items)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamehub_core::application::EngineConfig;
    use gamehub_core::port::result_sink::mocks::CollectingSink;
    use gamehub_core::port::time_provider::FixedTimeProvider;
    use std::time::Duration;

    const NOW: i64 = 1_000 * 24 * 60 * 60 * 1000;

    async fn seeded_engine() -> (CatalogEngine, Arc<SqliteCatalogStore>) {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = Arc::new(SqliteCatalogStore::new(pool));
        seed::seed_demo_catalog(&store, NOW).await.unwrap();

        let config = EngineConfig {
            job_latency: Duration::from_millis(1),
            ..Default::default()
        };
        let engine = CatalogEngine::new(
            store.clone(),
            Arc::new(LogNotifier::new(Duration::from_millis(1))),
            Arc::new(FixedTimeProvider(NOW)),
            config,
        )
        .unwrap();
        (engine, store)
    }

    #[tokio::test]
    async fn test_stats_command_publishes_report() {
        let (engine, store) = seeded_engine().await;
        let sink = CollectingSink::default();
        run(&engine, &store, NOW, &sink, Command::Stats).await.unwrap();

        let received = sink.received();
        assert_eq!(received[0].0, "stats");
        let stats = &received[0].1;
        assert_eq!(stats["total_games"], 5);
        assert_eq!(stats["total_sales"], 6);
        assert_eq!(stats["recent_games"], 2);
        // Action and Puzzle tie at two games; the lower id wins
        assert_eq!(stats["top_category"], "Action");
    }

    #[tokio::test]
    async fn test_notify_command_skips_banned_users() {
        let (engine, store) = seeded_engine().await;
        let sink = CollectingSink::default();
        let command = Command::Notify {
            game_id: 2,
            max_concurrent: 2,
        };
        run(&engine, &store, NOW, &sink, command).await.unwrap();

        let report = &sink.received()[0].1;
        assert_eq!(report["total"], 4);
        assert_eq!(report["sent"], 4);
        assert_eq!(report["failed"], 0);
    }

    #[tokio::test]
    async fn test_seed_command_reports_nothing_inserted_twice() {
        let (engine, store) = seeded_engine().await;
        let sink = CollectingSink::default();
        run(&engine, &store, NOW, &sink, Command::Seed).await.unwrap();
        assert_eq!(sink.received()[0].1["games_inserted"], 0);
    }

    #[tokio::test]
    async fn test_library_command_lists_owned_games() {
        let (engine, store) = seeded_engine().await;
        let sink = CollectingSink::default();
        run(&engine, &store, NOW, &sink, Command::Library { user_id: 2 })
            .await
            .unwrap();

        let library = sink.received()[0].1.clone();
        let ids: Vec<_> = library
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["game"]["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_details_for_missing_game_fails() {
        let (engine, store) = seeded_engine().await;
        let sink = CollectingSink::default();
        let result = run(&engine, &store, NOW, &sink, Command::Details { game_id: 404 }).await;
        tokio_test::assert_err!(result);
        assert!(sink.received().is_empty());
    }
}
