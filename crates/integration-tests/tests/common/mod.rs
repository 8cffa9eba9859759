//! Shared fixtures: a seeded SQLite catalog and an engine wired to it

#![allow(dead_code)]

use gamehub_core::application::{CatalogEngine, EngineConfig};
use gamehub_core::domain::{Category, Game, Ownership, Review, User};
use gamehub_core::port::notifier::mocks::RecordingNotifier;
use gamehub_core::port::time_provider::FixedTimeProvider;
use gamehub_infra_sqlite::{create_pool, run_migrations, SqliteCatalogStore};
use std::sync::Arc;
use std::time::Duration;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const NOW: i64 = 20_000 * DAY_MS;

pub struct Fixture {
    pub store: Arc<SqliteCatalogStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub engine: CatalogEngine,
}

pub async fn empty_store() -> Arc<SqliteCatalogStore> {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    Arc::new(SqliteCatalogStore::new(pool))
}

/// Categories: 1 Shooter, 2 Puzzle, 3 Racing (empty)
/// Games: 1-3 shooters, 4-5 puzzles, 6 has an empty name
/// Users: 1-4 active, 5 banned
pub async fn seeded_store() -> Arc<SqliteCatalogStore> {
    let store = empty_store().await;

    for category in [
        Category::new(1, "Shooter"),
        Category::new(2, "Puzzle"),
        Category::new(3, "Racing"),
    ] {
        store.insert_category(&category).await.unwrap();
    }

    for user in [
        User::new(1, "Ana"),
        User::new(2, "Ben"),
        User::new(3, "Cleo"),
        User::new(4, "Dev"),
        User::new(5, "Eli").banned(),
    ] {
        store.insert_user(&user).await.unwrap();
    }

    let games = [
        Game::new(1, "Bullet Storm", 30.0, 1).with_created_at(NOW - 100 * DAY_MS),
        Game::new(2, "Neon Strike", 20.0, 1)
            .with_description("Fast shooter with puzzle rooms")
            .with_created_at(NOW - 3 * DAY_MS),
        Game::new(3, "Sniper Hill", 10.0, 1).with_created_at(NOW - 10 * DAY_MS),
        Game::new(4, "Block Logic", 5.0, 2).with_created_at(NOW - 60 * DAY_MS),
        Game::new(5, "Mind Maze", 8.0, 2).with_created_at(NOW - 31 * DAY_MS),
        Game::new(6, "", 1.0, 2).with_created_at(NOW - 400 * DAY_MS),
    ];
    for game in &games {
        store.insert_game(game).await.unwrap();
    }

    for (id, user_id, game_id, rating, age_days) in [
        (1, 1, 1, 5, 9),
        (2, 2, 1, 4, 5),
        (3, 3, 1, 3, 1),
        (4, 1, 4, 2, 2),
    ] {
        let review = Review::new(id, user_id, game_id, rating)
            .unwrap()
            .with_created_at(NOW - age_days * DAY_MS);
        store.insert_review(&review).await.unwrap();
    }

    for (id, user_id, game_id) in [(1, 1, 1), (2, 2, 1), (3, 3, 2), (4, 4, 4)] {
        store
            .insert_ownership(&Ownership::owned(id, user_id, game_id))
            .await
            .unwrap();
    }

    store
}

pub fn fast_config() -> EngineConfig {
    EngineConfig {
        job_latency: Duration::from_millis(1),
        ..Default::default()
    }
}

pub async fn fixture() -> Fixture {
    fixture_with(fast_config()).await
}

pub async fn fixture_with(config: EngineConfig) -> Fixture {
    let store = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new(Duration::from_millis(2)));
    let engine = CatalogEngine::new(
        store.clone(),
        notifier.clone(),
        Arc::new(FixedTimeProvider(NOW)),
        config,
    )
    .unwrap();
    Fixture {
        store,
        notifier,
        engine,
    }
}
