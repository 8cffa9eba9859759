// Demo catalog

use gamehub_core::domain::{Category, Game, Ownership, Review, Role, User};
use gamehub_core::error::Result;
use gamehub_core::port::{CountQuery, DataStore};
use gamehub_infra_sqlite::SqliteCatalogStore;
use tracing::info;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Insert the demo rows unless the catalog already has games.
/// Returns the number of games inserted.
pub async fn seed_demo_catalog(store: &SqliteCatalogStore, now_ms: i64) -> Result<usize> {
    if store.count(CountQuery::Games).await? > 0 {
        info!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    let categories = [
        Category::new(1, "Action"),
        Category::new(2, "Strategy"),
        Category::new(3, "Puzzle"),
    ];
    for category in &categories {
        store.insert_category(category).await?;
    }

    let mut developer = User::new(1, "Studio");
    developer.role = Role::Developer;
    let users = [
        developer,
        User::new(2, "Alice"),
        User::new(3, "Bruno"),
        User::new(4, "Chen"),
        User::new(5, "Dana").banned(),
    ];
    for user in &users {
        store.insert_user(user).await?;
    }

    let games = [
        Game::new(1, "Iron Rain", 29.99, 1)
            .with_description("Fast arena shooter")
            .with_created_at(now_ms - 90 * DAY_MS),
        Game::new(2, "Skyline Siege", 19.99, 1)
            .with_description("Co-op tower defense with action elements")
            .with_created_at(now_ms - 5 * DAY_MS),
        Game::new(3, "Empire Ledger", 39.99, 2)
            .with_description("Grand strategy across centuries")
            .with_created_at(now_ms - 200 * DAY_MS),
        Game::new(4, "Tile Theory", 4.99, 3)
            .with_description("Minimal puzzle about sliding tiles")
            .with_created_at(now_ms - 2 * DAY_MS),
        Game::new(5, "Quiet Harbor", 0.0, 3)
            .with_description("A relaxing puzzle adventure")
            .with_created_at(now_ms - 40 * DAY_MS),
    ];
    for game in &games {
        store.insert_game(game).await?;
    }

    let reviews = [(1, 2, 1, 5), (2, 3, 1, 4), (3, 4, 1, 3), (4, 2, 3, 5), (5, 3, 4, 2)];
    for (id, user_id, game_id, rating) in reviews {
        let review = Review::new(id, user_id, game_id, rating)?.with_created_at(now_ms - id * DAY_MS);
        store.insert_review(&review).await?;
    }

    let ownerships = [(1, 2, 1), (2, 3, 1), (3, 4, 1), (4, 2, 3), (5, 3, 4), (6, 4, 2)];
    for (id, user_id, game_id) in ownerships {
        store.insert_ownership(&Ownership::owned(id, user_id, game_id)).await?;
    }

    info!(games = games.len(), users = users.len(), "Demo catalog seeded");
    Ok(games.len())
}
