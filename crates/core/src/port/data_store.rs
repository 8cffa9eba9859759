// Data Store Port (Interface)
//
// Point lookups, filtered listings and count/aggregate queries. Every method
// must be callable concurrently from many tasks.

use crate::domain::{Category, CategoryId, Game, GameId, Review, User, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Predicate for game listings
#[derive(Debug, Clone, PartialEq)]
pub enum GameFilter {
    All,
    /// Case-insensitive substring match on the name
    NameContains(String),
    /// Case-insensitive substring match on the description
    DescriptionContains(String),
    /// Games in a category, optionally excluding one game
    InCategory {
        category_id: CategoryId,
        exclude: Option<GameId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFilter {
    All,
    /// Users that are not banned
    Active,
}

/// Count predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountQuery {
    Users,
    ActiveUsers,
    Games,
    GamesInCategory(CategoryId),
    /// Games created at or after the given epoch ms
    GamesCreatedSince(i64),
    Reviews,
    ReviewsForGame(GameId),
    Ownerships,
    OwnersOfGame(GameId),
}

/// Catalog store used by every engine operation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Find game by ID (with its category name)
    async fn find_game(&self, id: GameId) -> Result<Option<Game>>;

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>>;

    /// First category (by id) whose name contains the term, case-insensitive
    async fn find_category_by_name(&self, term: &str) -> Result<Option<Category>>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    /// List games matching the filter, ordered by id, at most `limit` (0 = unlimited)
    async fn list_games(&self, filter: &GameFilter, limit: usize) -> Result<Vec<Game>>;

    /// Ids of the games a user owns (wishlist entries excluded), ascending
    async fn list_owned_game_ids(&self, user_id: UserId) -> Result<Vec<GameId>>;

    /// Newest reviews of a game first
    async fn list_recent_reviews(&self, game_id: GameId, limit: usize) -> Result<Vec<Review>>;

    async fn list_users(&self, filter: UserFilter) -> Result<Vec<User>>;

    async fn count(&self, query: CountQuery) -> Result<i64>;

    /// Average review rating, for one game or the whole catalog (0.0 without reviews)
    async fn average_rating(&self, game_id: Option<GameId>) -> Result<f64>;

    /// Category with the most games: (category_id, game_count)
    async fn top_category(&self) -> Result<Option<(CategoryId, i64)>>;

    /// Persist a new price (NotFound if the game is gone)
    async fn update_game_price(&self, id: GameId, price: f64) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{Ownership, OwnershipStatus};
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::{Mutex, RwLock};
    use std::time::Duration;

    /// Store operations (for latency / failure injection and call counting)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum StoreOp {
        FindGame,
        FindCategory,
        FindCategoryByName,
        FindUser,
        ListGames,
        ListOwnedGameIds,
        ListRecentReviews,
        ListUsers,
        Count,
        AverageRating,
        TopCategory,
        UpdateGamePrice,
    }

    #[derive(Default)]
    struct CatalogState {
        games: Vec<Game>,
        categories: Vec<Category>,
        reviews: Vec<Review>,
        users: Vec<User>,
        ownerships: Vec<Ownership>,
    }

    /// In-memory DataStore with injectable latency and failures
    #[derive(Default)]
    pub struct InMemoryDataStore {
        state: RwLock<CatalogState>,
        latency: Mutex<HashMap<StoreOp, Duration>>,
        default_latency: Mutex<Duration>,
        failures: Mutex<HashMap<StoreOp, String>>,
        calls: Mutex<HashMap<StoreOp, usize>>,
    }

    impl InMemoryDataStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_category(self, category: Category) -> Self {
            self.state.write().unwrap().categories.push(category);
            self
        }

        pub fn with_game(self, game: Game) -> Self {
            self.state.write().unwrap().games.push(game);
            self
        }

        pub fn with_review(self, review: Review) -> Self {
            self.state.write().unwrap().reviews.push(review);
            self
        }

        pub fn with_user(self, user: User) -> Self {
            self.state.write().unwrap().users.push(user);
            self
        }

        pub fn with_ownership(self, ownership: Ownership) -> Self {
            self.state.write().unwrap().ownerships.push(ownership);
            self
        }

        /// Latency applied to every operation without a specific one
        pub fn with_latency(self, latency: Duration) -> Self {
            *self.default_latency.lock().unwrap() = latency;
            self
        }

        pub fn with_op_latency(self, op: StoreOp, latency: Duration) -> Self {
            self.latency.lock().unwrap().insert(op, latency);
            self
        }

        /// Make every call of `op` fail with a database error
        pub fn fail_on(self, op: StoreOp, message: impl Into<String>) -> Self {
            self.failures.lock().unwrap().insert(op, message.into());
            self
        }

        pub fn call_count(&self, op: StoreOp) -> usize {
            self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
        }

        /// Snapshot of a stored game (without the category join)
        pub fn game(&self, id: GameId) -> Option<Game> {
            self.state
                .read()
                .unwrap()
                .games
                .iter()
                .find(|g| g.id == id)
                .cloned()
        }

        async fn enter(&self, op: StoreOp) -> Result<()> {
            *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
            let latency = self
                .latency
                .lock()
                .unwrap()
                .get(&op)
                .copied()
                .unwrap_or(*self.default_latency.lock().unwrap());
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            match self.failures.lock().unwrap().get(&op) {
                Some(message) => Err(AppError::Database(message.clone())),
                None => Ok(()),
            }
        }
    }

    fn contains_ci(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }

    fn take_limit<T>(items: impl Iterator<Item = T>, limit: usize) -> Vec<T> {
        if limit == 0 {
            items.collect()
        } else {
            items.take(limit).collect()
        }
    }

    #[async_trait]
    impl DataStore for InMemoryDataStore {
        async fn find_game(&self, id: GameId) -> Result<Option<Game>> {
            self.enter(StoreOp::FindGame).await?;
            let state = self.state.read().unwrap();
            Ok(state.games.iter().find(|g| g.id == id).map(|g| {
                let mut game = g.clone();
                game.category_name = state
                    .categories
                    .iter()
                    .find(|c| c.id == g.category_id)
                    .map(|c| c.name.clone());
                game
            }))
        }

        async fn find_category(&self, id: CategoryId) -> Result<Option<Category>> {
            self.enter(StoreOp::FindCategory).await?;
            let state = self.state.read().unwrap();
            Ok(state.categories.iter().find(|c| c.id == id).cloned())
        }

        async fn find_category_by_name(&self, term: &str) -> Result<Option<Category>> {
            self.enter(StoreOp::FindCategoryByName).await?;
            let state = self.state.read().unwrap();
            Ok(state
                .categories
                .iter()
                .filter(|c| contains_ci(&c.name, term))
                .min_by_key(|c| c.id)
                .cloned())
        }

        async fn find_user(&self, id: UserId) -> Result<Option<User>> {
            self.enter(StoreOp::FindUser).await?;
            let state = self.state.read().unwrap();
            Ok(state.users.iter().find(|u| u.id == id).cloned())
        }

        async fn list_games(&self, filter: &GameFilter, limit: usize) -> Result<Vec<Game>> {
            self.enter(StoreOp::ListGames).await?;
            let state = self.state.read().unwrap();
            let mut games: Vec<&Game> = state
                .games
                .iter()
                .filter(|g| match filter {
                    GameFilter::All => true,
                    GameFilter::NameContains(term) => contains_ci(&g.name, term),
                    GameFilter::DescriptionContains(term) => contains_ci(&g.description, term),
                    GameFilter::InCategory {
                        category_id,
                        exclude,
                    } => g.category_id == *category_id && Some(g.id) != *exclude,
                })
                .collect();
            games.sort_by_key(|g| g.id);
            Ok(take_limit(games.into_iter().cloned(), limit))
        }

        async fn list_owned_game_ids(&self, user_id: UserId) -> Result<Vec<GameId>> {
            self.enter(StoreOp::ListOwnedGameIds).await?;
            let state = self.state.read().unwrap();
            let mut ids: Vec<GameId> = state
                .ownerships
                .iter()
                .filter(|o| o.user_id == user_id && o.status == OwnershipStatus::Owned)
                .map(|o| o.game_id)
                .collect();
            ids.sort_unstable();
            Ok(ids)
        }

        async fn list_recent_reviews(&self, game_id: GameId, limit: usize) -> Result<Vec<Review>> {
            self.enter(StoreOp::ListRecentReviews).await?;
            let state = self.state.read().unwrap();
            let mut reviews: Vec<&Review> =
                state.reviews.iter().filter(|r| r.game_id == game_id).collect();
            reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(take_limit(reviews.into_iter().cloned(), limit))
        }

        async fn list_users(&self, filter: UserFilter) -> Result<Vec<User>> {
            self.enter(StoreOp::ListUsers).await?;
            let state = self.state.read().unwrap();
            Ok(state
                .users
                .iter()
                .filter(|u| filter == UserFilter::All || !u.is_banned)
                .cloned()
                .collect())
        }

        async fn count(&self, query: CountQuery) -> Result<i64> {
            self.enter(StoreOp::Count).await?;
            let state = self.state.read().unwrap();
            let count = match query {
                CountQuery::Users => state.users.len(),
                CountQuery::ActiveUsers => state.users.iter().filter(|u| !u.is_banned).count(),
                CountQuery::Games => state.games.len(),
                CountQuery::GamesInCategory(id) => {
                    state.games.iter().filter(|g| g.category_id == id).count()
                }
                CountQuery::GamesCreatedSince(since) => {
                    state.games.iter().filter(|g| g.created_at >= since).count()
                }
                CountQuery::Reviews => state.reviews.len(),
                CountQuery::ReviewsForGame(id) => {
                    state.reviews.iter().filter(|r| r.game_id == id).count()
                }
                CountQuery::Ownerships => state.ownerships.len(),
                CountQuery::OwnersOfGame(id) => {
                    state.ownerships.iter().filter(|o| o.game_id == id).count()
                }
            };
            Ok(count as i64)
        }

        async fn average_rating(&self, game_id: Option<GameId>) -> Result<f64> {
            self.enter(StoreOp::AverageRating).await?;
            let state = self.state.read().unwrap();
            let ratings: Vec<i32> = state
                .reviews
                .iter()
                .filter(|r| game_id.map_or(true, |id| r.game_id == id))
                .map(|r| r.rating)
                .collect();
            if ratings.is_empty() {
                return Ok(0.0);
            }
            Ok(ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64)
        }

        async fn top_category(&self) -> Result<Option<(CategoryId, i64)>> {
            self.enter(StoreOp::TopCategory).await?;
            let state = self.state.read().unwrap();
            let mut counts: HashMap<CategoryId, i64> = HashMap::new();
            for game in &state.games {
                *counts.entry(game.category_id).or_insert(0) += 1;
            }
            // Ties resolve to the lowest category id
            Ok(counts
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0))))
        }

        async fn update_game_price(&self, id: GameId, price: f64) -> Result<()> {
            self.enter(StoreOp::UpdateGamePrice).await?;
            let mut state = self.state.write().unwrap();
            match state.games.iter_mut().find(|g| g.id == id) {
                Some(game) => {
                    game.price = price;
                    Ok(())
                }
                None => Err(AppError::NotFound(format!("Game {} not found", id))),
            }
        }
    }
}
