// SQLite DataStore Implementation

use async_trait::async_trait;
use gamehub_core::domain::{
    Category, CategoryId, Game, GameId, Ownership, Review, Role, User, UserId,
};
use gamehub_core::error::{AppError, Result};
use gamehub_core::port::{CountQuery, DataStore, GameFilter, UserFilter};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "787" | "3850" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "275" => AppError::Database(format!(
                        "Check constraint violation: {}",
                        db_err.message()
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        sqlx::Error::PoolTimedOut => {
            AppError::DependencyUnavailable("connection pool exhausted".to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// SQLite encodes "no limit" as a negative LIMIT
fn sql_limit(limit: usize) -> i64 {
    if limit == 0 {
        -1
    } else {
        limit as i64
    }
}

/// Wrap a search term for `LIKE ... ESCAPE '\'` so `%` and `_` match literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

const GAME_COLUMNS: &str = "g.id, g.name, g.price, g.description, g.category_id, \
     g.image, g.developer_id, g.created_at";

pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ------------------------------------------------------------------
    // Seed helpers (fixtures, demo data)
    // ------------------------------------------------------------------

    pub async fn insert_category(&self, category: &Category) -> Result<()> {
        sqlx::query("INSERT INTO categories (id, name) VALUES (?, ?)")
            .bind(category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn insert_game(&self, game: &Game) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO games (
                id, name, price, description, category_id, image, developer_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(game.id)
        .bind(&game.name)
        .bind(game.price)
        .bind(&game.description)
        .bind(game.category_id)
        .bind(&game.image)
        .bind(game.developer_id)
        .bind(game.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, email, name, role, is_banned) VALUES (?, ?, ?, ?, ?)")
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.role.as_str())
            .bind(if user.is_banned { 1 } else { 0 })
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn insert_review(&self, review: &Review) -> Result<()> {
        sqlx::query(
            "INSERT INTO reviews (id, user_id, game_id, rating, comment, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.game_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn insert_ownership(&self, ownership: &Ownership) -> Result<()> {
        sqlx::query("INSERT INTO ownerships (id, user_id, game_id, status) VALUES (?, ?, ?, ?)")
            .bind(ownership.id)
            .bind(ownership.user_id)
            .bind(ownership.game_id)
            .bind(ownership.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl DataStore for SqliteCatalogStore {
    async fn find_game(&self, id: GameId) -> Result<Option<Game>> {
        let sql = format!(
            "SELECT {}, c.name AS category_name FROM games g \
             LEFT JOIN categories c ON c.id = g.category_id WHERE g.id = ?",
            GAME_COLUMNS
        );
        let row: Option<GameRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(GameRow::into_game))
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(CategoryRow::into_category))
    }

    async fn find_category_by_name(&self, term: &str) -> Result<Option<Category>> {
        // LIKE is case-insensitive for ASCII in SQLite
        let row: Option<CategoryRow> = sqlx::query_as(
            r"SELECT id, name FROM categories WHERE name LIKE ? ESCAPE '\' ORDER BY id LIMIT 1",
        )
        .bind(like_pattern(term))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(CategoryRow::into_category))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, name, role, is_banned FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.map(UserRow::into_user))
    }

    async fn list_games(&self, filter: &GameFilter, limit: usize) -> Result<Vec<Game>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        query.push(GAME_COLUMNS);
        query.push(", NULL AS category_name FROM games g WHERE 1 = 1");

        match filter {
            GameFilter::All => {}
            GameFilter::NameContains(term) => {
                query.push(" AND g.name LIKE ");
                query.push_bind(like_pattern(term));
                query.push(r" ESCAPE '\'");
            }
            GameFilter::DescriptionContains(term) => {
                query.push(" AND g.description LIKE ");
                query.push_bind(like_pattern(term));
                query.push(r" ESCAPE '\'");
            }
            GameFilter::InCategory {
                category_id,
                exclude,
            } => {
                query.push(" AND g.category_id = ");
                query.push_bind(*category_id);
                if let Some(excluded) = exclude {
                    query.push(" AND g.id != ");
                    query.push_bind(*excluded);
                }
            }
        }

        query.push(" ORDER BY g.id LIMIT ");
        query.push_bind(sql_limit(limit));

        let rows: Vec<GameRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!(?filter, found = rows.len(), "Listed games");
        Ok(rows.into_iter().map(GameRow::into_game).collect())
    }

    async fn list_owned_game_ids(&self, user_id: UserId) -> Result<Vec<GameId>> {
        let ids: Vec<GameId> = sqlx::query_scalar(
            "SELECT game_id FROM ownerships WHERE user_id = ? AND status = 'owned' ORDER BY game_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        debug!(user_id, owned = ids.len(), "Listed owned games");
        Ok(ids)
    }

    async fn list_recent_reviews(&self, game_id: GameId, limit: usize) -> Result<Vec<Review>> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, game_id, rating, comment, created_at
            FROM reviews
            WHERE game_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(game_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ReviewRow::into_review).collect())
    }

    async fn list_users(&self, filter: UserFilter) -> Result<Vec<User>> {
        let sql = match filter {
            UserFilter::All => "SELECT id, email, name, role, is_banned FROM users ORDER BY id",
            UserFilter::Active => {
                "SELECT id, email, name, role, is_banned FROM users WHERE is_banned = 0 ORDER BY id"
            }
        };
        let rows: Vec<UserRow> = sqlx::query_as(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn count(&self, query: CountQuery) -> Result<i64> {
        let (sql, arg) = match query {
            CountQuery::Users => ("SELECT COUNT(*) FROM users", None),
            CountQuery::ActiveUsers => ("SELECT COUNT(*) FROM users WHERE is_banned = 0", None),
            CountQuery::Games => ("SELECT COUNT(*) FROM games", None),
            CountQuery::GamesInCategory(id) => {
                ("SELECT COUNT(*) FROM games WHERE category_id = ?", Some(id))
            }
            CountQuery::GamesCreatedSince(since) => {
                ("SELECT COUNT(*) FROM games WHERE created_at >= ?", Some(since))
            }
            CountQuery::Reviews => ("SELECT COUNT(*) FROM reviews", None),
            CountQuery::ReviewsForGame(id) => {
                ("SELECT COUNT(*) FROM reviews WHERE game_id = ?", Some(id))
            }
            CountQuery::Ownerships => ("SELECT COUNT(*) FROM ownerships", None),
            CountQuery::OwnersOfGame(id) => {
                ("SELECT COUNT(*) FROM ownerships WHERE game_id = ?", Some(id))
            }
        };

        let mut scalar = sqlx::query_scalar::<_, i64>(sql);
        if let Some(arg) = arg {
            scalar = scalar.bind(arg);
        }
        scalar.fetch_one(&self.pool).await.map_err(map_sqlx_error)
    }

    async fn average_rating(&self, game_id: Option<GameId>) -> Result<f64> {
        let average: Option<f64> = match game_id {
            Some(id) => sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(rating) FROM reviews WHERE game_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await,
            None => sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(rating) FROM reviews")
                .fetch_one(&self.pool)
                .await,
        }
        .map_err(map_sqlx_error)?;
        Ok(average.unwrap_or(0.0))
    }

    async fn top_category(&self) -> Result<Option<(CategoryId, i64)>> {
        sqlx::query_as(
            r#"
            SELECT category_id, COUNT(*) AS game_count
            FROM games
            GROUP BY category_id
            ORDER BY game_count DESC, category_id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_game_price(&self, id: GameId, price: f64) -> Result<()> {
        let result = sqlx::query("UPDATE games SET price = ? WHERE id = ?")
            .bind(price)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Game {} not found", id)));
        }
        Ok(())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct GameRow {
    id: i64,
    name: String,
    price: f64,
    description: String,
    category_id: i64,
    image: String,
    developer_id: i64,
    created_at: i64,
    category_name: Option<String>,
}

impl GameRow {
    fn into_game(self) -> Game {
        Game {
            id: self.id,
            name: self.name,
            price: self.price,
            description: self.description,
            category_id: self.category_id,
            category_name: self.category_name,
            image: self.image,
            developer_id: self.developer_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category::new(self.id, self.name)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    role: String,
    is_banned: i32, // SQLite boolean as integer
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            role: self.role.parse().unwrap_or(Role::User),
            is_banned: self.is_banned != 0,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    user_id: i64,
    game_id: i64,
    rating: i32,
    comment: String,
    created_at: i64,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            id: self.id,
            user_id: self.user_id,
            game_id: self.game_id,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn setup_store() -> SqliteCatalogStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = SqliteCatalogStore::new(pool);

        store.insert_category(&Category::new(1, "Strategy")).await.unwrap();
        store.insert_category(&Category::new(2, "Roguelike")).await.unwrap();
        store.insert_user(&User::new(1, "Ann")).await.unwrap();
        store.insert_user(&User::new(2, "Bob").banned()).await.unwrap();
        store
            .insert_game(&Game::new(1, "Civilization", 60.0, 1).with_description("Turn based"))
            .await
            .unwrap();
        store
            .insert_game(
                &Game::new(2, "Hades", 25.0, 2)
                    .with_description("Escape the underworld")
                    .with_created_at(5_000),
            )
            .await
            .unwrap();
        store.insert_game(&Game::new(3, "Dead Cells", 25.0, 2)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_find_game_joins_category_name() {
        let store = setup_store().await;
        let game = store.find_game(2).await.unwrap().unwrap();
        assert_eq!(game.name, "Hades");
        assert_eq!(game.category_name.as_deref(), Some("Roguelike"));

        assert!(store.find_game(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_games_filters() {
        let store = setup_store().await;

        let by_name = store
            .list_games(&GameFilter::NameContains("HAD".to_string()), 0)
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 2);

        let related = store
            .list_games(
                &GameFilter::InCategory {
                    category_id: 2,
                    exclude: Some(2),
                },
                5,
            )
            .await
            .unwrap();
        assert_eq!(related.iter().map(|g| g.id).collect::<Vec<_>>(), vec![3]);

        let limited = store.list_games(&GameFilter::All, 2).await.unwrap();
        assert_eq!(limited.iter().map(|g| g.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_find_category_by_name_is_case_insensitive() {
        let store = setup_store().await;
        let category = store.find_category_by_name("rogue").await.unwrap().unwrap();
        assert_eq!(category.id, 2);
        assert!(store.find_category_by_name("racing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let store = setup_store().await;
        store
            .insert_game(&Game::new(4, "100% Orange Juice", 5.0, 1).with_description("dice_roll"))
            .await
            .unwrap();

        for term in ["%", "_"] {
            let by_name = store
                .list_games(&GameFilter::NameContains(term.to_string()), 0)
                .await
                .unwrap();
            let expected: Vec<GameId> = if term == "%" { vec![4] } else { vec![] };
            assert_eq!(by_name.iter().map(|g| g.id).collect::<Vec<_>>(), expected);
            assert!(store.find_category_by_name(term).await.unwrap().is_none());
        }

        let by_description = store
            .list_games(&GameFilter::DescriptionContains("e_r".to_string()), 0)
            .await
            .unwrap();
        assert_eq!(by_description.iter().map(|g| g.id).collect::<Vec<_>>(), vec![4]);

        let backslash = store
            .list_games(&GameFilter::NameContains("\\".to_string()), 0)
            .await
            .unwrap();
        assert!(backslash.is_empty());
    }

    #[tokio::test]
    async fn test_list_owned_game_ids_skips_wishlist() {
        let store = setup_store().await;
        store.insert_ownership(&Ownership::owned(1, 1, 3)).await.unwrap();
        store.insert_ownership(&Ownership::owned(2, 1, 1)).await.unwrap();
        store.insert_ownership(&Ownership::wishlisted(3, 1, 2)).await.unwrap();
        store.insert_ownership(&Ownership::owned(4, 2, 2)).await.unwrap();

        assert_eq!(store.list_owned_game_ids(1).await.unwrap(), vec![1, 3]);
        assert!(store.list_owned_game_ids(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counts_and_aggregates() {
        let store = setup_store().await;
        store
            .insert_review(&Review::new(1, 1, 2, 5).unwrap().with_created_at(10))
            .await
            .unwrap();
        store
            .insert_review(&Review::new(2, 1, 2, 3).unwrap().with_created_at(20))
            .await
            .unwrap();
        store.insert_ownership(&Ownership::owned(1, 1, 2)).await.unwrap();

        assert_eq!(store.count(CountQuery::Users).await.unwrap(), 2);
        assert_eq!(store.count(CountQuery::ActiveUsers).await.unwrap(), 1);
        assert_eq!(store.count(CountQuery::GamesInCategory(2)).await.unwrap(), 2);
        assert_eq!(store.count(CountQuery::GamesCreatedSince(1_000)).await.unwrap(), 1);
        assert_eq!(store.count(CountQuery::OwnersOfGame(2)).await.unwrap(), 1);
        assert_eq!(store.average_rating(Some(2)).await.unwrap(), 4.0);
        assert_eq!(store.average_rating(Some(1)).await.unwrap(), 0.0);
        assert_eq!(store.top_category().await.unwrap(), Some((2, 2)));

        let reviews = store.list_recent_reviews(2, 10).await.unwrap();
        assert_eq!(reviews.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_list_users_active_only() {
        let store = setup_store().await;
        let active = store.list_users(UserFilter::Active).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Ann");
        assert_eq!(store.list_users(UserFilter::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_game_price() {
        let store = setup_store().await;
        store.update_game_price(1, 30.0).await.unwrap();
        assert_eq!(store.find_game(1).await.unwrap().unwrap().price, 30.0);

        let err = store.update_game_price(42, 1.0).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_foreign_key_violation_mapped() {
        let store = setup_store().await;
        let err = store
            .insert_game(&Game::new(10, "Orphan", 1.0, 77))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Foreign key"));
    }

    #[tokio::test]
    async fn test_empty_catalog_has_no_top_category() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = SqliteCatalogStore::new(pool);
        assert_eq!(store.top_category().await.unwrap(), None);
        assert_eq!(store.average_rating(None).await.unwrap(), 0.0);
    }
}
