//! `PostgreSQL` gamification store.

use crate::map_db_err;
use chrono::{DateTime, Utc};
use marcha_core::store::Result;
use marcha_core::{
    GamificationConfig, GamificationStore, NewPointLogEntry, PointLogEntry, StoreError, User,
    UserId, UserRole,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

/// `PostgreSQL`-backed users, points ledger and config store.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email TEXT NOT NULL UNIQUE,
///     name TEXT NOT NULL,
///     role TEXT NOT NULL DEFAULT 'driver',
///     points BIGINT NOT NULL DEFAULT 0
/// );
/// CREATE TABLE point_logs (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id),
///     points BIGINT NOT NULL,
///     reason TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// ```
///
/// The ledger is append-only: nothing in this store updates or deletes a
/// `point_logs` row.
#[derive(Clone)]
pub struct PostgresGamificationStore {
    pool: PgPool,
}

impl PostgresGamificationStore {
    /// Create a store using an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a store with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(map_db_err)?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_user(row: &PgRow) -> User {
        User {
            id: UserId::from_uuid(row.get("id")),
            email: row.get("email"),
            name: row.get("name"),
            role: UserRole::parse(row.get::<String, _>("role").as_str()),
            points: row.get("points"),
        }
    }

    fn row_to_entry(row: &PgRow) -> PointLogEntry {
        PointLogEntry {
            id: row.get("id"),
            user_id: UserId::from_uuid(row.get("user_id")),
            points: row.get("points"),
            reason: row.get("reason"),
            created_at: row.get("created_at"),
        }
    }
}

impl GamificationStore for PostgresGamificationStore {
    async fn append_and_increment(&self, entry: NewPointLogEntry) -> Result<PointLogEntry> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        // The counter update goes first: zero affected rows means the user
        // does not exist, before the ledger insert can trip the foreign key.
        let updated = sqlx::query("UPDATE users SET points = points + $2 WHERE id = $1")
            .bind(*entry.user_id.as_uuid())
            .bind(entry.points)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        if updated.rows_affected() == 0 {
            let _ = tx.rollback().await; // Nothing written either way
            return Err(StoreError::UserNotFound);
        }

        let row = sqlx::query(
            r"
            INSERT INTO point_logs (user_id, points, reason)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            ",
        )
        .bind(*entry.user_id.as_uuid())
        .bind(entry.points)
        .bind(&entry.reason)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(PointLogEntry {
            id: row.get("id"),
            user_id: entry.user_id,
            points: entry.points,
            reason: entry.reason,
            created_at: row.get("created_at"),
        })
    }

    async fn append(&self, entry: NewPointLogEntry) -> Result<PointLogEntry> {
        let row = sqlx::query(
            r"
            INSERT INTO point_logs (user_id, points, reason)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            ",
        )
        .bind(*entry.user_id.as_uuid())
        .bind(entry.points)
        .bind(&entry.reason)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(PointLogEntry {
            id: row.get("id"),
            user_id: entry.user_id,
            points: entry.points,
            reason: entry.reason,
            created_at: row.get("created_at"),
        })
    }

    async fn ledger_sum(&self, user_id: &UserId) -> Result<i64> {
        let (sum,): (i64,) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(points), 0)::BIGINT
            FROM point_logs
            WHERE user_id = $1
            ",
        )
        .bind(*user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(sum)
    }

    async fn recent_entries(&self, user_id: &UserId, limit: usize) -> Result<Vec<PointLogEntry>> {
        #[allow(clippy::cast_possible_wrap)] // Limit is a small sample size
        let rows = sqlx::query(
            r"
            SELECT id, user_id, points, reason, created_at
            FROM point_logs
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT $2
            ",
        )
        .bind(*user_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    async fn entries_since(&self, since: DateTime<Utc>) -> Result<Vec<PointLogEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, points, reason, created_at
            FROM point_logs
            WHERE created_at >= $1
            ORDER BY id
            ",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    async fn user(&self, user_id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, email, name, role, points FROM users WHERE id = $1")
            .bind(*user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, email, name, role, points FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    async fn users_with_points(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT id, email, name, role, points FROM users WHERE points <> 0")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(rows.iter().map(Self::row_to_user).collect())
    }

    async fn load_config(&self) -> Result<Option<GamificationConfig>> {
        let row = sqlx::query(
            "SELECT actions, updated_at, updated_by FROM gamification_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let actions: serde_json::Value = row.get("actions");
        let actions = serde_json::from_value(actions)
            .map_err(|e| StoreError::Serialization(format!("Corrupt config document: {e}")))?;

        Ok(Some(GamificationConfig {
            actions,
            updated_at: row.get("updated_at"),
            updated_by: row.get("updated_by"),
        }))
    }

    async fn save_config(&self, config: &GamificationConfig) -> Result<()> {
        let actions = serde_json::to_value(&config.actions)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO gamification_config (id, actions, updated_at, updated_by)
            VALUES (1, $1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET actions = EXCLUDED.actions,
                updated_at = EXCLUDED.updated_at,
                updated_by = EXCLUDED.updated_by
            ",
        )
        .bind(actions)
        .bind(config.updated_at)
        .bind(&config.updated_by)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }
}
