//! `PostgreSQL` store implementations for the Marcha fleet core.
//!
//! This crate provides production-ready `PostgreSQL` implementations of the
//! store traits from `marcha-core`:
//!
//! - [`PostgresGamificationStore`]: users, points ledger, singleton config
//! - [`PostgresInventoryStore`]: inventory items and incidents
//!
//! The ledger append and the denormalized counter increment run in one
//! transaction, and the inventory transactions lock the item row with
//! `SELECT ... FOR UPDATE` before mutating the JSONB stack array, so a
//! stack split and its incident are committed together or not at all.
//!
//! # Example
//!
//! ```ignore
//! use marcha_postgres::PostgresGamificationStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresGamificationStore::connect("postgres://localhost/marcha").await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

mod gamification;
mod inventory;

pub use gamification::PostgresGamificationStore;
pub use inventory::PostgresInventoryStore;

use marcha_core::StoreError;

/// Maps a driver error to the store taxonomy, surfacing serialization
/// failures and deadlocks as retryable conflicts.
fn map_db_err(error: sqlx::Error) -> StoreError {
    let conflict = error
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "40001" || code == "40P01");
    if conflict {
        StoreError::Conflict
    } else {
        StoreError::Database(error.to_string())
    }
}
