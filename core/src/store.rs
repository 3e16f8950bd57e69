//! Store abstractions for the gamification and inventory subsystems.
//!
//! # Design
//!
//! The traits are deliberately minimal: exactly the reads and transactional
//! mutations the services need, nothing resembling a generic repository.
//! The transactional methods (`append_and_increment`, `report_incident`,
//! `restore_unit`) are all-or-nothing; implementations delegate the stack
//! surgery to the pure functions in [`crate::inventory`] so every backend
//! shares one set of semantics.
//!
//! # Implementations
//!
//! - `PostgresGamificationStore` / `PostgresInventoryStore` (`marcha-postgres`):
//!   production, sqlx transactions with row locks
//! - `MemoryGamificationStore` / `MemoryInventoryStore` (`marcha-testing`):
//!   fast, deterministic tests

use crate::condition::MaterialCondition;
use crate::ids::{IncidentId, ItemId, UserId};
use crate::incident::{Incident, IncidentDraft};
use crate::inventory::{InventoryItem, LocationKind, StackError};
use crate::points::{GamificationConfig, NewPointLogEntry, PointLogEntry};
use crate::user::User;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by store implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization error for stored documents.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Referenced user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Referenced inventory item does not exist.
    #[error("Inventory item not found")]
    ItemNotFound,

    /// Referenced incident does not exist.
    #[error("Incident not found")]
    IncidentNotFound,

    /// The stack surgery inside a transaction failed.
    #[error(transparent)]
    Stack(#[from] StackError),

    /// Concurrent-write conflict; the caller may retry the operation.
    #[error("Transaction conflict, retry the operation")]
    Conflict,
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage for users, the points ledger and the gamification config.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so services can be shared across
/// request handlers.
pub trait GamificationStore: Send + Sync {
    /// Appends a ledger entry AND increments the user's denormalized total
    /// by the same amount, in one transaction.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UserNotFound`] when the user row does not exist
    /// - [`StoreError::Database`] on connection or query failure
    fn append_and_increment(
        &self,
        entry: NewPointLogEntry,
    ) -> impl Future<Output = Result<PointLogEntry>> + Send;

    /// Appends a ledger entry without touching the denormalized total.
    ///
    /// Used by the reconciliation backfill, whose corrective entries make
    /// the ledger catch up with an already-higher total.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn append(
        &self,
        entry: NewPointLogEntry,
    ) -> impl Future<Output = Result<PointLogEntry>> + Send;

    /// Sum of all ledger entries for one user.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn ledger_sum(&self, user_id: &UserId) -> impl Future<Output = Result<i64>> + Send;

    /// The most recent ledger entries for one user, newest first.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn recent_entries(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<PointLogEntry>>> + Send;

    /// All ledger entries created at or after `since`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn entries_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<PointLogEntry>>> + Send;

    /// Loads a user by id.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn user(&self, user_id: &UserId) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Loads a user by email.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn user_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// All users with a nonzero denormalized total.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn users_with_points(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    /// Loads the singleton gamification config, `None` when never seeded.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure;
    /// [`StoreError::Serialization`] on a corrupt stored document.
    fn load_config(&self) -> impl Future<Output = Result<Option<GamificationConfig>>> + Send;

    /// Writes the singleton gamification config.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn save_config(
        &self,
        config: &GamificationConfig,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Storage for inventory items and incidents.
pub trait InventoryStore: Send + Sync {
    /// Loads an item by id.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn item(&self, item_id: &ItemId) -> impl Future<Output = Result<Option<InventoryItem>>> + Send;

    /// Loads an incident by id.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on connection or query failure.
    fn incident(
        &self,
        incident_id: &IncidentId,
    ) -> impl Future<Output = Result<Option<Incident>>> + Send;

    /// Atomically splits one unit at `location_id` into `condition` and
    /// creates the incident record, in one transaction.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ItemNotFound`] when the item does not exist
    /// - [`StoreError::Stack`] when no eligible stack exists at the location
    /// - [`StoreError::Conflict`] on a concurrent-write conflict
    /// - [`StoreError::Database`] on connection or query failure
    fn report_incident(
        &self,
        item_id: &ItemId,
        location_id: &str,
        condition: MaterialCondition,
        draft: IncidentDraft,
    ) -> impl Future<Output = Result<Incident>> + Send;

    /// Atomically moves one restorable unit to `(target_kind, target_id)`
    /// as `new_functional` and marks the incident resolved, in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ItemNotFound`] / [`StoreError::IncidentNotFound`]
    /// - [`StoreError::Stack`] when no restorable unit exists
    /// - [`StoreError::Conflict`] on a concurrent-write conflict
    /// - [`StoreError::Database`] on connection or query failure
    fn restore_unit(
        &self,
        incident_id: &IncidentId,
        item_id: &ItemId,
        target_kind: LocationKind,
        target_id: &str,
    ) -> impl Future<Output = Result<InventoryItem>> + Send;
}
