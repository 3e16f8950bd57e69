//! In-memory gamification store.

use chrono::{DateTime, Utc};
use marcha_core::store::Result;
use marcha_core::{
    GamificationConfig, GamificationStore, NewPointLogEntry, PointLogEntry, StoreError, User,
    UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct GamificationData {
    users: HashMap<UserId, User>,
    ledger: Vec<PointLogEntry>,
    next_entry_id: i64,
    config: Option<GamificationConfig>,
    fail_config_reads: bool,
    fail_ledger: bool,
}

/// In-memory users + points ledger + config store.
///
/// # Example
///
/// ```
/// use marcha_testing::MemoryGamificationStore;
/// use marcha_core::{GamificationStore, NewPointLogEntry, User, UserId, UserRole};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryGamificationStore::new();
/// let user_id = UserId::new();
/// store.add_user(User {
///     id: user_id.clone(),
///     email: "ana@fleet.example".into(),
///     name: "Ana".into(),
///     role: UserRole::Driver,
///     points: 0,
/// });
///
/// store
///     .append_and_increment(NewPointLogEntry::new(user_id.clone(), 10, "log_fuel"))
///     .await?;
/// assert_eq!(store.ledger_sum(&user_id).await?, 10);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryGamificationStore {
    inner: Arc<RwLock<GamificationData>>,
}

impl MemoryGamificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user record.
    pub fn add_user(&self, user: User) {
        self.inner.write().unwrap().users.insert(user.id.clone(), user);
    }

    /// Overwrites a user's denormalized total without touching the ledger,
    /// simulating legacy drift.
    pub fn set_denormalized_points(&self, user_id: &UserId, points: i64) {
        if let Some(user) = self.inner.write().unwrap().users.get_mut(user_id) {
            user.points = points;
        }
    }

    /// Snapshot of the full ledger, append order.
    #[must_use]
    pub fn ledger(&self) -> Vec<PointLogEntry> {
        self.inner.read().unwrap().ledger.clone()
    }

    /// Current denormalized total for a user.
    #[must_use]
    pub fn denormalized_points(&self, user_id: &UserId) -> Option<i64> {
        self.inner
            .read()
            .unwrap()
            .users
            .get(user_id)
            .map(|user| user.points)
    }

    /// Makes every config read fail with a database error.
    pub fn fail_config_reads(&self, fail: bool) {
        self.inner.write().unwrap().fail_config_reads = fail;
    }

    /// Makes every ledger read and write fail with a database error.
    pub fn fail_ledger(&self, fail: bool) {
        self.inner.write().unwrap().fail_ledger = fail;
    }

    /// Backdates an existing ledger entry, for window tests.
    pub fn backdate_entry(&self, entry_id: i64, created_at: DateTime<Utc>) {
        let mut data = self.inner.write().unwrap();
        if let Some(entry) = data.ledger.iter_mut().find(|entry| entry.id == entry_id) {
            entry.created_at = created_at;
        }
    }

    fn push_entry(
        data: &mut GamificationData,
        entry: NewPointLogEntry,
    ) -> Result<PointLogEntry> {
        if data.fail_ledger {
            return Err(StoreError::Database("injected ledger failure".to_string()));
        }
        data.next_entry_id += 1;
        let entry = PointLogEntry {
            id: data.next_entry_id,
            user_id: entry.user_id,
            points: entry.points,
            reason: entry.reason,
            created_at: Utc::now(),
        };
        data.ledger.push(entry.clone());
        Ok(entry)
    }
}

impl GamificationStore for MemoryGamificationStore {
    async fn append_and_increment(&self, entry: NewPointLogEntry) -> Result<PointLogEntry> {
        let mut data = self.inner.write().unwrap();
        if !data.users.contains_key(&entry.user_id) {
            return Err(StoreError::UserNotFound);
        }
        let logged = Self::push_entry(&mut data, entry)?;
        if let Some(user) = data.users.get_mut(&logged.user_id) {
            user.points += logged.points;
        }
        Ok(logged)
    }

    async fn append(&self, entry: NewPointLogEntry) -> Result<PointLogEntry> {
        let mut data = self.inner.write().unwrap();
        Self::push_entry(&mut data, entry)
    }

    async fn ledger_sum(&self, user_id: &UserId) -> Result<i64> {
        let data = self.inner.read().unwrap();
        if data.fail_ledger {
            return Err(StoreError::Database("injected ledger failure".to_string()));
        }
        Ok(data
            .ledger
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .map(|entry| entry.points)
            .sum())
    }

    async fn recent_entries(&self, user_id: &UserId, limit: usize) -> Result<Vec<PointLogEntry>> {
        let data = self.inner.read().unwrap();
        let mut entries: Vec<_> = data
            .ledger
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn entries_since(&self, since: DateTime<Utc>) -> Result<Vec<PointLogEntry>> {
        let data = self.inner.read().unwrap();
        if data.fail_ledger {
            return Err(StoreError::Database("injected ledger failure".to_string()));
        }
        Ok(data
            .ledger
            .iter()
            .filter(|entry| entry.created_at >= since)
            .cloned()
            .collect())
    }

    async fn user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.inner.read().unwrap().users.get(user_id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn users_with_points(&self) -> Result<Vec<User>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .users
            .values()
            .filter(|user| user.points != 0)
            .cloned()
            .collect())
    }

    async fn load_config(&self) -> Result<Option<GamificationConfig>> {
        let data = self.inner.read().unwrap();
        if data.fail_config_reads {
            return Err(StoreError::Database("injected config failure".to_string()));
        }
        Ok(data.config.clone())
    }

    async fn save_config(&self, config: &GamificationConfig) -> Result<()> {
        self.inner.write().unwrap().config = Some(config.clone());
        Ok(())
    }
}
