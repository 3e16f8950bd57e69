//! # Marcha Core
//!
//! Domain types, pure logic and store abstractions for the Marcha fleet
//! gamification and inventory subsystems.
//!
//! ## Core Concepts
//!
//! - **Points ledger**: an append-only log of point-earning events per user,
//!   paired with a denormalized running total on the user record
//! - **Ranks**: a static threshold table mapping point totals to rank labels
//! - **Location stacks**: an inventory item's physical stock, distributed
//!   across warehouse/vehicle locations as `(location, status, quantity)`
//!   groupings
//! - **Incidents**: damage reports created atomically with a stack split
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell: all stack surgery and rank math is
//!   pure and synchronous; persistence lives behind the store traits
//! - Store implementations: `PostgresGamificationStore` /
//!   `PostgresInventoryStore` (production, `marcha-postgres` crate) and the
//!   in-memory stores in `marcha-testing`
//!
//! ## Example
//!
//! ```
//! use marcha_core::rank::{user_rank, next_rank_progress};
//!
//! let rank = user_rank(0);
//! assert_eq!(rank.min_points, 0);
//!
//! let progress = next_rank_progress(0);
//! assert!(progress.progress <= 100);
//! ```

pub mod condition;
pub mod ids;
pub mod incident;
pub mod inventory;
pub mod points;
pub mod rank;
pub mod store;
pub mod user;

pub use condition::MaterialCondition;
pub use ids::{IncidentId, ItemId, UserId};
pub use incident::{Incident, IncidentDraft, IncidentPriority, IncidentStatus};
pub use inventory::{InventoryItem, LocationKind, LocationStack, StackError, REPAIR_POOL};
pub use points::{ActionKey, GamificationConfig, NewPointLogEntry, PointLogEntry};
pub use rank::{RankInfo, RankProgress, RANKS};
pub use store::{GamificationStore, InventoryStore, StoreError};
pub use user::{User, UserRole};
