//! In-memory store implementations for fast, deterministic tests
//!
//! Provides `HashMap`-backed counterparts to the Postgres stores:
//! - [`MemoryGamificationStore`]: users, points ledger and config
//! - [`MemoryInventoryStore`]: items and incidents
//!
//! Both support failure injection so tests can exercise the fallback and
//! catch-and-count paths of the services.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning is a test-infrastructure bug

mod gamification;
mod inventory;

pub use gamification::MemoryGamificationStore;
pub use inventory::MemoryInventoryStore;
