//! # Marcha Inventory
//!
//! Material incident and restore transactions over the
//! [`marcha_core::InventoryStore`] abstraction.
//!
//! Unlike the gamification side, failures here are data-integrity events an
//! operator needs to know about, so they surface as errors all the way to
//! the UI layer. No retry is performed beyond what the store's transaction
//! primitive does internally for write conflicts.

pub mod error;
pub mod service;

pub use error::{InventoryError, Result};
pub use service::InventoryService;
