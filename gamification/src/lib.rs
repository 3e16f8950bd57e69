//! # Marcha Gamification
//!
//! Points ledger, reconciliation and leaderboard services.
//!
//! The service is generic over [`marcha_core::GamificationStore`], so the
//! same logic runs against Postgres in production and the in-memory store
//! in tests.
//!
//! Two rules shape the error handling here:
//!
//! - Primary operational actions (fuel logs, checklists, washes) must never
//!   fail because points could not be awarded:
//!   [`GamificationService::award_points_for_action`] swallows and logs
//!   every failure.
//! - Administrative reconciliation is a data-integrity operation and
//!   surfaces failures explicitly.

pub mod backfill;
pub mod error;
pub mod ranking;
pub mod service;

pub use backfill::{BackfillOutcome, BackfillReport, GamificationDebugReport};
pub use error::{GamificationError, Result};
pub use ranking::{RankingEntry, RankingPeriod};
pub use service::GamificationService;
