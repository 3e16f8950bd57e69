//! Reconciliation report types.
//!
//! The denormalized `User::points` total and the ledger can drift apart:
//! legacy data predates the ledger, and old application versions wrote the
//! two without a transaction. The backfill detects the drift and repairs it
//! by appending one corrective ledger entry per affected user, tagged
//! [`marcha_core::points::RECONCILIATION_REASON`]. It never decreases a
//! total and never rewrites history.

use marcha_core::{PointLogEntry, UserId};
use serde::Serialize;

/// Outcome of a bulk reconciliation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Users that received a corrective ledger entry
    pub users_updated: u32,
    /// Users whose ledger already matched (or exceeded) the total
    pub users_consistent: u32,
    /// Users whose reconciliation failed; failures never abort the batch
    pub users_errored: u32,
}

/// Outcome of a single-user reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BackfillOutcome {
    /// A corrective entry was appended.
    Corrected {
        /// Points added to the ledger
        correction: i64,
        /// The denormalized total both sides now agree on
        total: i64,
    },
    /// The ledger was already equal to or ahead of the denormalized total.
    /// This is "nothing to fix", not an error.
    NothingToFix {
        /// The denormalized total on the user record
        denormalized: i64,
        /// The sum of the user's ledger entries
        ledger_sum: i64,
    },
}

/// Read-only diagnosis of one user's gamification state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GamificationDebugReport {
    /// The inspected user
    pub user_id: UserId,
    /// The email the operator asked about
    pub email: String,
    /// The denormalized total on the user record
    pub denormalized: i64,
    /// The sum of the user's ledger entries
    pub ledger_sum: i64,
    /// `denormalized - ledger_sum`; positive means the ledger is behind
    pub diff: i64,
    /// The user's most recent ledger entries, newest first
    pub recent_entries: Vec<PointLogEntry>,
}
