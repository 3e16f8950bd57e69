//! User records as seen by the gamification subsystem.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// Role of a user account.
///
/// Administrator accounts are excluded from every leaderboard, regardless
/// of window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator (back-office) account
    Admin,
    /// Fleet manager account
    Manager,
    /// Driver account
    Driver,
}

impl UserRole {
    /// Convert role to its database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Driver => "driver",
        }
    }

    /// Parse a role from its database string representation.
    ///
    /// Unknown roles map to [`UserRole::Driver`]; legacy data contains a
    /// handful of free-form role strings and all of them were drivers.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            _ => Self::Driver,
        }
    }

    /// Returns `true` for administrator accounts.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A user record, carrying the denormalized point total.
///
/// `points` is the fast-access running sum of the user's ledger entries.
/// It is mutated only through the ledger append (one transaction with the
/// ledger insert) and the reconciliation backfill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Login email, unique across the fleet
    pub email: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: UserRole,
    /// Denormalized running point total
    pub points: i64,
}
