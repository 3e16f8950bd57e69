//! Points ledger types and the gamification action configuration.

use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reason tag used on corrective entries written by the reconciliation
/// backfill.
pub const RECONCILIATION_REASON: &str = "points_reconciliation_backfill";

/// One immutable record of points awarded for one action occurrence.
///
/// Ledger entries are append-only: created once on action completion and
/// never updated or deleted. The ledger is the authoritative source of
/// truth for "how many points a user earned in a given time window".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointLogEntry {
    /// Ledger sequence number, assigned by the store
    pub id: i64,
    /// The user the points were awarded to
    pub user_id: UserId,
    /// Points awarded; typically positive, negative adjustments are allowed
    pub points: i64,
    /// Free-text action key used for auditing and analytics
    pub reason: String,
    /// Store-generated timestamp
    pub created_at: DateTime<Utc>,
}

/// A ledger entry before the store assigns id and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPointLogEntry {
    /// The user the points are awarded to
    pub user_id: UserId,
    /// Points awarded
    pub points: i64,
    /// Free-text action key
    pub reason: String,
}

impl NewPointLogEntry {
    /// Creates a new ledger entry draft.
    #[must_use]
    pub fn new(user_id: UserId, points: i64, reason: impl Into<String>) -> Self {
        Self {
            user_id,
            points,
            reason: reason.into(),
        }
    }
}

/// Point-earning action keys consumed from the operational UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKey {
    /// Daily vehicle checklist completed
    ChecklistCompleted,
    /// Mileage reading logged
    LogKm,
    /// Fuel fill-up logged
    LogFuel,
    /// Material incident reported
    IncidentReported,
    /// Exterior wash
    WashExterior,
    /// Interior wash
    WashInterior,
    /// Full wash
    WashComplete,
    /// Tire pressure check logged
    TirePressureLog,
    /// One minute of arcade play
    GameTime1Min,
    /// Legacy combined wash key, still arriving from old clients
    VehicleWash,
}

impl ActionKey {
    /// The configuration key for this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChecklistCompleted => "checklist_completed",
            Self::LogKm => "log_km",
            Self::LogFuel => "log_fuel",
            Self::IncidentReported => "incident_reported",
            Self::WashExterior => "wash_exterior",
            Self::WashInterior => "wash_interior",
            Self::WashComplete => "wash_complete",
            Self::TirePressureLog => "tire_pressure_log",
            Self::GameTime1Min => "game_time_1min",
            Self::VehicleWash => "vehicle_wash",
        }
    }

    /// All known action keys.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ChecklistCompleted,
            Self::LogKm,
            Self::LogFuel,
            Self::IncidentReported,
            Self::WashExterior,
            Self::WashInterior,
            Self::WashComplete,
            Self::TirePressureLog,
            Self::GameTime1Min,
            Self::VehicleWash,
        ]
    }

    /// Default point value, used when the stored configuration is absent
    /// or unreadable.
    #[must_use]
    pub const fn default_value(&self) -> i64 {
        match self {
            Self::ChecklistCompleted | Self::IncidentReported => 10,
            Self::LogKm | Self::LogFuel | Self::TirePressureLog => 5,
            Self::WashExterior | Self::WashInterior => 15,
            Self::WashComplete => 25,
            Self::GameTime1Min => 1,
            Self::VehicleWash => 20,
        }
    }
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The hardcoded default action-value table.
#[must_use]
pub fn default_action_values() -> BTreeMap<String, i64> {
    ActionKey::all()
        .iter()
        .map(|action| (action.as_str().to_string(), action.default_value()))
        .collect()
}

/// Singleton configuration mapping action keys to point values.
///
/// Mutated only by administrators; every reader falls back to the
/// hardcoded defaults when the document is absent or unreadable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationConfig {
    /// Action key to point value
    pub actions: BTreeMap<String, i64>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
    /// Administrator who last modified the table
    pub updated_by: Option<String>,
}

impl GamificationConfig {
    /// Builds a config carrying the hardcoded defaults.
    #[must_use]
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        Self {
            actions: default_action_values(),
            updated_at: now,
            updated_by: None,
        }
    }

    /// Point value for an action; unknown keys are worth nothing.
    #[must_use]
    pub fn value_for(&self, action: ActionKey) -> i64 {
        self.actions.get(action.as_str()).copied().unwrap_or(0)
    }
}
