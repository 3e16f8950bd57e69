//! Material incident records.

use crate::ids::{IncidentId, ItemId, UserId};
use crate::inventory::LocationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an incident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Reported, nobody working on it yet
    Open,
    /// Being handled
    InProgress,
    /// Fixed; the unit has been restored
    Resolved,
    /// Closed without restoration
    Closed,
}

impl IncidentStatus {
    /// String representation, as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Parse a stored status string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Severity assigned by the reporter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentPriority {
    /// Cosmetic or minor
    Low,
    /// Should be scheduled
    Medium,
    /// Blocks normal operation
    High,
    /// Safety issue, immediate attention
    Critical,
}

impl IncidentPriority {
    /// String representation, as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse a stored priority string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// What the reporter fills in before the incident is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncidentDraft {
    /// Short summary
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Severity
    pub priority: IncidentPriority,
    /// Reporting user
    pub reported_by: UserId,
}

/// A material incident, created atomically with the location-stack split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Incident identifier
    pub id: IncidentId,
    /// Short summary
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Severity
    pub priority: IncidentPriority,
    /// Lifecycle status
    pub status: IncidentStatus,
    /// Populated only when the source location is a vehicle; older UI
    /// screens key incident lists on this field
    pub vehicle_id: Option<String>,
    /// Reporting user
    pub reported_by: UserId,
    /// The item whose unit was damaged
    pub inventory_item_id: Option<ItemId>,
    /// Location the damaged unit came from
    pub source_location_id: Option<String>,
    /// Kind of the source location
    pub source_location_kind: Option<LocationKind>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Builds the open incident created by a material report, deriving
    /// `vehicle_id` from the source location kind.
    #[must_use]
    pub fn open(
        draft: IncidentDraft,
        item_id: ItemId,
        location_id: &str,
        source_kind: LocationKind,
        now: DateTime<Utc>,
    ) -> Self {
        let vehicle_id = match source_kind {
            LocationKind::Vehicle => Some(location_id.to_string()),
            LocationKind::Warehouse => None,
        };
        Self {
            id: IncidentId::new(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            status: IncidentStatus::Open,
            vehicle_id,
            reported_by: draft.reported_by,
            inventory_item_id: Some(item_id),
            source_location_id: Some(location_id.to_string()),
            source_location_kind: Some(source_kind),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> IncidentDraft {
        IncidentDraft {
            title: "Flat tire".to_string(),
            description: "Rear left, rim damaged".to_string(),
            priority: IncidentPriority::High,
            reported_by: UserId::new(),
        }
    }

    #[test]
    fn status_roundtrip() {
        for status in [
            IncidentStatus::Open,
            IncidentStatus::InProgress,
            IncidentStatus::Resolved,
            IncidentStatus::Closed,
        ] {
            assert_eq!(IncidentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn vehicle_source_populates_vehicle_id() {
        let incident = Incident::open(
            draft(),
            ItemId::new(),
            "V-042",
            LocationKind::Vehicle,
            Utc::now(),
        );
        assert_eq!(incident.vehicle_id.as_deref(), Some("V-042"));
        assert_eq!(incident.status, IncidentStatus::Open);
    }

    #[test]
    fn warehouse_source_leaves_vehicle_id_empty() {
        let incident = Incident::open(
            draft(),
            ItemId::new(),
            "W1",
            LocationKind::Warehouse,
            Utc::now(),
        );
        assert_eq!(incident.vehicle_id, None);
        assert_eq!(incident.source_location_id.as_deref(), Some("W1"));
    }
}
