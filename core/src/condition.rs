//! Material condition of inventory stock.
//!
//! Stored data still contains the deprecated legacy strings `new`, `ok` and
//! `broken`. Those are normalized to canonical variants once, at the read
//! boundary, so internal logic only ever sees canonical values. Only
//! canonical strings are ever written back.

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};

/// Condition of the units in one location stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialCondition {
    /// Brand new or fully functional
    NewFunctional,
    /// Still working but needs replacement soon
    WorkingUrgentChange,
    /// Unusable
    TotallyBroken,
    /// Replacement on order, not physically present as usable stock
    Ordered,
    /// Waiting on a management decision
    PendingManagement,
    /// Issue resolved, unit back in service
    Resolved,
}

impl MaterialCondition {
    /// Canonical string representation, as written to storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewFunctional => "new_functional",
            Self::WorkingUrgentChange => "working_urgent_change",
            Self::TotallyBroken => "totally_broken",
            Self::Ordered => "ordered",
            Self::PendingManagement => "pending_management",
            Self::Resolved => "resolved",
        }
    }

    /// Parse a stored condition string, normalizing deprecated legacy
    /// values (`new`, `ok`, `broken`) to canonical variants.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new_functional" | "new" | "ok" => Some(Self::NewFunctional),
            "working_urgent_change" => Some(Self::WorkingUrgentChange),
            "totally_broken" | "broken" => Some(Self::TotallyBroken),
            "ordered" => Some(Self::Ordered),
            "pending_management" => Some(Self::PendingManagement),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// Returns `true` if a unit in this condition can be taken for repair
    /// restoration.
    #[must_use]
    pub const fn is_restorable(self) -> bool {
        matches!(
            self,
            Self::TotallyBroken | Self::WorkingUrgentChange | Self::Ordered
        )
    }
}

impl std::fmt::Display for MaterialCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MaterialCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MaterialCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            de::Error::unknown_variant(
                &s,
                &[
                    "new_functional",
                    "working_urgent_change",
                    "totally_broken",
                    "ordered",
                    "pending_management",
                    "resolved",
                ],
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn canonical_roundtrip() {
        for condition in [
            MaterialCondition::NewFunctional,
            MaterialCondition::WorkingUrgentChange,
            MaterialCondition::TotallyBroken,
            MaterialCondition::Ordered,
            MaterialCondition::PendingManagement,
            MaterialCondition::Resolved,
        ] {
            assert_eq!(MaterialCondition::parse(condition.as_str()), Some(condition));
        }
    }

    #[test]
    fn legacy_values_normalize() {
        assert_eq!(
            MaterialCondition::parse("new"),
            Some(MaterialCondition::NewFunctional)
        );
        assert_eq!(
            MaterialCondition::parse("ok"),
            Some(MaterialCondition::NewFunctional)
        );
        assert_eq!(
            MaterialCondition::parse("broken"),
            Some(MaterialCondition::TotallyBroken)
        );
    }

    #[test]
    fn unknown_value_rejected() {
        assert_eq!(MaterialCondition::parse("rusty"), None);
    }

    #[test]
    fn legacy_json_deserializes_to_canonical() {
        let condition: MaterialCondition = serde_json::from_str("\"broken\"").unwrap();
        assert_eq!(condition, MaterialCondition::TotallyBroken);
        // Re-serializing emits the canonical string, never the legacy one.
        assert_eq!(
            serde_json::to_string(&condition).unwrap(),
            "\"totally_broken\""
        );
    }

    #[test]
    fn restorability() {
        assert!(MaterialCondition::TotallyBroken.is_restorable());
        assert!(MaterialCondition::Ordered.is_restorable());
        assert!(!MaterialCondition::NewFunctional.is_restorable());
    }
}
