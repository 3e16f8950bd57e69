//! Inventory items and location-stack surgery.
//!
//! An item's physical stock is distributed across locations as "stacks":
//! `(location, status, quantity)` groupings. Two stacks may share the same
//! location when their statuses differ; that is how ten working units and
//! one broken unit coexist in the same warehouse.
//!
//! The functions in this module are pure: the transactional store
//! implementations load the `locations` array, apply the surgery here, and
//! write the result back inside one database transaction. Every function
//! conserves the total quantity across stacks except
//! [`take_restorable_unit`] and [`add_restored_unit`], which remove and add
//! exactly one unit and are always paired by the restore transaction.

use crate::condition::MaterialCondition;
use crate::ids::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conventional pseudo-location holding units sent out for repair.
pub const REPAIR_POOL: &str = "REPAIR_POOL";

/// Kind of a stock location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    /// A fixed warehouse
    Warehouse,
    /// A fleet vehicle
    Vehicle,
}

impl LocationKind {
    /// String representation, as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warehouse => "warehouse",
            Self::Vehicle => "vehicle",
        }
    }

    /// Parse a stored location kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "warehouse" => Some(Self::Warehouse),
            "vehicle" => Some(Self::Vehicle),
            _ => None,
        }
    }
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(location, status)` grouping of a given quantity of an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStack {
    /// Location kind
    #[serde(rename = "type")]
    pub kind: LocationKind,
    /// Location identifier (warehouse id or vehicle id)
    #[serde(rename = "id")]
    pub location_id: String,
    /// Units in this stack, always at least 1 for a stored stack
    pub quantity: u32,
    /// Condition of the units; `None` means unmarked healthy stock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MaterialCondition>,
}

impl LocationStack {
    /// Creates a stack.
    #[must_use]
    pub fn new(
        kind: LocationKind,
        location_id: impl Into<String>,
        quantity: u32,
        status: Option<MaterialCondition>,
    ) -> Self {
        Self {
            kind,
            location_id: location_id.into(),
            quantity,
            status,
        }
    }
}

/// An inventory item with its stock distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item identifier
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Stock-keeping unit code
    pub sku: String,
    /// Free-form category label
    pub category: String,
    /// Legacy aggregate quantity kept for old UI reads; the stacks are
    /// authoritative
    pub quantity: i64,
    /// Stock distribution across locations
    pub locations: Vec<LocationStack>,
}

impl InventoryItem {
    /// Total physical stock: the sum of quantities across all stacks.
    #[must_use]
    pub fn total_stock(&self) -> u64 {
        total_quantity(&self.locations)
    }
}

/// Failures of the pure stack surgery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    /// No stack at the given location can supply the incident unit.
    #[error("no unit of this item found at location {location_id}")]
    UnitNotFoundAtLocation {
        /// The location that was searched
        location_id: String,
    },

    /// No broken/urgent/ordered stack (nor the repair pool) holds a unit
    /// to restore.
    #[error("no restorable unit found for this item")]
    NoRestorableUnit,
}

/// Sum of `quantity` across all stacks.
#[must_use]
pub fn total_quantity(locations: &[LocationStack]) -> u64 {
    locations.iter().map(|stack| u64::from(stack.quantity)).sum()
}

/// Splits one unit out of a stack at `location_id` into `condition`.
///
/// Stack selection prefers the most usable stock first: an unmarked or
/// healthy stack, then a working-but-urgent stack, then any stack at the
/// location that is not on order. With quantity above 1 the source stack is
/// decremented and a new single-unit stack with `condition` is pushed; with
/// quantity exactly 1 the stack's status is flipped in place.
///
/// The total quantity across stacks is unchanged.
///
/// Returns the kind of the source stack, which the caller needs to decide
/// whether the incident references a vehicle.
///
/// # Errors
///
/// [`StackError::UnitNotFoundAtLocation`] when no eligible stack exists at
/// the location.
pub fn split_incident_unit(
    locations: &mut Vec<LocationStack>,
    location_id: &str,
    condition: MaterialCondition,
) -> Result<LocationKind, StackError> {
    let index = find_source_stack(locations, location_id).ok_or_else(|| {
        StackError::UnitNotFoundAtLocation {
            location_id: location_id.to_string(),
        }
    })?;

    let kind = locations[index].kind;
    if locations[index].quantity > 1 {
        locations[index].quantity -= 1;
        locations.push(LocationStack::new(kind, location_id, 1, Some(condition)));
    } else {
        locations[index].status = Some(condition);
    }
    Ok(kind)
}

fn find_source_stack(locations: &[LocationStack], location_id: &str) -> Option<usize> {
    let at_location = |stack: &&LocationStack| stack.location_id == location_id;

    let healthy = locations
        .iter()
        .enumerate()
        .filter(|(_, stack)| at_location(&stack))
        .find(|(_, stack)| stack.status.is_none() || stack.status == Some(MaterialCondition::NewFunctional))
        .map(|(index, _)| index);
    if healthy.is_some() {
        return healthy;
    }

    let urgent = locations
        .iter()
        .position(|stack| {
            stack.location_id == location_id
                && stack.status == Some(MaterialCondition::WorkingUrgentChange)
        });
    if urgent.is_some() {
        return urgent;
    }

    // Last candidate: anything at the location that is not on order.
    locations.iter().position(|stack| {
        stack.location_id == location_id && stack.status != Some(MaterialCondition::Ordered)
    })
}

/// Removes one unit from a restorable stack, deleting the stack when it
/// reaches zero.
///
/// Selection prefers an explicit restorable status match
/// (broken/urgent/ordered), then falls back to the [`REPAIR_POOL`]
/// pseudo-location. There is deliberately no further fallback: silently
/// consuming a healthy unit is worse than failing, so the caller gets a
/// hard [`StackError::NoRestorableUnit`].
///
/// # Errors
///
/// [`StackError::NoRestorableUnit`] when neither a restorable stack nor a
/// repair-pool stack holds a unit.
pub fn take_restorable_unit(locations: &mut Vec<LocationStack>) -> Result<(), StackError> {
    let index = locations
        .iter()
        .position(|stack| stack.status.is_some_and(MaterialCondition::is_restorable))
        .or_else(|| {
            locations
                .iter()
                .position(|stack| stack.location_id == REPAIR_POOL)
        })
        .ok_or(StackError::NoRestorableUnit)?;

    if locations[index].quantity > 1 {
        locations[index].quantity -= 1;
    } else {
        locations.remove(index);
    }
    Ok(())
}

/// Adds one restored unit at `(target_kind, target_id)` with status
/// `new_functional`, incrementing an existing matching stack rather than
/// duplicating the `(kind, id, status)` triple.
pub fn add_restored_unit(
    locations: &mut Vec<LocationStack>,
    target_kind: LocationKind,
    target_id: &str,
) {
    let existing = locations.iter_mut().find(|stack| {
        stack.kind == target_kind
            && stack.location_id == target_id
            && stack.status == Some(MaterialCondition::NewFunctional)
    });

    if let Some(stack) = existing {
        stack.quantity += 1;
    } else {
        locations.push(LocationStack::new(
            target_kind,
            target_id,
            1,
            Some(MaterialCondition::NewFunctional),
        ));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stack(
        location_id: &str,
        quantity: u32,
        status: Option<MaterialCondition>,
    ) -> LocationStack {
        LocationStack::new(LocationKind::Warehouse, location_id, quantity, status)
    }

    #[test]
    fn split_decrements_and_pushes_new_stack() {
        let mut locations = vec![stack("W1", 3, None)];
        let kind =
            split_incident_unit(&mut locations, "W1", MaterialCondition::TotallyBroken).unwrap();

        assert_eq!(kind, LocationKind::Warehouse);
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0], stack("W1", 2, None));
        assert_eq!(
            locations[1],
            stack("W1", 1, Some(MaterialCondition::TotallyBroken))
        );
    }

    #[test]
    fn split_single_unit_flips_status_in_place() {
        let mut locations = vec![stack("W1", 1, None)];
        split_incident_unit(&mut locations, "W1", MaterialCondition::TotallyBroken).unwrap();

        assert_eq!(
            locations,
            vec![stack("W1", 1, Some(MaterialCondition::TotallyBroken))]
        );
    }

    #[test]
    fn split_prefers_healthy_stack() {
        let mut locations = vec![
            stack("W1", 2, Some(MaterialCondition::WorkingUrgentChange)),
            stack("W1", 4, Some(MaterialCondition::NewFunctional)),
        ];
        split_incident_unit(&mut locations, "W1", MaterialCondition::TotallyBroken).unwrap();

        // The healthy stack supplied the unit, the urgent one is untouched.
        assert_eq!(locations[1].quantity, 3);
        assert_eq!(locations[0].quantity, 2);
    }

    #[test]
    fn split_falls_back_to_non_ordered_stack() {
        let mut locations = vec![
            stack("W1", 2, Some(MaterialCondition::Ordered)),
            stack("W1", 2, Some(MaterialCondition::PendingManagement)),
        ];
        split_incident_unit(&mut locations, "W1", MaterialCondition::TotallyBroken).unwrap();

        assert_eq!(locations[0].quantity, 2);
        assert_eq!(locations[1].quantity, 1);
    }

    #[test]
    fn split_fails_when_location_empty() {
        let mut locations = vec![stack("W2", 5, None)];
        let err =
            split_incident_unit(&mut locations, "W1", MaterialCondition::TotallyBroken)
                .unwrap_err();
        assert_eq!(
            err,
            StackError::UnitNotFoundAtLocation {
                location_id: "W1".to_string()
            }
        );
    }

    #[test]
    fn split_fails_when_only_ordered_stock() {
        let mut locations = vec![stack("W1", 2, Some(MaterialCondition::Ordered))];
        assert!(
            split_incident_unit(&mut locations, "W1", MaterialCondition::TotallyBroken).is_err()
        );
    }

    #[test]
    fn take_prefers_restorable_status_over_repair_pool() {
        let mut locations = vec![
            stack(REPAIR_POOL, 2, None),
            stack("W1", 1, Some(MaterialCondition::TotallyBroken)),
        ];
        take_restorable_unit(&mut locations).unwrap();

        assert_eq!(locations, vec![stack(REPAIR_POOL, 2, None)]);
    }

    #[test]
    fn take_falls_back_to_repair_pool() {
        let mut locations = vec![stack("W1", 3, None), stack(REPAIR_POOL, 1, None)];
        take_restorable_unit(&mut locations).unwrap();

        assert_eq!(locations, vec![stack("W1", 3, None)]);
    }

    #[test]
    fn take_hard_fails_without_restorable_unit() {
        let mut locations = vec![stack("W1", 5, None)];
        assert_eq!(
            take_restorable_unit(&mut locations),
            Err(StackError::NoRestorableUnit)
        );
        // The healthy stock was not silently consumed.
        assert_eq!(locations[0].quantity, 5);
    }

    #[test]
    fn add_merges_existing_new_functional_stack() {
        let mut locations = vec![stack("W1", 2, Some(MaterialCondition::NewFunctional))];
        add_restored_unit(&mut locations, LocationKind::Warehouse, "W1");

        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].quantity, 3);
    }

    #[test]
    fn add_creates_distinct_stack_for_new_status() {
        let mut locations = vec![stack("W1", 2, None)];
        add_restored_unit(&mut locations, LocationKind::Warehouse, "W1");

        assert_eq!(locations.len(), 2);
        assert_eq!(
            locations[1],
            stack("W1", 1, Some(MaterialCondition::NewFunctional))
        );
    }

    fn arb_status() -> impl Strategy<Value = Option<MaterialCondition>> {
        prop_oneof![
            Just(None),
            Just(Some(MaterialCondition::NewFunctional)),
            Just(Some(MaterialCondition::WorkingUrgentChange)),
            Just(Some(MaterialCondition::TotallyBroken)),
            Just(Some(MaterialCondition::Ordered)),
            Just(Some(MaterialCondition::PendingManagement)),
        ]
    }

    fn arb_locations() -> impl Strategy<Value = Vec<LocationStack>> {
        prop::collection::vec(
            ("W[0-9]", 1u32..20, arb_status()).prop_map(|(id, quantity, status)| {
                LocationStack::new(LocationKind::Warehouse, id, quantity, status)
            }),
            0..6,
        )
    }

    proptest! {
        // An incident split conserves the total quantity across stacks.
        #[test]
        fn split_conserves_total(mut locations in arb_locations(), id in "W[0-9]") {
            let before = total_quantity(&locations);
            let _ = split_incident_unit(
                &mut locations,
                &id,
                MaterialCondition::TotallyBroken,
            );
            prop_assert_eq!(total_quantity(&locations), before);
        }

        // A take/add restore pair conserves the total too.
        #[test]
        fn restore_pair_conserves_total(mut locations in arb_locations()) {
            let before = total_quantity(&locations);
            if take_restorable_unit(&mut locations).is_ok() {
                add_restored_unit(&mut locations, LocationKind::Vehicle, "V1");
                prop_assert_eq!(total_quantity(&locations), before);
            } else {
                prop_assert_eq!(total_quantity(&locations), before);
            }
        }

        // Stored stacks never reach quantity zero.
        #[test]
        fn no_zero_quantity_stacks(mut locations in arb_locations()) {
            let _ = take_restorable_unit(&mut locations);
            prop_assert!(locations.iter().all(|stack| stack.quantity >= 1));
        }
    }
}
