//! The inventory service: incident reporting and repair restoration.

use crate::error::Result;
use marcha_core::{
    Incident, IncidentDraft, IncidentId, InventoryItem, InventoryStore, ItemId, LocationKind,
    MaterialCondition,
};

/// Material incident and restore transactions.
#[derive(Clone, Debug)]
pub struct InventoryService<S> {
    store: S,
}

impl<S: InventoryStore> InventoryService<S> {
    /// Creates a service over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Reports a material incident at a location.
    ///
    /// In one transaction: one unit is split out of the most usable stack
    /// at `location_id` into `condition` (or the single unit's status is
    /// flipped in place), and an open incident is created referencing the
    /// item and source location. The item's total stock is conserved.
    ///
    /// # Errors
    ///
    /// - [`crate::InventoryError::ItemNotFound`]
    /// - [`crate::InventoryError::ItemNotFoundAtLocation`] when no eligible
    ///   stack exists at the location
    /// - [`crate::InventoryError::Conflict`] on a concurrent change;
    ///   the user retries
    pub async fn report_material_incident(
        &self,
        draft: IncidentDraft,
        item_id: &ItemId,
        location_id: &str,
        condition: MaterialCondition,
    ) -> Result<Incident> {
        let incident = self
            .store
            .report_incident(item_id, location_id, condition, draft)
            .await?;

        tracing::info!(
            incident_id = %incident.id,
            item_id = %item_id,
            location_id,
            condition = %condition,
            "Material incident reported"
        );
        metrics::counter!("inventory.incidents.opened").increment(1);

        Ok(incident)
    }

    /// Restores a repaired unit into a destination location.
    ///
    /// In one transaction: one unit leaves a restorable stack (explicit
    /// broken/urgent/ordered status, falling back to the repair pool), one
    /// `new_functional` unit lands at `(target_kind, target_id)`, and the
    /// incident is marked resolved.
    ///
    /// There is no silent fallback to an arbitrary stack: when nothing is
    /// restorable the operation fails with
    /// [`crate::InventoryError::NoRestorableUnitFound`] rather than
    /// consuming a healthy unit.
    ///
    /// # Errors
    ///
    /// - [`crate::InventoryError::ItemNotFound`] /
    ///   [`crate::InventoryError::IncidentNotFound`]
    /// - [`crate::InventoryError::NoRestorableUnitFound`]
    /// - [`crate::InventoryError::Conflict`] on a concurrent change
    pub async fn restore_material(
        &self,
        incident_id: &IncidentId,
        item_id: &ItemId,
        target_id: &str,
        target_kind: LocationKind,
    ) -> Result<InventoryItem> {
        let item = self
            .store
            .restore_unit(incident_id, item_id, target_kind, target_id)
            .await?;

        tracing::info!(
            incident_id = %incident_id,
            item_id = %item_id,
            target_id,
            target_kind = %target_kind,
            "Material restored, incident resolved"
        );
        metrics::counter!("inventory.incidents.resolved").increment(1);

        Ok(item)
    }
}
