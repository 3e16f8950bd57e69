//! In-memory inventory store.
//!
//! Mutations run under one write lock, which stands in for the Postgres
//! row-locked transaction: the stack surgery and the incident write are
//! observed together or not at all.

use chrono::Utc;
use marcha_core::inventory::{add_restored_unit, split_incident_unit, take_restorable_unit};
use marcha_core::store::Result;
use marcha_core::{
    Incident, IncidentDraft, IncidentId, IncidentStatus, InventoryItem, InventoryStore, ItemId,
    LocationKind, MaterialCondition, StoreError,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct InventoryData {
    items: HashMap<ItemId, InventoryItem>,
    incidents: HashMap<IncidentId, Incident>,
    fail_writes: bool,
}

/// In-memory items + incidents store.
#[derive(Clone, Debug, Default)]
pub struct MemoryInventoryStore {
    inner: Arc<RwLock<InventoryData>>,
}

impl MemoryInventoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an item.
    pub fn add_item(&self, item: InventoryItem) {
        self.inner.write().unwrap().items.insert(item.id.clone(), item);
    }

    /// Snapshot of an item.
    #[must_use]
    pub fn item_snapshot(&self, item_id: &ItemId) -> Option<InventoryItem> {
        self.inner.read().unwrap().items.get(item_id).cloned()
    }

    /// Snapshot of an incident.
    #[must_use]
    pub fn incident_snapshot(&self, incident_id: &IncidentId) -> Option<Incident> {
        self.inner.read().unwrap().incidents.get(incident_id).cloned()
    }

    /// Number of stored incidents.
    #[must_use]
    pub fn incident_count(&self) -> usize {
        self.inner.read().unwrap().incidents.len()
    }

    /// Makes every transactional write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.write().unwrap().fail_writes = fail;
    }
}

impl InventoryStore for MemoryInventoryStore {
    async fn item(&self, item_id: &ItemId) -> Result<Option<InventoryItem>> {
        Ok(self.inner.read().unwrap().items.get(item_id).cloned())
    }

    async fn incident(&self, incident_id: &IncidentId) -> Result<Option<Incident>> {
        Ok(self.inner.read().unwrap().incidents.get(incident_id).cloned())
    }

    async fn report_incident(
        &self,
        item_id: &ItemId,
        location_id: &str,
        condition: MaterialCondition,
        draft: IncidentDraft,
    ) -> Result<Incident> {
        let mut data = self.inner.write().unwrap();
        if data.fail_writes {
            return Err(StoreError::Database("injected write failure".to_string()));
        }

        let item = data.items.get_mut(item_id).ok_or(StoreError::ItemNotFound)?;
        let source_kind = split_incident_unit(&mut item.locations, location_id, condition)?;

        let incident = Incident::open(draft, item_id.clone(), location_id, source_kind, Utc::now());
        data.incidents.insert(incident.id.clone(), incident.clone());
        Ok(incident)
    }

    async fn restore_unit(
        &self,
        incident_id: &IncidentId,
        item_id: &ItemId,
        target_kind: LocationKind,
        target_id: &str,
    ) -> Result<InventoryItem> {
        let mut data = self.inner.write().unwrap();
        if data.fail_writes {
            return Err(StoreError::Database("injected write failure".to_string()));
        }
        if !data.incidents.contains_key(incident_id) {
            return Err(StoreError::IncidentNotFound);
        }

        let item = data.items.get_mut(item_id).ok_or(StoreError::ItemNotFound)?;
        take_restorable_unit(&mut item.locations)?;
        add_restored_unit(&mut item.locations, target_kind, target_id);
        let restored = item.clone();

        if let Some(incident) = data.incidents.get_mut(incident_id) {
            incident.status = IncidentStatus::Resolved;
            incident.updated_at = Utc::now();
        }
        Ok(restored)
    }
}
