//! `PostgreSQL` inventory store.
//!
//! Both transactional operations follow the same shape: lock the item row
//! with `SELECT ... FOR UPDATE`, apply the pure stack surgery from
//! `marcha-core` to the decoded JSONB array, write the array back and
//! create/update the incident, then commit. A failure at any step rolls
//! everything back, so stock and incidents cannot diverge.

use crate::map_db_err;
use chrono::Utc;
use marcha_core::inventory::{add_restored_unit, split_incident_unit, take_restorable_unit};
use marcha_core::store::Result;
use marcha_core::{
    Incident, IncidentDraft, IncidentId, IncidentPriority, IncidentStatus, InventoryItem,
    InventoryStore, ItemId, LocationKind, LocationStack, MaterialCondition, StoreError, UserId,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

/// `PostgreSQL`-backed inventory items and incidents store.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Create a store using an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a store with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(map_db_err)?;
        Ok(Self::new(pool))
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn decode_locations(value: serde_json::Value) -> Result<Vec<LocationStack>> {
        serde_json::from_value(value)
            .map_err(|e| StoreError::Serialization(format!("Corrupt locations array: {e}")))
    }

    fn encode_locations(locations: &[LocationStack]) -> Result<serde_json::Value> {
        serde_json::to_value(locations).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn row_to_item(item_id: &ItemId, row: &PgRow) -> Result<InventoryItem> {
        Ok(InventoryItem {
            id: item_id.clone(),
            name: row.get("name"),
            sku: row.get("sku"),
            category: row.get("category"),
            quantity: row.get("quantity"),
            locations: Self::decode_locations(row.get("locations"))?,
        })
    }

    fn row_to_incident(row: &PgRow) -> Result<Incident> {
        let priority: String = row.get("priority");
        let priority = IncidentPriority::parse(&priority)
            .ok_or_else(|| StoreError::Serialization(format!("Unknown priority: {priority}")))?;
        let status: String = row.get("status");
        let status = IncidentStatus::parse(&status)
            .ok_or_else(|| StoreError::Serialization(format!("Unknown status: {status}")))?;
        let source_kind: Option<String> = row.get("source_location_type");
        let source_location_kind = source_kind.as_deref().and_then(LocationKind::parse);

        Ok(Incident {
            id: IncidentId::from_uuid(row.get("id")),
            title: row.get("title"),
            description: row.get("description"),
            priority,
            status,
            vehicle_id: row.get("vehicle_id"),
            reported_by: UserId::from_uuid(row.get("reported_by")),
            inventory_item_id: row
                .get::<Option<uuid::Uuid>, _>("inventory_item_id")
                .map(ItemId::from_uuid),
            source_location_id: row.get("source_location_id"),
            source_location_kind,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

impl InventoryStore for PostgresInventoryStore {
    async fn item(&self, item_id: &ItemId) -> Result<Option<InventoryItem>> {
        let row = sqlx::query(
            "SELECT name, sku, category, quantity, locations FROM inventory_items WHERE id = $1",
        )
        .bind(*item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.as_ref().map(|r| Self::row_to_item(item_id, r)).transpose()
    }

    async fn incident(&self, incident_id: &IncidentId) -> Result<Option<Incident>> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, priority, status, vehicle_id, reported_by,
                   inventory_item_id, source_location_id, source_location_type,
                   created_at, updated_at
            FROM incidents
            WHERE id = $1
            ",
        )
        .bind(*incident_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.as_ref().map(Self::row_to_incident).transpose()
    }

    async fn report_incident(
        &self,
        item_id: &ItemId,
        location_id: &str,
        condition: MaterialCondition,
        draft: IncidentDraft,
    ) -> Result<Incident> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let row = sqlx::query("SELECT locations FROM inventory_items WHERE id = $1 FOR UPDATE")
            .bind(*item_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?
            .ok_or(StoreError::ItemNotFound)?;

        let mut locations = Self::decode_locations(row.get("locations"))?;
        let source_kind = split_incident_unit(&mut locations, location_id, condition)?;

        sqlx::query("UPDATE inventory_items SET locations = $2 WHERE id = $1")
            .bind(*item_id.as_uuid())
            .bind(Self::encode_locations(&locations)?)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        let incident =
            Incident::open(draft, item_id.clone(), location_id, source_kind, Utc::now());

        sqlx::query(
            r"
            INSERT INTO incidents (
                id, title, description, priority, status, vehicle_id, reported_by,
                inventory_item_id, source_location_id, source_location_type,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(*incident.id.as_uuid())
        .bind(&incident.title)
        .bind(&incident.description)
        .bind(incident.priority.as_str())
        .bind(incident.status.as_str())
        .bind(&incident.vehicle_id)
        .bind(*incident.reported_by.as_uuid())
        .bind(incident.inventory_item_id.as_ref().map(|id| *id.as_uuid()))
        .bind(&incident.source_location_id)
        .bind(incident.source_location_kind.map(|kind| kind.as_str()))
        .bind(incident.created_at)
        .bind(incident.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        tracing::info!(
            incident_id = %incident.id,
            item_id = %item_id,
            location_id,
            "Incident stored with stack split"
        );

        Ok(incident)
    }

    async fn restore_unit(
        &self,
        incident_id: &IncidentId,
        item_id: &ItemId,
        target_kind: LocationKind,
        target_id: &str,
    ) -> Result<InventoryItem> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let incident_row = sqlx::query("SELECT id FROM incidents WHERE id = $1 FOR UPDATE")
            .bind(*incident_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?;
        if incident_row.is_none() {
            let _ = tx.rollback().await;
            return Err(StoreError::IncidentNotFound);
        }

        let row = sqlx::query(
            r"
            SELECT name, sku, category, quantity, locations
            FROM inventory_items
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(*item_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?
        .ok_or(StoreError::ItemNotFound)?;

        let mut item = Self::row_to_item(item_id, &row)?;
        take_restorable_unit(&mut item.locations)?;
        add_restored_unit(&mut item.locations, target_kind, target_id);

        sqlx::query("UPDATE inventory_items SET locations = $2 WHERE id = $1")
            .bind(*item_id.as_uuid())
            .bind(Self::encode_locations(&item.locations)?)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("UPDATE incidents SET status = 'resolved', updated_at = now() WHERE id = $1")
            .bind(*incident_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        tracing::info!(
            incident_id = %incident_id,
            item_id = %item_id,
            target_id,
            "Unit restored, incident resolved"
        );

        Ok(item)
    }
}
