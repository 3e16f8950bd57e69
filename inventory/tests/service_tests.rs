//! Service tests for incident reporting and restoration, running against
//! the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code uses unwrap for clear failures

use marcha_core::{
    IncidentDraft, IncidentPriority, IncidentStatus, InventoryItem, ItemId, LocationKind,
    LocationStack, MaterialCondition, UserId, REPAIR_POOL,
};
use marcha_inventory::{InventoryError, InventoryService};
use marcha_testing::MemoryInventoryStore;

fn item(locations: Vec<LocationStack>) -> InventoryItem {
    InventoryItem {
        id: ItemId::new(),
        name: "Warning triangle".to_string(),
        sku: "TRI-01".to_string(),
        category: "safety".to_string(),
        quantity: 0,
        locations,
    }
}

fn draft() -> IncidentDraft {
    IncidentDraft {
        title: "Cracked reflector".to_string(),
        description: "Dropped during unloading".to_string(),
        priority: IncidentPriority::Medium,
        reported_by: UserId::new(),
    }
}

fn service_with_item(
    locations: Vec<LocationStack>,
) -> (InventoryService<MemoryInventoryStore>, MemoryInventoryStore, ItemId) {
    let store = MemoryInventoryStore::new();
    let item = item(locations);
    let item_id = item.id.clone();
    store.add_item(item);
    (InventoryService::new(store.clone()), store, item_id)
}

// A three-unit healthy stack splits into two stacks: two healthy units
// stay, one broken unit appears, and an open incident is created.
#[tokio::test]
async fn report_splits_multi_unit_stack() {
    let (service, store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Warehouse,
        "W1",
        3,
        None,
    )]);

    let incident = service
        .report_material_incident(draft(), &item_id, "W1", MaterialCondition::TotallyBroken)
        .await
        .unwrap();

    let item = store.item_snapshot(&item_id).unwrap();
    assert_eq!(
        item.locations,
        vec![
            LocationStack::new(LocationKind::Warehouse, "W1", 2, None),
            LocationStack::new(
                LocationKind::Warehouse,
                "W1",
                1,
                Some(MaterialCondition::TotallyBroken)
            ),
        ]
    );
    assert_eq!(item.total_stock(), 3);
    assert_eq!(incident.status, IncidentStatus::Open);
    assert_eq!(incident.source_location_id.as_deref(), Some("W1"));
    assert_eq!(incident.vehicle_id, None);
}

// A single-unit stack flips its status in place; no new stack appears.
#[tokio::test]
async fn report_flips_single_unit_in_place() {
    let (service, store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Warehouse,
        "W1",
        1,
        None,
    )]);

    service
        .report_material_incident(draft(), &item_id, "W1", MaterialCondition::TotallyBroken)
        .await
        .unwrap();

    let item = store.item_snapshot(&item_id).unwrap();
    assert_eq!(
        item.locations,
        vec![LocationStack::new(
            LocationKind::Warehouse,
            "W1",
            1,
            Some(MaterialCondition::TotallyBroken)
        )]
    );
    assert_eq!(item.total_stock(), 1);
}

#[tokio::test]
async fn report_from_vehicle_populates_vehicle_id() {
    let (service, _store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Vehicle,
        "V-042",
        2,
        None,
    )]);

    let incident = service
        .report_material_incident(
            draft(),
            &item_id,
            "V-042",
            MaterialCondition::WorkingUrgentChange,
        )
        .await
        .unwrap();

    assert_eq!(incident.vehicle_id.as_deref(), Some("V-042"));
}

#[tokio::test]
async fn report_without_stock_at_location_fails() {
    let (service, store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Warehouse,
        "W1",
        5,
        None,
    )]);

    let err = service
        .report_material_incident(draft(), &item_id, "W9", MaterialCondition::TotallyBroken)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        InventoryError::ItemNotFoundAtLocation {
            location_id: "W9".to_string()
        }
    );
    // All-or-nothing: no incident was created.
    assert_eq!(store.incident_count(), 0);
}

#[tokio::test]
async fn report_unknown_item_fails() {
    let (service, _store, _item_id) = service_with_item(vec![]);
    let err = service
        .report_material_incident(draft(), &ItemId::new(), "W1", MaterialCondition::TotallyBroken)
        .await
        .unwrap_err();
    assert_eq!(err, InventoryError::ItemNotFound);
}

// Report then restore: the broken unit returns as new_functional at the
// target location, the incident resolves, and total stock is conserved
// throughout.
#[tokio::test]
async fn restore_reverses_an_incident() {
    let (service, store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Warehouse,
        "W1",
        3,
        None,
    )]);

    let incident = service
        .report_material_incident(draft(), &item_id, "W1", MaterialCondition::TotallyBroken)
        .await
        .unwrap();

    let restored = service
        .restore_material(&incident.id, &item_id, "W2", LocationKind::Warehouse)
        .await
        .unwrap();

    assert_eq!(
        restored.locations,
        vec![
            LocationStack::new(LocationKind::Warehouse, "W1", 2, None),
            LocationStack::new(
                LocationKind::Warehouse,
                "W2",
                1,
                Some(MaterialCondition::NewFunctional)
            ),
        ]
    );
    assert_eq!(restored.total_stock(), 3);

    let incident = store.incident_snapshot(&incident.id).unwrap();
    assert_eq!(incident.status, IncidentStatus::Resolved);
    assert!(incident.updated_at >= incident.created_at);
}

#[tokio::test]
async fn restore_merges_existing_target_stack() {
    let (service, store, item_id) = service_with_item(vec![
        LocationStack::new(
            LocationKind::Warehouse,
            "W1",
            1,
            Some(MaterialCondition::TotallyBroken),
        ),
        LocationStack::new(
            LocationKind::Warehouse,
            "W2",
            4,
            Some(MaterialCondition::NewFunctional),
        ),
    ]);

    let incident = service
        .report_material_incident(draft(), &item_id, "W1", MaterialCondition::TotallyBroken)
        .await
        .unwrap();
    service
        .restore_material(&incident.id, &item_id, "W2", LocationKind::Warehouse)
        .await
        .unwrap();

    let item = store.item_snapshot(&item_id).unwrap();
    // No duplicated (kind, id, status) triple: the existing stack grew.
    assert_eq!(
        item.locations,
        vec![LocationStack::new(
            LocationKind::Warehouse,
            "W2",
            5,
            Some(MaterialCondition::NewFunctional)
        )]
    );
}

#[tokio::test]
async fn restore_drains_repair_pool_when_no_status_matches() {
    let (service, store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Warehouse,
        "W1",
        3,
        None,
    )]);
    let incident = service
        .report_material_incident(draft(), &item_id, "W1", MaterialCondition::TotallyBroken)
        .await
        .unwrap();

    // The broken unit was shipped off for repair: the broken stack is
    // gone, an unmarked unit sits in the repair pool.
    let mut shipped = store.item_snapshot(&item_id).unwrap();
    shipped.locations = vec![
        LocationStack::new(LocationKind::Warehouse, "W1", 2, None),
        LocationStack::new(LocationKind::Warehouse, REPAIR_POOL, 1, None),
    ];
    store.add_item(shipped);

    let restored = service
        .restore_material(&incident.id, &item_id, "W1", LocationKind::Warehouse)
        .await
        .unwrap();

    assert_eq!(restored.total_stock(), 3);
    assert!(
        restored
            .locations
            .iter()
            .all(|stack| stack.location_id != REPAIR_POOL)
    );
}

#[tokio::test]
async fn restore_hard_fails_without_restorable_unit() {
    let (service, store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Warehouse,
        "W1",
        5,
        None,
    )]);
    let incident = service
        .report_material_incident(draft(), &item_id, "W1", MaterialCondition::TotallyBroken)
        .await
        .unwrap();
    // Resolve it once, leaving no broken stock behind.
    service
        .restore_material(&incident.id, &item_id, "W1", LocationKind::Warehouse)
        .await
        .unwrap();

    let err = service
        .restore_material(&incident.id, &item_id, "W1", LocationKind::Warehouse)
        .await
        .unwrap_err();

    // No silent decrement of a healthy stack.
    assert_eq!(err, InventoryError::NoRestorableUnitFound);
    assert_eq!(store.item_snapshot(&item_id).unwrap().total_stock(), 5);
}

#[tokio::test]
async fn restore_unknown_incident_fails() {
    let (service, _store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Warehouse,
        "W1",
        1,
        Some(MaterialCondition::TotallyBroken),
    )]);

    let err = service
        .restore_material(
            &marcha_core::IncidentId::new(),
            &item_id,
            "W1",
            LocationKind::Warehouse,
        )
        .await
        .unwrap_err();
    assert_eq!(err, InventoryError::IncidentNotFound);
}

#[tokio::test]
async fn store_failures_surface_to_the_caller() {
    let (service, store, item_id) = service_with_item(vec![LocationStack::new(
        LocationKind::Warehouse,
        "W1",
        2,
        None,
    )]);
    store.fail_writes(true);

    let err = service
        .report_material_incident(draft(), &item_id, "W1", MaterialCondition::TotallyBroken)
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::Database(_)));
}
