//! Error types for inventory transactions.

use marcha_core::{StackError, StoreError};
use thiserror::Error;

/// Result type alias for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Failures of the inventory transactions, surfaced to the UI layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// The item id does not exist.
    #[error("Inventory item not found")]
    ItemNotFound,

    /// No stack at the source location can supply the incident unit.
    #[error("No unit of this item found at location {location_id}")]
    ItemNotFoundAtLocation {
        /// The location that was searched
        location_id: String,
    },

    /// No broken/urgent/ordered unit (nor the repair pool) to restore.
    #[error("No restorable unit found for this item")]
    NoRestorableUnitFound,

    /// The referenced incident does not exist.
    #[error("Incident not found")]
    IncidentNotFound,

    /// Concurrent-write conflict; the user should retry.
    #[error("The operation conflicted with a concurrent change, please retry")]
    Conflict,

    /// Database failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<StoreError> for InventoryError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::ItemNotFound => Self::ItemNotFound,
            StoreError::IncidentNotFound => Self::IncidentNotFound,
            StoreError::Stack(StackError::UnitNotFoundAtLocation { location_id }) => {
                Self::ItemNotFoundAtLocation { location_id }
            }
            StoreError::Stack(StackError::NoRestorableUnit) => Self::NoRestorableUnitFound,
            StoreError::Conflict => Self::Conflict,
            StoreError::Database(message) | StoreError::Serialization(message) => {
                Self::Database(message)
            }
            // Inventory transactions never reference users.
            StoreError::UserNotFound => Self::Database(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_errors_map_to_domain_errors() {
        let err: InventoryError = StoreError::Stack(StackError::NoRestorableUnit).into();
        assert_eq!(err, InventoryError::NoRestorableUnitFound);

        let err: InventoryError = StoreError::Stack(StackError::UnitNotFoundAtLocation {
            location_id: "W1".to_string(),
        })
        .into();
        assert_eq!(
            err,
            InventoryError::ItemNotFoundAtLocation {
                location_id: "W1".to_string()
            }
        );
    }
}
