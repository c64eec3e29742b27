//! Inventory Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::inventory::records::{AdjustmentRecord, InventoryRecord};

/// Inventory Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InventoryResponse {
    pub product_uuid: Uuid,

    /// Units on hand
    pub quantity: u64,

    /// Units held by open orders
    pub reserved: u64,

    /// `quantity - reserved`
    pub available: u64,

    pub updated_at: String,
}

impl From<InventoryRecord> for InventoryResponse {
    fn from(record: InventoryRecord) -> Self {
        Self {
            product_uuid: record.product_uuid.into_uuid(),
            quantity: record.quantity,
            reserved: record.reserved,
            available: record.available(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

/// Adjustment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdjustmentResponse {
    pub uuid: Uuid,
    pub delta: i64,
    pub reason: String,
    pub note: Option<String>,
    pub quantity_after: u64,
    pub created_at: String,
}

impl From<AdjustmentRecord> for AdjustmentResponse {
    fn from(record: AdjustmentRecord) -> Self {
        Self {
            uuid: record.uuid.into_uuid(),
            delta: record.delta,
            reason: record.reason.to_string(),
            note: record.note,
            quantity_after: record.quantity_after,
            created_at: record.created_at.to_string(),
        }
    }
}
