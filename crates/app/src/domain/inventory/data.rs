//! Inventory Data

use crate::domain::inventory::records::AdjustmentReason;

/// Out-of-band change to on-hand quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    /// Signed change applied to `quantity`. Must be non-zero.
    pub delta: i64,
    pub reason: AdjustmentReason,
    pub note: Option<String>,
}
