//! Inventory Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{domain::products::records::ProductUuid, uuids::TypedUuid};

/// Stock counts for a single product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub product_uuid: ProductUuid,

    /// Units on hand.
    pub quantity: u64,

    /// Units held by open orders. Never exceeds `quantity`.
    pub reserved: u64,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InventoryRecord {
    /// Units that can still be reserved.
    #[must_use]
    pub fn available(&self) -> u64 {
        self.quantity.saturating_sub(self.reserved)
    }
}

/// Inventory Adjustment UUID
pub type AdjustmentUuid = TypedUuid<AdjustmentRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustmentReason {
    Restock,
    Damage,
    Correction,
    Return,
}

impl AdjustmentReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Restock => "restock",
            Self::Damage => "damage",
            Self::Correction => "correction",
            Self::Return => "return",
        }
    }
}

impl fmt::Display for AdjustmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown adjustment reason: {0}")]
pub struct UnknownAdjustmentReason(pub String);

impl FromStr for AdjustmentReason {
    type Err = UnknownAdjustmentReason;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "restock" => Ok(Self::Restock),
            "damage" => Ok(Self::Damage),
            "correction" => Ok(Self::Correction),
            "return" => Ok(Self::Return),
            other => Err(UnknownAdjustmentReason(other.to_string())),
        }
    }
}

/// Audit row written for every stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentRecord {
    pub uuid: AdjustmentUuid,
    pub product_uuid: ProductUuid,
    pub delta: i64,
    pub reason: AdjustmentReason,
    pub note: Option<String>,
    pub quantity_after: u64,
    pub created_at: Timestamp,
}
