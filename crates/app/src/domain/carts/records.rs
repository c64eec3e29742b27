//! Cart Records

use jiff::Timestamp;

use crate::{
    domain::{
        products::records::{ProductStatus, ProductUuid},
        users::UserUuid,
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Who a cart belongs to. Each owner has at most one live cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    User(UserUuid),
    Guest(String),
}

impl CartOwner {
    pub(crate) fn user_uuid(&self) -> Option<uuid::Uuid> {
        match self {
            Self::User(user) => Some(user.into_uuid()),
            Self::Guest(_) => None,
        }
    }

    pub(crate) fn guest_token(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Guest(token) => Some(token),
        }
    }
}

/// Cart Record
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub owner: CartOwner,
    pub expires_at: Timestamp,
    pub items: Vec<CartItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// CartItem Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,

    /// Unit price seen when the line was last added to.
    pub added_price: u64,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    /// `quantity * added_price`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.added_price.checked_mul(u64::from(self.quantity))
    }
}

/// A cart line priced against the live catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLine {
    pub item: CartItemUuid,
    pub product: ProductUuid,
    pub title: String,
    pub status: ProductStatus,
    pub quantity: u32,

    /// Catalog price at the time of the snapshot.
    pub unit_price: u64,

    /// Price recorded on the line when it was added.
    pub added_price: u64,

    /// `quantity * unit_price`
    pub line_total: u64,
}

/// Immutable, fully priced view of a cart at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub cart: CartUuid,
    pub owner: CartOwner,
    pub lines: Vec<SnapshotLine>,
    pub subtotal: u64,
    pub total_item_count: u32,
}

impl CartSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
