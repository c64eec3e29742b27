//! Cart Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::carts::records::{
    CartItemRecord, CartRecord, CartSnapshot, SnapshotLine,
};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The items in the cart
    pub items: Vec<CartItemResponse>,

    /// When the cart stops accepting changes
    pub expires_at: String,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        Self {
            uuid: cart.uuid.into_uuid(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            expires_at: cart.expires_at.to_string(),
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    /// The product on this line
    pub product_uuid: Uuid,

    pub quantity: u32,

    /// Unit price in minor units when the line was last added to
    pub added_price: u64,

    /// `quantity * added_price`, absent on overflow
    pub line_total: Option<u64>,

    pub created_at: String,
    pub updated_at: String,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            quantity: item.quantity,
            added_price: item.added_price,
            line_total: item.line_total(),
            created_at: item.created_at.to_string(),
            updated_at: item.updated_at.to_string(),
        }
    }
}

/// Cart priced against the live catalog.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartSnapshotResponse {
    pub cart_uuid: Uuid,
    pub lines: Vec<SnapshotLineResponse>,

    /// Sum of line totals in minor units
    pub subtotal: u64,

    /// Sum of line quantities
    pub total_item_count: u32,
}

impl From<CartSnapshot> for CartSnapshotResponse {
    fn from(snapshot: CartSnapshot) -> Self {
        Self {
            cart_uuid: snapshot.cart.into_uuid(),
            lines: snapshot
                .lines
                .into_iter()
                .map(SnapshotLineResponse::from)
                .collect(),
            subtotal: snapshot.subtotal,
            total_item_count: snapshot.total_item_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SnapshotLineResponse {
    pub item_uuid: Uuid,
    pub product_uuid: Uuid,
    pub title: String,

    /// Catalog status (`draft`, `active`, `sold`, `cancelled`)
    pub status: String,

    pub quantity: u32,
    pub unit_price: u64,
    pub added_price: u64,
    pub line_total: u64,
}

impl From<SnapshotLine> for SnapshotLineResponse {
    fn from(line: SnapshotLine) -> Self {
        Self {
            item_uuid: line.item.into_uuid(),
            product_uuid: line.product.into_uuid(),
            title: line.title,
            status: line.status.to_string(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            added_price: line.added_price,
            line_total: line.line_total,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use jiff::Timestamp;

    use emporium_app::domain::{
        carts::records::{CartItemUuid, CartOwner, CartUuid},
        products::records::ProductUuid,
        users::UserUuid,
    };

    use super::*;

    pub(crate) fn make_cart(uuid: CartUuid, owner: UserUuid) -> CartRecord {
        CartRecord {
            uuid,
            owner: CartOwner::User(owner),
            expires_at: Timestamp::UNIX_EPOCH,
            items: Vec::new(),
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            deleted_at: None,
        }
    }

    pub(crate) fn make_item(cart: CartUuid, product: ProductUuid, quantity: u32) -> CartItemRecord {
        CartItemRecord {
            uuid: CartItemUuid::new(),
            cart_uuid: cart,
            product_uuid: product,
            quantity,
            added_price: 10_00,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }
}
