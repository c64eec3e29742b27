//! Order Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{
        orders::{address::Address, status::OrderStatus},
        products::records::ProductUuid,
        users::UserUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub owner: UserUuid,
    pub status: OrderStatus,
    pub subtotal: u64,
    pub tax: u64,
    pub shipping: u64,
    pub discount: u64,

    /// `subtotal + tax + shipping - discount`, fixed at creation.
    pub total: u64,

    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Number of distinct lines.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// An order line with the title and unit price captured at placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub title: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
    pub created_at: Timestamp,
}

/// Monetary breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: u64,
    pub tax: u64,
    pub shipping: u64,
    pub discount: u64,
    pub total: u64,
}

impl OrderTotals {
    /// Combine the components, or `None` if the total overflows or the
    /// discount exceeds the rest of the order.
    #[must_use]
    pub fn new(subtotal: u64, tax: u64, shipping: u64, discount: u64) -> Option<Self> {
        let total = subtotal
            .checked_add(tax)?
            .checked_add(shipping)?
            .checked_sub(discount)?;

        Some(Self {
            subtotal,
            tax,
            shipping,
            discount,
            total,
        })
    }
}

/// Orders per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStatusCounts {
    pub pending: u64,
    pub processing: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub cancelled: u64,
}

/// Aggregate order figures. Cancelled orders are excluded from the totals
/// and only appear in [`OrderStatusCounts::cancelled`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStatistics {
    pub total_orders: u64,
    pub total_revenue: u64,
    pub total_items_sold: u64,

    /// `total_revenue / total_orders`, rounded half away from zero.
    pub average_order_value: u64,

    pub status_counts: OrderStatusCounts,
}

/// One page of a filtered order listing.
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<OrderRecord>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}
