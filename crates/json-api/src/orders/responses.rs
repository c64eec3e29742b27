//! Order Requests & Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::orders::{
    address::Address,
    records::{OrderItemRecord, OrderPage, OrderRecord, OrderStatistics, OrderStatusCounts},
};

/// Postal address
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddressBody {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    /// ISO 3166-1 alpha-2 country code
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<AddressBody> for Address {
    fn from(body: AddressBody) -> Self {
        Self {
            first_name: body.first_name,
            last_name: body.last_name,
            company: body.company,
            address_line1: body.address_line1,
            address_line2: body.address_line2,
            city: body.city,
            state: body.state,
            postal_code: body.postal_code,
            country: body.country,
            phone: body.phone,
        }
    }
}

impl From<Address> for AddressBody {
    fn from(address: Address) -> Self {
        Self {
            first_name: address.first_name,
            last_name: address.last_name,
            company: address.company,
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            phone: address.phone,
        }
    }
}

/// Order Response
///
/// Amounts are integer minor currency units.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub owner_uuid: Uuid,

    /// `pending`, `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,

    pub subtotal: u64,
    pub tax: u64,
    pub shipping: u64,
    pub discount: u64,
    pub total: u64,
    pub shipping_address: AddressBody,
    pub billing_address: AddressBody,
    pub payment_method: String,
    pub payment_reference: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,

    /// Number of distinct lines
    pub item_count: usize,

    /// Sum of line quantities
    pub total_quantity: u64,

    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        let item_count = order.item_count();
        let total_quantity = order.total_quantity();

        Self {
            uuid: order.uuid.into_uuid(),
            owner_uuid: order.owner.into_uuid(),
            status: order.status.to_string(),
            subtotal: order.subtotal,
            tax: order.tax,
            shipping: order.shipping,
            discount: order.discount,
            total: order.total,
            shipping_address: order.shipping_address.into(),
            billing_address: order.billing_address.into(),
            payment_method: order.payment_method,
            payment_reference: order.payment_reference,
            tracking_number: order.tracking_number,
            notes: order.notes,
            item_count,
            total_quantity,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,

    /// Product title at the time of ordering
    pub title: String,

    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            title: item.title,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

/// One page of orders
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderPageResponse {
    pub orders: Vec<OrderResponse>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl From<OrderPage> for OrderPageResponse {
    fn from(page: OrderPage) -> Self {
        Self {
            orders: page.orders.into_iter().map(OrderResponse::from).collect(),
            total_count: page.total_count,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }
}

/// Aggregate sales figures. Cancelled orders are excluded from revenue.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderStatisticsResponse {
    pub total_orders: u64,
    pub total_revenue: u64,
    pub total_items_sold: u64,
    pub average_order_value: u64,
    pub status_counts: StatusCountsResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatusCountsResponse {
    pub pending: u64,
    pub processing: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub cancelled: u64,
}

impl From<OrderStatusCounts> for StatusCountsResponse {
    fn from(counts: OrderStatusCounts) -> Self {
        Self {
            pending: counts.pending,
            processing: counts.processing,
            shipped: counts.shipped,
            delivered: counts.delivered,
            cancelled: counts.cancelled,
        }
    }
}

impl From<OrderStatistics> for OrderStatisticsResponse {
    fn from(stats: OrderStatistics) -> Self {
        Self {
            total_orders: stats.total_orders,
            total_revenue: stats.total_revenue,
            total_items_sold: stats.total_items_sold,
            average_order_value: stats.average_order_value,
            status_counts: stats.status_counts.into(),
        }
    }
}


#[cfg(test)]
mod tests {
    use emporium_app::domain::{
        orders::{records::OrderUuid, status::OrderStatus},
        users::UserUuid,
    };

    use super::{fixtures::make_order, *};

    #[test]
    fn order_response_reports_counts_and_totals() {
        let response = OrderResponse::from(make_order(
            OrderUuid::new(),
            UserUuid::new(),
            OrderStatus::Pending,
        ));

        assert_eq!(response.status, "pending");
        assert_eq!(response.item_count, 2);
        assert_eq!(response.total_quantity, 3);
        assert_eq!(response.total, 49_19);
        assert_eq!(
            response.items.iter().map(|item| item.line_total).sum::<u64>(),
            response.subtotal
        );
    }
}
