//! Orders Repository

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar, types::Json};

use crate::{
    database::{amount_param, try_get_amount, try_get_timestamp},
    domain::{
        orders::{
            address::Address,
            data::OrderListQuery,
            records::{OrderRecord, OrderStatistics, OrderStatusCounts, OrderTotals, OrderUuid},
            status::OrderStatus,
        },
        users::UserUuid,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const ORDER_EXISTS_SQL: &str = include_str!("../sql/order_exists.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("../sql/count_orders.sql");
const ORDER_STATISTICS_SQL: &str = include_str!("../sql/order_statistics.sql");

/// Column values for a new order row.
#[derive(Debug)]
pub(crate) struct InsertOrder<'a> {
    pub uuid: OrderUuid,
    pub owner: UserUuid,
    pub totals: OrderTotals,
    pub shipping_address: &'a Address,
    pub billing_address: &'a Address,
    pub payment_method: &'a str,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &InsertOrder<'_>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.owner.into_uuid())
            .bind(OrderStatus::Pending.as_str())
            .bind(amount_param(order.totals.subtotal, "subtotal")?)
            .bind(amount_param(order.totals.tax, "tax")?)
            .bind(amount_param(order.totals.shipping, "shipping")?)
            .bind(amount_param(order.totals.discount, "discount")?)
            .bind(amount_param(order.totals.total, "total")?)
            .bind(Json(order.shipping_address))
            .bind(Json(order.billing_address))
            .bind(order.payment_method)
            .bind(order.notes)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn order_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(ORDER_EXISTS_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch an order, restricted to `owner` when one is given.
    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        owner: Option<UserUuid>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(owner.map(UserUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    /// Like [`Self::get_order`], holding the row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        owner: Option<UserUuid>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(owner.map(UserUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    /// Write a status that has already been checked against the lifecycle.
    /// `None` fields keep their stored value.
    pub(crate) async fn update_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        notes: Option<&str>,
        tracking_number: Option<&str>,
        payment_reference: Option<&str>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(notes)
            .bind(tracking_number)
            .bind(payment_reference)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: Option<UserUuid>,
        query: &OrderListQuery,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let offset = i64::try_from(query.offset()).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(owner.map(UserUuid::into_uuid))
            .bind(query.status.map(OrderStatus::as_str))
            .bind(query.search_pattern())
            .bind(query.sort_by.as_str())
            .bind(query.direction.as_str())
            .bind(i64::from(query.page_size))
            .bind(offset)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: Option<UserUuid>,
        query: &OrderListQuery,
    ) -> Result<u64, sqlx::Error> {
        let count = query_scalar::<Postgres, i64>(COUNT_ORDERS_SQL)
            .bind(owner.map(UserUuid::into_uuid))
            .bind(query.status.map(OrderStatus::as_str))
            .bind(query.search_pattern())
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(count).map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }

    pub(crate) async fn statistics(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<OrderStatistics, sqlx::Error> {
        query_as::<Postgres, OrderStatistics>(ORDER_STATISTICS_SQL)
            .fetch_one(&mut **tx)
            .await
    }
}

/// `revenue / orders`, rounded half away from zero; zero when there are no orders.
pub(crate) fn average_order_value(total_revenue: u64, total_orders: u64) -> u64 {
    if total_orders == 0 {
        return 0;
    }

    (Decimal::from(total_revenue) / Decimal::from(total_orders))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0)
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        let Json(shipping_address) = row.try_get::<Json<Address>, _>("shipping_address")?;
        let Json(billing_address) = row.try_get::<Json<Address>, _>("billing_address")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            owner: UserUuid::from_uuid(row.try_get("owner_uuid")?),
            status,
            subtotal: try_get_amount(row, "subtotal")?,
            tax: try_get_amount(row, "tax")?,
            shipping: try_get_amount(row, "shipping")?,
            discount: try_get_amount(row, "discount")?,
            total: try_get_amount(row, "total")?,
            shipping_address,
            billing_address,
            payment_method: row.try_get("payment_method")?,
            payment_reference: row.try_get("payment_reference")?,
            tracking_number: row.try_get("tracking_number")?,
            notes: row.try_get("notes")?,
            items: Vec::new(),
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderStatistics {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let total_orders = try_get_amount(row, "total_orders")?;
        let total_revenue = try_get_amount(row, "total_revenue")?;

        Ok(Self {
            total_orders,
            total_revenue,
            total_items_sold: try_get_amount(row, "total_items_sold")?,
            average_order_value: average_order_value(total_revenue, total_orders),
            status_counts: OrderStatusCounts {
                pending: try_get_amount(row, "pending")?,
                processing: try_get_amount(row, "processing")?,
                shipped: try_get_amount(row, "shipped")?,
                delivered: try_get_amount(row, "delivered")?,
                cancelled: try_get_amount(row, "cancelled")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rounds_half_away_from_zero() {
        assert_eq!(average_order_value(10_00, 4), 2_50);
        assert_eq!(average_order_value(5, 2), 3);
        assert_eq!(average_order_value(10, 3), 3);
    }

    #[test]
    fn average_of_no_orders_is_zero() {
        assert_eq!(average_order_value(0, 0), 0);
    }
}
