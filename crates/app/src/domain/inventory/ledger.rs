//! Inventory Ledger
//!
//! Every operation runs inside the caller's transaction, so reservations
//! commit or roll back together with the order that owns them.

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tracing::{debug, warn};

use crate::{
    database::try_get_timestamp,
    domain::{
        inventory::{
            data::StockAdjustment,
            errors::InventoryServiceError,
            records::{AdjustmentReason, AdjustmentRecord, AdjustmentUuid, InventoryRecord},
        },
        products::records::ProductUuid,
    },
};

const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");
const RELEASE_STOCK_SQL: &str = include_str!("sql/release_stock.sql");
const GET_INVENTORY_SQL: &str = include_str!("sql/get_inventory.sql");
const LOCK_INVENTORY_SQL: &str = include_str!("sql/lock_inventory.sql");
const ENSURE_INVENTORY_SQL: &str = include_str!("sql/ensure_inventory.sql");
const ADJUST_QUANTITY_SQL: &str = include_str!("sql/adjust_quantity.sql");
const CREATE_ADJUSTMENT_SQL: &str = include_str!("sql/create_adjustment.sql");
const LIST_ADJUSTMENTS_SQL: &str = include_str!("sql/list_adjustments.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryLedger;

impl PgInventoryLedger {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Hold `quantity` units of `product` for the enclosing transaction.
    ///
    /// The availability check and the increment are one conditional update,
    /// so concurrent reservations of the last units cannot both succeed. A
    /// product without an inventory record has nothing to reserve.
    pub(crate) async fn reserve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), InventoryServiceError> {
        let rows_affected = query(RESERVE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(quantity))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            debug!(product_uuid = %product, quantity, "reservation rejected");

            return Err(InventoryServiceError::InsufficientStock {
                product,
                requested: quantity,
            });
        }

        Ok(())
    }

    /// Return `quantity` reserved units of `product`. `reserved` is clamped at zero.
    pub(crate) async fn release(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), InventoryServiceError> {
        let rows_affected = query(RELEASE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(quantity))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            warn!(product_uuid = %product, quantity, "released stock for product without inventory");
        }

        Ok(())
    }

    /// Change on-hand quantity and record the adjustment.
    ///
    /// Rejected when the result would fall below zero or below the units
    /// currently reserved. `reserved` is never touched.
    pub(crate) async fn adjust_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        adjustment: &StockAdjustment,
    ) -> Result<(InventoryRecord, AdjustmentRecord), InventoryServiceError> {
        if adjustment.delta == 0 {
            return Err(InventoryServiceError::InvalidAdjustment("delta must be non-zero"));
        }

        let current = query_as::<Postgres, InventoryRecord>(LOCK_INVENTORY_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        let below_reserved = || InventoryServiceError::AdjustmentBelowReserved {
            product,
            delta: adjustment.delta,
            quantity: current.quantity,
            reserved: current.reserved,
        };

        let quantity_after = current
            .quantity
            .checked_add_signed(adjustment.delta)
            .ok_or_else(below_reserved)?;

        if quantity_after < current.reserved {
            return Err(below_reserved());
        }

        let updated = query_as::<Postgres, InventoryRecord>(ADJUST_QUANTITY_SQL)
            .bind(product.into_uuid())
            .bind(adjustment.delta)
            .fetch_one(&mut **tx)
            .await?;

        let audit = query_as::<Postgres, AdjustmentRecord>(CREATE_ADJUSTMENT_SQL)
            .bind(AdjustmentUuid::new().into_uuid())
            .bind(product.into_uuid())
            .bind(adjustment.delta)
            .bind(adjustment.reason.as_str())
            .bind(adjustment.note.as_deref())
            .bind(stock_param(updated.quantity, "quantity_after")?)
            .fetch_one(&mut **tx)
            .await?;

        Ok((updated, audit))
    }

    pub(crate) async fn get_inventory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<InventoryRecord, sqlx::Error> {
        query_as::<Postgres, InventoryRecord>(GET_INVENTORY_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Create an empty record for `product` unless one already exists.
    pub(crate) async fn ensure_inventory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<InventoryRecord, sqlx::Error> {
        query_as::<Postgres, InventoryRecord>(ENSURE_INVENTORY_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_adjustments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        limit: u32,
    ) -> Result<Vec<AdjustmentRecord>, sqlx::Error> {
        query_as::<Postgres, AdjustmentRecord>(LIST_ADJUSTMENTS_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }
}

fn try_get_stock(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let stock_i64: i64 = row.try_get(col)?;

    u64::try_from(stock_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn stock_param(stock: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for InventoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_stock(row, "quantity")?,
            reserved: try_get_stock(row, "reserved")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AdjustmentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let reason: String = row.try_get("reason")?;

        let reason = reason
            .parse::<AdjustmentReason>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "reason".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: AdjustmentUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            delta: row.try_get("delta")?,
            reason,
            note: row.try_get("note")?,
            quantity_after: try_get_stock(row, "quantity_after")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn reserve_then_release_restores_the_ledger() -> TestResult {
        let ctx = TestContext::new().await;
        let ledger = PgInventoryLedger::new();
        let product = ctx.create_stocked_product("Lamp", 30_00, 10).await?;

        let before = ctx.inventory_of(product.uuid).await?;

        let mut tx = ctx.db.begin_test_transaction().await;
        ledger.reserve(&mut tx, product.uuid, 4).await?;
        let during = ledger.get_inventory(&mut tx, product.uuid).await?;
        ledger.release(&mut tx, product.uuid, 4).await?;
        tx.commit().await?;

        let after = ctx.inventory_of(product.uuid).await?;

        assert_eq!(during.reserved, 4);
        assert_eq!(during.available(), 6);
        assert_eq!(after.quantity, before.quantity);
        assert_eq!(after.reserved, before.reserved);

        Ok(())
    }

    #[tokio::test]
    async fn reserve_more_than_available_is_insufficient_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let ledger = PgInventoryLedger::new();
        let product = ctx.create_stocked_product("Desk", 120_00, 2).await?;

        let mut tx = ctx.db.begin_test_transaction().await;
        let result = ledger.reserve(&mut tx, product.uuid, 3).await;

        assert!(
            matches!(
                result,
                Err(InventoryServiceError::InsufficientStock { requested: 3, .. })
            ),
            "expected InsufficientStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn reserve_exactly_available_succeeds() -> TestResult {
        let ctx = TestContext::new().await;
        let ledger = PgInventoryLedger::new();
        let product = ctx.create_stocked_product("Bench", 75_00, 2).await?;

        let mut tx = ctx.db.begin_test_transaction().await;
        ledger.reserve(&mut tx, product.uuid, 2).await?;
        let record = ledger.get_inventory(&mut tx, product.uuid).await?;

        assert_eq!(record.available(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn reserve_without_inventory_record_is_insufficient_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let ledger = PgInventoryLedger::new();
        let product = ctx.create_product("Poster", 15_00).await?;

        let mut tx = ctx.db.begin_test_transaction().await;
        let result = ledger.reserve(&mut tx, product.uuid, 1).await;

        assert!(
            matches!(result, Err(InventoryServiceError::InsufficientStock { .. })),
            "expected InsufficientStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn release_is_clamped_at_zero() -> TestResult {
        let ctx = TestContext::new().await;
        let ledger = PgInventoryLedger::new();
        let product = ctx.create_stocked_product("Clock", 45_00, 5).await?;

        let mut tx = ctx.db.begin_test_transaction().await;
        ledger.reserve(&mut tx, product.uuid, 2).await?;
        ledger.release(&mut tx, product.uuid, 2).await?;
        ledger.release(&mut tx, product.uuid, 2).await?;
        let record = ledger.get_inventory(&mut tx, product.uuid).await?;

        assert_eq!(record.reserved, 0);
        assert_eq!(record.quantity, 5);

        Ok(())
    }

    #[tokio::test]
    async fn rolled_back_reservation_leaves_no_trace() -> TestResult {
        let ctx = TestContext::new().await;
        let ledger = PgInventoryLedger::new();
        let product = ctx.create_stocked_product("Frame", 12_00, 3).await?;

        {
            let mut tx = ctx.db.begin_test_transaction().await;
            ledger.reserve(&mut tx, product.uuid, 3).await?;
            tx.rollback().await?;
        }

        let record = ctx.inventory_of(product.uuid).await?;

        assert_eq!(record.reserved, 0);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_reservations_of_the_last_unit_only_one_wins() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_stocked_product("Last one", 50_00, 1).await?;

        let attempt = |pool: sqlx::PgPool| async move {
            let mut tx = pool.begin().await?;
            let result = PgInventoryLedger::new()
                .reserve(&mut tx, product.uuid, 1)
                .await;

            if result.is_ok() {
                tx.commit().await?;
            }

            Ok::<_, sqlx::Error>(result)
        };

        let (a, b) = tokio::join!(
            tokio::spawn(attempt(ctx.db.pool().clone())),
            tokio::spawn(attempt(ctx.db.pool().clone())),
        );

        let results = [a??, b??];
        let won = results.iter().filter(|result| result.is_ok()).count();
        let lost = results
            .iter()
            .filter(|result| matches!(result, Err(InventoryServiceError::InsufficientStock { .. })))
            .count();

        assert_eq!(won, 1, "exactly one reservation should succeed");
        assert_eq!(lost, 1, "the other reservation should see insufficient stock");

        let record = ctx.inventory_of(product.uuid).await?;

        assert_eq!(record.reserved, 1);

        Ok(())
    }
}
