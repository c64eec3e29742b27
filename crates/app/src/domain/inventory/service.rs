//! Inventory service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        inventory::{
            data::StockAdjustment,
            errors::InventoryServiceError,
            ledger::PgInventoryLedger,
            records::{AdjustmentRecord, InventoryRecord},
        },
        products::records::ProductUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    ledger: PgInventoryLedger,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            ledger: PgInventoryLedger::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn get_inventory(
        &self,
        product: ProductUuid,
    ) -> Result<InventoryRecord, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.ledger.get_inventory(&mut tx, product).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "inventory.service.ensure_inventory",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn ensure_inventory(
        &self,
        product: ProductUuid,
    ) -> Result<InventoryRecord, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.ledger.ensure_inventory(&mut tx, product).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "inventory.service.adjust_stock",
        skip(self, adjustment),
        fields(
            product_uuid = %product,
            delta = adjustment.delta,
            reason = %adjustment.reason
        ),
        err
    )]
    async fn adjust_stock(
        &self,
        product: ProductUuid,
        adjustment: StockAdjustment,
    ) -> Result<InventoryRecord, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let (record, audit) = self
            .ledger
            .adjust_stock(&mut tx, product, &adjustment)
            .await?;

        tx.commit().await?;

        info!(
            adjustment_uuid = %audit.uuid,
            quantity = record.quantity,
            reserved = record.reserved,
            "adjusted stock"
        );

        Ok(record)
    }

    async fn list_adjustments(
        &self,
        product: ProductUuid,
        limit: u32,
    ) -> Result<Vec<AdjustmentRecord>, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let adjustments = self.ledger.list_adjustments(&mut tx, product, limit).await?;

        tx.commit().await?;

        Ok(adjustments)
    }
}

/// Operator-facing stock management. Reservations are only made and
/// released by the order pipeline.
#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Current stock counts for a product.
    async fn get_inventory(
        &self,
        product: ProductUuid,
    ) -> Result<InventoryRecord, InventoryServiceError>;

    /// Create an empty inventory record for a product if it has none.
    async fn ensure_inventory(
        &self,
        product: ProductUuid,
    ) -> Result<InventoryRecord, InventoryServiceError>;

    /// Apply a restock, write-off or correction to on-hand quantity.
    async fn adjust_stock(
        &self,
        product: ProductUuid,
        adjustment: StockAdjustment,
    ) -> Result<InventoryRecord, InventoryServiceError>;

    /// Most recent adjustments for a product, newest first.
    async fn list_adjustments(
        &self,
        product: ProductUuid,
        limit: u32,
    ) -> Result<Vec<AdjustmentRecord>, InventoryServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::inventory::records::AdjustmentReason, test::TestContext};

    use super::*;

    fn restock(delta: i64) -> StockAdjustment {
        StockAdjustment {
            delta,
            reason: AdjustmentReason::Restock,
            note: None,
        }
    }

    #[tokio::test]
    async fn ensure_inventory_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Kettle", 25_00).await?;

        let first = ctx.inventory.ensure_inventory(product.uuid).await?;
        ctx.inventory.adjust_stock(product.uuid, restock(4)).await?;
        let second = ctx.inventory.ensure_inventory(product.uuid).await?;

        assert_eq!(first.quantity, 0);
        assert_eq!(second.quantity, 4, "existing record must be returned untouched");

        Ok(())
    }

    #[tokio::test]
    async fn ensure_inventory_for_unknown_product_is_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx.inventory.ensure_inventory(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(InventoryServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn adjust_stock_records_an_audit_row() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_stocked_product("Mug", 8_00, 10).await?;

        let record = ctx
            .inventory
            .adjust_stock(
                product.uuid,
                StockAdjustment {
                    delta: -3,
                    reason: AdjustmentReason::Damage,
                    note: Some("dropped pallet".to_string()),
                },
            )
            .await?;

        assert_eq!(record.quantity, 7);
        assert_eq!(record.reserved, 0);

        let adjustments = ctx.inventory.list_adjustments(product.uuid, 10).await?;

        assert_eq!(adjustments.len(), 2);
        assert_eq!(adjustments[0].delta, -3);
        assert_eq!(adjustments[0].reason, AdjustmentReason::Damage);
        assert_eq!(adjustments[0].quantity_after, 7);
        assert_eq!(adjustments[0].note.as_deref(), Some("dropped pallet"));

        Ok(())
    }

    #[tokio::test]
    async fn adjust_stock_cannot_drop_below_reserved() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_stocked_product("Vase", 40_00, 5).await?;

        let mut tx = ctx.db.begin_test_transaction().await;
        PgInventoryLedger::new()
            .reserve(&mut tx, product.uuid, 3)
            .await?;
        tx.commit().await?;

        let result = ctx.inventory.adjust_stock(product.uuid, restock(-3)).await;

        assert!(
            matches!(
                result,
                Err(InventoryServiceError::AdjustmentBelowReserved {
                    quantity: 5,
                    reserved: 3,
                    ..
                })
            ),
            "expected AdjustmentBelowReserved, got {result:?}"
        );

        let record = ctx.inventory.get_inventory(product.uuid).await?;

        assert_eq!(record.quantity, 5);
        assert_eq!(record.reserved, 3);

        Ok(())
    }

    #[tokio::test]
    async fn adjust_stock_cannot_drop_below_zero() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_stocked_product("Rug", 90_00, 2).await?;

        let result = ctx.inventory.adjust_stock(product.uuid, restock(-5)).await;

        assert!(
            matches!(result, Err(InventoryServiceError::AdjustmentBelowReserved { .. })),
            "expected AdjustmentBelowReserved, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn zero_adjustment_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_stocked_product("Stool", 30_00, 1).await?;

        let result = ctx.inventory.adjust_stock(product.uuid, restock(0)).await;

        assert!(
            matches!(result, Err(InventoryServiceError::InvalidAdjustment(_))),
            "expected InvalidAdjustment, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn adjusting_missing_inventory_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Shelf", 60_00).await?;

        let result = ctx.inventory.adjust_stock(product.uuid, restock(1)).await;

        assert!(
            matches!(result, Err(InventoryServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
