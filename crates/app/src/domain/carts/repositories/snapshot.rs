//! Cart Snapshot Reader

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{try_get_amount, try_get_quantity},
    domain::{
        carts::{
            errors::CartsServiceError,
            records::{CartItemUuid, CartRecord, CartSnapshot, SnapshotLine},
        },
        products::records::{ProductStatus, ProductUuid},
    },
};

const GET_SNAPSHOT_LINES_SQL: &str = include_str!("../sql/get_snapshot_lines.sql");

/// A cart line joined with its product, before totals are computed.
#[derive(Debug, Clone)]
pub(crate) struct PricedLine {
    pub item: CartItemUuid,
    pub product: ProductUuid,
    pub title: String,
    pub status: ProductStatus,
    pub quantity: u32,
    pub unit_price: u64,
    pub added_price: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartSnapshotReader;

impl PgCartSnapshotReader {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Price every line of `cart` against the catalog as it stands now.
    pub(crate) async fn snapshot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &CartRecord,
    ) -> Result<CartSnapshot, CartsServiceError> {
        let lines = query_as::<Postgres, PricedLine>(GET_SNAPSHOT_LINES_SQL)
            .bind(cart.uuid.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        build_snapshot(cart, lines)
    }
}

pub(crate) fn build_snapshot(
    cart: &CartRecord,
    lines: Vec<PricedLine>,
) -> Result<CartSnapshot, CartsServiceError> {
    let mut subtotal: u64 = 0;
    let mut total_item_count: u32 = 0;
    let mut snapshot_lines = Vec::with_capacity(lines.len());

    for line in lines {
        let line_total = line
            .unit_price
            .checked_mul(u64::from(line.quantity))
            .ok_or(CartsServiceError::AmountOverflow)?;

        subtotal = subtotal
            .checked_add(line_total)
            .ok_or(CartsServiceError::AmountOverflow)?;

        total_item_count = total_item_count
            .checked_add(line.quantity)
            .ok_or(CartsServiceError::AmountOverflow)?;

        snapshot_lines.push(SnapshotLine {
            item: line.item,
            product: line.product,
            title: line.title,
            status: line.status,
            quantity: line.quantity,
            unit_price: line.unit_price,
            added_price: line.added_price,
            line_total,
        });
    }

    Ok(CartSnapshot {
        cart: cart.uuid,
        owner: cart.owner.clone(),
        lines: snapshot_lines,
        subtotal,
        total_item_count,
    })
}

impl<'r> FromRow<'r, PgRow> for PricedLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<ProductStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            item: CartItemUuid::from_uuid(row.try_get("uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            title: row.try_get("title")?,
            status,
            quantity: try_get_quantity(row, "quantity")?,
            unit_price: try_get_amount(row, "unit_price")?,
            added_price: try_get_amount(row, "added_price")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::domain::{
        carts::records::{CartOwner, CartUuid},
        users::UserUuid,
    };

    use super::*;

    fn cart() -> CartRecord {
        let now = Timestamp::now();

        CartRecord {
            uuid: CartUuid::new(),
            owner: CartOwner::User(UserUuid::new()),
            expires_at: now,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn line(quantity: u32, unit_price: u64, added_price: u64) -> PricedLine {
        PricedLine {
            item: CartItemUuid::new(),
            product: ProductUuid::new(),
            title: "Item".to_string(),
            status: ProductStatus::Active,
            quantity,
            unit_price,
            added_price,
        }
    }

    #[test]
    fn subtotal_is_the_sum_of_live_line_totals() -> TestResult {
        let cart = cart();

        let snapshot = build_snapshot(&cart, vec![line(2, 10_00, 9_50), line(1, 20_00, 20_00)])?;

        assert_eq!(snapshot.subtotal, 40_00);
        assert_eq!(snapshot.total_item_count, 3);
        assert_eq!(
            snapshot
                .lines
                .iter()
                .map(|line| line.line_total)
                .collect::<Vec<_>>(),
            vec![20_00, 20_00]
        );
        assert_eq!(snapshot.lines[0].added_price, 9_50);
        assert_eq!(snapshot.owner, cart.owner);

        Ok(())
    }

    #[test]
    fn empty_cart_has_zero_totals() -> TestResult {
        let snapshot = build_snapshot(&cart(), Vec::new())?;

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.subtotal, 0);
        assert_eq!(snapshot.total_item_count, 0);

        Ok(())
    }

    #[test]
    fn overflowing_line_total_is_rejected() {
        let result = build_snapshot(&cart(), vec![line(2, u64::MAX, u64::MAX)]);

        assert!(
            matches!(result, Err(CartsServiceError::AmountOverflow)),
            "expected AmountOverflow, got {result:?}"
        );
    }
}
