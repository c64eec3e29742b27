//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        carts::{
            records::{CartOwner, CartUuid, SnapshotLine},
            repositories::{PgCartItemsRepository, PgCartSnapshotReader, PgCartsRepository},
        },
        inventory::ledger::PgInventoryLedger,
        orders::{
            address::Address,
            data::{MAX_NOTES_LEN, MAX_PAYMENT_METHOD_LEN, NewOrder, OrderListQuery, OrderStatusUpdate},
            drift::PriceDriftPolicy,
            errors::OrdersServiceError,
            records::{OrderItemRecord, OrderPage, OrderRecord, OrderStatistics, OrderTotals, OrderUuid},
            repositories::{InsertOrder, NewOrderItem, PgOrderItemsRepository, PgOrdersRepository},
            status::OrderStatus,
        },
        pricing::PricingEngine,
        products::{records::ProductRecord, repository::PgProductsRepository},
        users::UserUuid,
    },
};

const MAX_TRACKING_NUMBER_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    pricing: Arc<dyn PricingEngine>,
    drift_policy: PriceDriftPolicy,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    carts_repository: PgCartsRepository,
    cart_items_repository: PgCartItemsRepository,
    snapshot_reader: PgCartSnapshotReader,
    products_repository: PgProductsRepository,
    ledger: PgInventoryLedger,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, pricing: Arc<dyn PricingEngine>, drift_policy: PriceDriftPolicy) -> Self {
        Self {
            db,
            pricing,
            drift_policy,
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            carts_repository: PgCartsRepository::new(),
            cart_items_repository: PgCartItemsRepository::new(),
            snapshot_reader: PgCartSnapshotReader::new(),
            products_repository: PgProductsRepository::new(),
            ledger: PgInventoryLedger::new(),
        }
    }

    /// Re-read every product under a shared lock and price the lines from it.
    async fn price_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        lines: Vec<SnapshotLine>,
    ) -> Result<Vec<NewOrderItem>, OrdersServiceError> {
        let mut product_uuids: Vec<_> = lines.iter().map(|line| line.product).collect();
        product_uuids.sort_unstable();

        let products = self
            .products_repository
            .lock_products_for_share(tx, &product_uuids)
            .await?;

        build_order_items(lines, &products, &self.drift_policy)
    }

    /// Return every reserved unit of `order` to stock, in ascending product order.
    async fn release_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, OrdersServiceError> {
        let mut items = self.items_repository.get_order_items(tx, &[order]).await?;
        items.sort_by_key(|item| item.product_uuid);

        for item in &items {
            self.ledger.release(tx, item.product_uuid, item.quantity).await?;
        }

        Ok(items)
    }
}

/// Check each cart line against the locked catalog rows and turn it into an
/// order line at the live price. Lines come back in ascending product order.
fn build_order_items(
    mut lines: Vec<SnapshotLine>,
    products: &[ProductRecord],
    drift_policy: &PriceDriftPolicy,
) -> Result<Vec<NewOrderItem>, OrdersServiceError> {
    let products: FxHashMap<_, _> = products
        .iter()
        .map(|product| (product.uuid, product))
        .collect();

    lines.sort_by_key(|line| line.product);

    lines
        .into_iter()
        .map(|line| {
            let product = products
                .get(&line.product)
                .filter(|product| product.status.is_sellable() && product.deleted_at.is_none())
                .ok_or(OrdersServiceError::ProductUnavailable {
                    product: line.product,
                })?;

            if drift_policy.exceeded(line.added_price, product.price) {
                return Err(OrdersServiceError::PriceChanged {
                    product: product.uuid,
                    expected: line.added_price,
                    actual: product.price,
                });
            }

            let line_total = product
                .price
                .checked_mul(u64::from(line.quantity))
                .ok_or_else(amount_overflow)?;

            Ok(NewOrderItem {
                product: product.uuid,
                title: product.title.clone(),
                quantity: line.quantity,
                unit_price: product.price,
                line_total,
            })
        })
        .collect()
}

fn amount_overflow() -> OrdersServiceError {
    OrdersServiceError::Validation("order amounts overflow".to_string())
}

fn validate_text(
    value: Option<String>,
    field: &str,
    max_len: usize,
) -> Result<Option<String>, OrdersServiceError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = value.trim();

    if value.chars().count() > max_len {
        return Err(OrdersServiceError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }

    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// A [`NewOrder`] with addresses normalized and free text trimmed.
struct ValidatedOrder {
    uuid: OrderUuid,
    cart: CartUuid,
    shipping_address: Address,
    billing_address: Address,
    payment_method: String,
    notes: Option<String>,
}

fn validate_new_order(order: NewOrder) -> Result<ValidatedOrder, OrdersServiceError> {
    let shipping_address = order.shipping_address.normalized();
    shipping_address.validate()?;

    let billing_address = match order.billing_address {
        Some(address) => {
            let address = address.normalized();
            address.validate()?;
            address
        }
        None => shipping_address.clone(),
    };

    let payment_method = validate_text(
        Some(order.payment_method),
        "payment_method",
        MAX_PAYMENT_METHOD_LEN,
    )?
    .ok_or_else(|| OrdersServiceError::Validation("payment_method is required".to_string()))?;

    Ok(ValidatedOrder {
        uuid: order.uuid,
        cart: order.cart,
        shipping_address,
        billing_address,
        payment_method,
        notes: validate_text(order.notes, "notes", MAX_NOTES_LEN)?,
    })
}

fn group_items(items: Vec<OrderItemRecord>) -> FxHashMap<OrderUuid, Vec<OrderItemRecord>> {
    let mut grouped: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

    for item in items {
        grouped.entry(item.order_uuid).or_default().push(item);
    }

    grouped
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, owner, order),
        fields(
            owner_uuid = %owner,
            order_uuid = %order.uuid,
            cart_uuid = %order.cart
        ),
        err
    )]
    async fn create_order(
        &self,
        owner: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let order = validate_new_order(order)?;

        let mut tx = self.db.begin().await?;

        if self
            .orders_repository
            .order_exists(&mut tx, order.uuid)
            .await?
        {
            return Err(OrdersServiceError::AlreadyExists);
        }

        let cart = self
            .carts_repository
            .lock_cart(&mut tx, order.cart, &CartOwner::User(owner))
            .await?;

        let snapshot = self.snapshot_reader.snapshot(&mut tx, &cart).await?;

        if snapshot.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let lines = self.price_lines(&mut tx, snapshot.lines).await?;

        let subtotal = lines
            .iter()
            .try_fold(0_u64, |acc, line| acc.checked_add(line.line_total))
            .ok_or_else(amount_overflow)?;

        let item_count = lines
            .iter()
            .try_fold(0_u32, |acc, line| acc.checked_add(line.quantity))
            .ok_or_else(amount_overflow)?;

        let country = order.shipping_address.country.as_str();
        let tax = self.pricing.compute_tax(subtotal, country);
        let shipping = self.pricing.compute_shipping(country, item_count);

        let totals = OrderTotals::new(subtotal, tax, shipping, 0).ok_or_else(amount_overflow)?;

        let mut record = self
            .orders_repository
            .create_order(
                &mut tx,
                &InsertOrder {
                    uuid: order.uuid,
                    owner,
                    totals,
                    shipping_address: &order.shipping_address,
                    billing_address: &order.billing_address,
                    payment_method: &order.payment_method,
                    notes: order.notes.as_deref(),
                },
            )
            .await?;

        let mut items = Vec::with_capacity(lines.len());

        for line in &lines {
            items.push(
                self.items_repository
                    .create_order_item(&mut tx, record.uuid, line)
                    .await?,
            );
        }

        for line in &lines {
            self.ledger
                .reserve(&mut tx, line.product, line.quantity)
                .await?;
        }

        self.cart_items_repository
            .clear_cart_items(&mut tx, cart.uuid)
            .await?;

        self.carts_repository.delete_cart(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        record.items = items;

        info!(
            order_uuid = %record.uuid,
            total = record.total,
            item_count = record.item_count(),
            "order placed"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self, owner, order),
        fields(owner_uuid = %owner, order_uuid = %order),
        err
    )]
    async fn cancel_order(&self, owner: UserUuid, order: OrderUuid) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .orders_repository
            .lock_order(&mut tx, order, Some(owner))
            .await?;

        if record.status != OrderStatus::Pending {
            return Err(OrdersServiceError::InvalidTransition {
                from: record.status,
                to: OrderStatus::Cancelled,
            });
        }

        let next = record.status.transition(OrderStatus::Cancelled)?;

        self.orders_repository
            .update_order_status(&mut tx, order, next, None, None, None)
            .await?;

        let released = self.release_items(&mut tx, order).await?;

        tx.commit().await?;

        info!(released_lines = released.len(), "order cancelled");

        Ok(())
    }

    #[tracing::instrument(
        name = "orders.service.update_order_status",
        skip(self, order, update),
        fields(order_uuid = %order, status = %update.status),
        err
    )]
    async fn update_order_status(
        &self,
        order: OrderUuid,
        update: OrderStatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let notes = validate_text(update.notes, "notes", MAX_NOTES_LEN)?;
        let tracking_number = validate_text(
            update.tracking_number,
            "tracking_number",
            MAX_TRACKING_NUMBER_LEN,
        )?;
        let payment_reference = validate_text(
            update.payment_reference,
            "payment_reference",
            MAX_TRACKING_NUMBER_LEN,
        )?;

        let mut tx = self.db.begin().await?;

        let current = self
            .orders_repository
            .lock_order(&mut tx, order, None)
            .await?;

        let next = current.status.transition(update.status)?;

        let mut record = self
            .orders_repository
            .update_order_status(
                &mut tx,
                order,
                next,
                notes.as_deref(),
                tracking_number.as_deref(),
                payment_reference.as_deref(),
            )
            .await?;

        let items = if next == OrderStatus::Cancelled && current.status.holds_reservations() {
            self.release_items(&mut tx, order).await?
        } else {
            self.items_repository.get_order_items(&mut tx, &[order]).await?
        };

        tx.commit().await?;

        record.items = items;

        info!(from = %current.status, to = %next, "order status changed");

        Ok(record)
    }

    async fn get_order(
        &self,
        owner: Option<UserUuid>,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .orders_repository
            .get_order(&mut tx, order, owner)
            .await?;

        record.items = self.items_repository.get_order_items(&mut tx, &[order]).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders(
        &self,
        owner: Option<UserUuid>,
        query: OrderListQuery,
    ) -> Result<OrderPage, OrdersServiceError> {
        query
            .validate()
            .map_err(|reason| OrdersServiceError::Validation(reason.to_string()))?;

        let mut tx = self.db.begin().await?;

        let total_count = self
            .orders_repository
            .count_orders(&mut tx, owner, &query)
            .await?;

        let mut orders = self
            .orders_repository
            .list_orders(&mut tx, owner, &query)
            .await?;

        let uuids: Vec<_> = orders.iter().map(|order| order.uuid).collect();

        let mut items = group_items(self.items_repository.get_order_items(&mut tx, &uuids).await?);

        tx.commit().await?;

        for order in &mut orders {
            order.items = items.remove(&order.uuid).unwrap_or_default();
        }

        debug!(total_count, returned = orders.len(), "listed orders");

        Ok(OrderPage {
            orders,
            total_count,
            page: query.page,
            page_size: query.page_size,
            total_pages: total_count.div_ceil(u64::from(query.page_size)),
        })
    }

    async fn statistics(&self) -> Result<OrderStatistics, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let statistics = self.orders_repository.statistics(&mut tx).await?;

        tx.commit().await?;

        Ok(statistics)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Convert the owner's cart into a `pending` order, reserving stock for
    /// every line. Nothing is written unless every step succeeds.
    async fn create_order(
        &self,
        owner: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel a `pending` order on behalf of its owner and release its stock.
    async fn cancel_order(&self, owner: UserUuid, order: OrderUuid) -> Result<(), OrdersServiceError>;

    /// Move any order along its lifecycle. Cancelling releases its stock.
    async fn update_order_status(
        &self,
        order: OrderUuid,
        update: OrderStatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Fetch an order with its items. `None` skips the ownership check.
    async fn get_order(
        &self,
        owner: Option<UserUuid>,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// One page of orders, restricted to `owner` when given.
    async fn list_orders(
        &self,
        owner: Option<UserUuid>,
        query: OrderListQuery,
    ) -> Result<OrderPage, OrdersServiceError>;

    async fn statistics(&self) -> Result<OrderStatistics, OrdersServiceError>;
}
