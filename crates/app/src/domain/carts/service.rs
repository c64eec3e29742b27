//! Carts service.

use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        carts::{
            data::NewCartItem,
            errors::CartsServiceError,
            records::{CartItemRecord, CartItemUuid, CartOwner, CartRecord, CartSnapshot, CartUuid},
            repositories::{PgCartItemsRepository, PgCartSnapshotReader, PgCartsRepository},
        },
        products::repository::PgProductsRepository,
        users::UserUuid,
    },
};

/// Carts expire a week after they were last changed.
pub const DEFAULT_CART_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const MAX_GUEST_TOKEN_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    ttl: Duration,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
    snapshot_reader: PgCartSnapshotReader,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db, ttl: Duration) -> Self {
        Self {
            db,
            ttl,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
            snapshot_reader: PgCartSnapshotReader::new(),
        }
    }

    /// Return the owner's live cart, replacing an expired one and creating a
    /// new cart when there is none.
    async fn get_or_create_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<CartRecord, CartsServiceError> {
        if let Some(cart) = self
            .carts_repository
            .find_live_cart_for_owner(tx, owner)
            .await?
        {
            if cart.expires_at > Timestamp::now() {
                return Ok(cart);
            }

            debug!(cart_uuid = %cart.uuid, "superseding expired cart");

            self.items_repository.clear_cart_items(tx, cart.uuid).await?;
            self.carts_repository.delete_cart(tx, cart.uuid).await?;
        }

        let created = self
            .carts_repository
            .create_cart(tx, CartUuid::new(), owner, self.ttl)
            .await?;

        match created {
            Some(cart) => Ok(cart),
            // Lost a race with a concurrent creation for the same owner.
            None => self
                .carts_repository
                .find_live_cart_for_owner(tx, owner)
                .await?
                .ok_or(CartsServiceError::NotFound),
        }
    }
}

fn validate_owner(owner: &CartOwner) -> Result<(), CartsServiceError> {
    match owner {
        CartOwner::Guest(token) if token.trim().is_empty() => {
            Err(CartsServiceError::Validation("guest token must not be empty"))
        }
        CartOwner::Guest(token) if token.len() > MAX_GUEST_TOKEN_LEN => {
            Err(CartsServiceError::Validation("guest token is too long"))
        }
        CartOwner::User(_) | CartOwner::Guest(_) => Ok(()),
    }
}

fn line_quantity_overflow() -> CartsServiceError {
    CartsServiceError::Validation("line quantity exceeds the maximum of 4294967295")
}

fn validate_quantity(quantity: u32) -> Result<(), CartsServiceError> {
    if quantity == 0 {
        return Err(CartsServiceError::Validation(
            "quantity must be greater than zero",
        ));
    }

    Ok(())
}

#[async_trait]
impl CartsService for PgCartsService {
    #[tracing::instrument(name = "carts.service.get_or_create_cart", skip(self, owner), err)]
    async fn get_or_create_cart(&self, owner: CartOwner) -> Result<CartRecord, CartsServiceError> {
        validate_owner(&owner)?;

        let mut tx = self.db.begin().await?;

        let mut cart = self.get_or_create_in(&mut tx, &owner).await?;

        let items = self
            .items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        tx.commit().await?;

        cart.items = items;

        Ok(cart)
    }

    async fn get_cart(
        &self,
        owner: CartOwner,
        cart: CartUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .carts_repository
            .get_cart(&mut tx, cart, &owner)
            .await?;

        let items = self.items_repository.get_cart_items(&mut tx, cart).await?;

        tx.commit().await?;

        record.items = items;

        Ok(record)
    }

    async fn snapshot(
        &self,
        owner: CartOwner,
        cart: CartUuid,
    ) -> Result<CartSnapshot, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .carts_repository
            .get_cart(&mut tx, cart, &owner)
            .await?;

        let snapshot = self.snapshot_reader.snapshot(&mut tx, &record).await?;

        tx.commit().await?;

        Ok(snapshot)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, owner, item),
        fields(
            cart_uuid = %cart,
            product_uuid = %item.product_uuid,
            quantity = item.quantity
        ),
        err
    )]
    async fn add_item(
        &self,
        owner: CartOwner,
        cart: CartUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        validate_quantity(item.quantity)?;

        let mut tx = self.db.begin().await?;

        self.carts_repository
            .lock_cart(&mut tx, cart, &owner)
            .await?;

        let product = self
            .products_repository
            .get_product(&mut tx, item.product_uuid)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => CartsServiceError::UnknownProduct {
                    product: item.product_uuid,
                },
                other => other.into(),
            })?;

        if !product.status.is_sellable() {
            return Err(CartsServiceError::ProductUnavailable {
                product: product.uuid,
            });
        }

        let line = self
            .items_repository
            .upsert_cart_item(
                &mut tx,
                cart,
                item.uuid,
                item.product_uuid,
                item.quantity,
                product.price,
            )
            .await?
            .ok_or_else(line_quantity_overflow)?;

        self.carts_repository
            .touch_cart(&mut tx, cart, self.ttl)
            .await?;

        tx.commit().await?;

        debug!(item_uuid = %line.uuid, line_quantity = line.quantity, "added item to cart");

        Ok(line)
    }

    async fn update_item(
        &self,
        owner: CartOwner,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartItemRecord, CartsServiceError> {
        validate_quantity(quantity)?;

        let mut tx = self.db.begin().await?;

        self.carts_repository
            .lock_cart(&mut tx, cart, &owner)
            .await?;

        let line = self
            .items_repository
            .update_cart_item(&mut tx, cart, item, quantity)
            .await?;

        self.carts_repository
            .touch_cart(&mut tx, cart, self.ttl)
            .await?;

        tx.commit().await?;

        Ok(line)
    }

    async fn remove_item(
        &self,
        owner: CartOwner,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.carts_repository
            .lock_cart(&mut tx, cart, &owner)
            .await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn clear_cart(&self, owner: CartOwner, cart: CartUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.carts_repository
            .lock_cart(&mut tx, cart, &owner)
            .await?;

        self.items_repository
            .clear_cart_items(&mut tx, cart)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.merge_guest_cart",
        skip(self, guest_token),
        fields(user_uuid = %user),
        err
    )]
    async fn merge_guest_cart(
        &self,
        guest_token: String,
        user: UserUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let guest = CartOwner::Guest(guest_token);

        validate_owner(&guest)?;

        let mut tx = self.db.begin().await?;

        let guest_cart = self
            .carts_repository
            .find_live_cart_for_owner(&mut tx, &guest)
            .await?
            .filter(|cart| cart.expires_at > Timestamp::now())
            .ok_or(CartsServiceError::NotFound)?;

        let mut user_cart = self
            .get_or_create_in(&mut tx, &CartOwner::User(user))
            .await?;

        let guest_items = self
            .items_repository
            .get_cart_items(&mut tx, guest_cart.uuid)
            .await?;

        for item in &guest_items {
            self.items_repository
                .upsert_cart_item(
                    &mut tx,
                    user_cart.uuid,
                    CartItemUuid::new(),
                    item.product_uuid,
                    item.quantity,
                    item.added_price,
                )
                .await?
                .ok_or_else(line_quantity_overflow)?;
        }

        self.items_repository
            .clear_cart_items(&mut tx, guest_cart.uuid)
            .await?;

        self.carts_repository
            .delete_cart(&mut tx, guest_cart.uuid)
            .await?;

        self.carts_repository
            .touch_cart(&mut tx, user_cart.uuid, self.ttl)
            .await?;

        user_cart.items = self
            .items_repository
            .get_cart_items(&mut tx, user_cart.uuid)
            .await?;

        tx.commit().await?;

        info!(
            guest_cart_uuid = %guest_cart.uuid,
            cart_uuid = %user_cart.uuid,
            merged_lines = guest_items.len(),
            "merged guest cart"
        );

        Ok(user_cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Return the owner's live cart, creating one if needed.
    async fn get_or_create_cart(&self, owner: CartOwner) -> Result<CartRecord, CartsServiceError>;

    /// Retrieve a single unexpired cart with its items.
    async fn get_cart(
        &self,
        owner: CartOwner,
        cart: CartUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Price the cart against the live catalog.
    async fn snapshot(
        &self,
        owner: CartOwner,
        cart: CartUuid,
    ) -> Result<CartSnapshot, CartsServiceError>;

    /// Add an item to the given cart, merging with an existing line for the same product.
    async fn add_item(
        &self,
        owner: CartOwner,
        cart: CartUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Set the quantity of a cart line.
    async fn update_item(
        &self,
        owner: CartOwner,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Remove a line from the cart.
    async fn remove_item(
        &self,
        owner: CartOwner,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError>;

    /// Remove every line from the cart.
    async fn clear_cart(&self, owner: CartOwner, cart: CartUuid) -> Result<(), CartsServiceError>;

    /// Move a guest cart's lines into the user's cart and retire the guest cart.
    async fn merge_guest_cart(
        &self,
        guest_token: String,
        user: UserUuid,
    ) -> Result<CartRecord, CartsServiceError>;
}
