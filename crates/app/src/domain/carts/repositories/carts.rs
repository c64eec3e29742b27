//! Carts Repository

use std::time::Duration;

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{try_get_optional_timestamp, try_get_timestamp},
    domain::carts::records::{CartOwner, CartRecord, CartUuid},
    domain::users::UserUuid,
};

const FIND_LIVE_CART_FOR_OWNER_SQL: &str = include_str!("../sql/find_live_cart_for_owner.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const TOUCH_CART_SQL: &str = include_str!("../sql/touch_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Lock the owner's non-deleted cart, whether or not it has expired.
    pub(crate) async fn find_live_cart_for_owner(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(FIND_LIVE_CART_FOR_OWNER_SQL)
            .bind(owner.user_uuid())
            .bind(owner.guest_token())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Fetch an unexpired cart belonging to `owner`.
    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        owner: &CartOwner,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .bind(owner.user_uuid())
            .bind(owner.guest_token())
            .fetch_one(&mut **tx)
            .await
    }

    /// Like [`Self::get_cart`], holding the row lock until the transaction ends.
    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        owner: &CartOwner,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(LOCK_CART_SQL)
            .bind(cart.into_uuid())
            .bind(owner.user_uuid())
            .bind(owner.guest_token())
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert a cart for `owner`. Returns `None` when the owner already has a
    /// live cart, which another transaction may have just created.
    pub(crate) async fn create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        owner: &CartOwner,
        ttl: Duration,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        query_as::<Postgres, CartRecord>(CREATE_CART_SQL)
            .bind(cart.into_uuid())
            .bind(owner.user_uuid())
            .bind(owner.guest_token())
            .bind(ttl.as_secs_f64())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Push the cart's expiry `ttl` into the future.
    pub(crate) async fn touch_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        ttl: Duration,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_CART_SQL)
            .bind(cart.into_uuid())
            .bind(ttl.as_secs_f64())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Soft-delete a cart.
    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let owner_uuid: Option<Uuid> = row.try_get("owner_uuid")?;
        let guest_token: Option<String> = row.try_get("guest_token")?;

        let owner = match (owner_uuid, guest_token) {
            (Some(user), _) => CartOwner::User(UserUuid::from_uuid(user)),
            (None, Some(token)) => CartOwner::Guest(token),
            (None, None) => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "owner_uuid".to_string(),
                    source: "cart has neither an owner nor a guest token".into(),
                });
            }
        };

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            owner,
            expires_at: try_get_timestamp(row, "expires_at")?,
            items: Vec::new(),
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
            deleted_at: try_get_optional_timestamp(row, "deleted_at")?,
        })
    }
}
