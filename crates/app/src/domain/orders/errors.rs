//! Order errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{
    carts::CartsServiceError,
    inventory::InventoryServiceError,
    orders::{
        address::AddressError,
        status::{InvalidTransition, OrderStatus},
    },
    products::records::ProductUuid,
};

/// `SQLSTATE` codes for failures that succeed when the unit of work is retried.
const RETRYABLE_SQLSTATES: [&str; 4] = [
    // serialization_failure
    "40001",
    // deadlock_detected
    "40P01",
    // lock_not_available
    "55P03",
    // query_canceled, raised by statement_timeout
    "57014",
];

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("invalid order: {0}")]
    Validation(String),

    #[error("order not found")]
    NotFound,

    #[error("order already exists")]
    AlreadyExists,

    #[error("cart is empty")]
    EmptyCart,

    #[error("product {product} is not available")]
    ProductUnavailable { product: ProductUuid },

    #[error("price of product {product} changed from {expected} to {actual}")]
    PriceChanged {
        product: ProductUuid,
        expected: u64,
        actual: u64,
    },

    #[error("insufficient stock for product {product}: requested {requested}")]
    InsufficientStock {
        product: ProductUuid,
        requested: u32,
    },

    #[error("cannot move an order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("storage error")]
    Sql(#[source] Error),
}

impl OrdersServiceError {
    /// Whether the failure was transient and the whole operation may be
    /// attempted again. Business failures never are.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        let Self::Sql(error) = self else {
            return false;
        };

        match error {
            Error::PoolTimedOut | Error::Io(_) => true,
            Error::Database(db) => db.code().is_some_and(|code| {
                RETRYABLE_SQLSTATES
                    .iter()
                    .any(|retryable| code == *retryable)
            }),
            _ => false,
        }
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::CheckViolation) => {
                Self::Validation("order amounts are inconsistent".to_string())
            }
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<InvalidTransition> for OrdersServiceError {
    fn from(InvalidTransition { from, to }: InvalidTransition) -> Self {
        Self::InvalidTransition { from, to }
    }
}

impl From<AddressError> for OrdersServiceError {
    fn from(error: AddressError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<CartsServiceError> for OrdersServiceError {
    fn from(error: CartsServiceError) -> Self {
        match error {
            CartsServiceError::NotFound => Self::NotFound,
            CartsServiceError::ProductUnavailable { product } => {
                Self::ProductUnavailable { product }
            }
            CartsServiceError::Sql(error) => Self::Sql(error),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<InventoryServiceError> for OrdersServiceError {
    fn from(error: InventoryServiceError) -> Self {
        match error {
            InventoryServiceError::InsufficientStock { product, requested } => {
                Self::InsufficientStock { product, requested }
            }
            InventoryServiceError::NotFound => Self::NotFound,
            InventoryServiceError::Sql(error) => Self::Sql(error),
            other => Self::Validation(other.to_string()),
        }
    }
}
