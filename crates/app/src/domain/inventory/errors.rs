//! Inventory errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::products::records::ProductUuid;

#[derive(Debug, Error)]
pub enum InventoryServiceError {
    #[error("inventory record not found")]
    NotFound,

    #[error("inventory record already exists")]
    AlreadyExists,

    #[error("product does not exist")]
    InvalidReference,

    #[error("insufficient stock for product {product}: requested {requested}")]
    InsufficientStock {
        product: ProductUuid,
        requested: u32,
    },

    #[error(
        "adjusting product {product} by {delta} would leave {quantity} on hand with {reserved} reserved"
    )]
    AdjustmentBelowReserved {
        product: ProductUuid,
        delta: i64,
        quantity: u64,
        reserved: u64,
    },

    #[error("invalid stock adjustment: {0}")]
    InvalidAdjustment(&'static str),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for InventoryServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
