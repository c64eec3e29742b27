//! Product Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Catalog lifecycle of a product. Only [`ProductStatus::Active`] products can
/// be added to carts or ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductStatus {
    Draft,
    Active,
    Sold,
    Cancelled,
}

impl ProductStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Sold => "sold",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_sellable(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown product status: {0}")]
pub struct UnknownProductStatus(pub String);

impl FromStr for ProductStatus {
    type Err = UnknownProductStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "sold" => Ok(Self::Sold),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownProductStatus(other.to_string())),
        }
    }
}

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub title: String,
    pub price: u64,
    pub status: ProductStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn only_active_products_are_sellable() {
        assert!(ProductStatus::Active.is_sellable());
        assert!(!ProductStatus::Draft.is_sellable());
        assert!(!ProductStatus::Sold.is_sellable());
        assert!(!ProductStatus::Cancelled.is_sellable());
    }

    #[test]
    fn status_parses_its_own_rendering() -> TestResult {
        for status in [
            ProductStatus::Draft,
            ProductStatus::Active,
            ProductStatus::Sold,
            ProductStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ProductStatus>()?, status);
        }

        assert!("archived".parse::<ProductStatus>().is_err());

        Ok(())
    }
}
