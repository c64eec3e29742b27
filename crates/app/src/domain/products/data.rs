//! Products Data

use crate::domain::products::records::{ProductStatus, ProductUuid};

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub title: String,
    pub price: u64,
    pub status: ProductStatus,
}

/// Product Update Data
///
/// `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub price: Option<u64>,
    pub status: Option<ProductStatus>,
}
