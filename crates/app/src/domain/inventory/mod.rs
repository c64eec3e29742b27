//! Inventory

pub mod data;
pub mod errors;
pub(crate) mod ledger;
pub mod records;
pub mod service;

pub use errors::InventoryServiceError;
pub use service::*;
