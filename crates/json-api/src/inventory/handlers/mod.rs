//! Inventory Handlers

pub(crate) mod adjust;
pub(crate) mod adjustments;
pub(crate) mod get;
