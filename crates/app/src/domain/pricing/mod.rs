//! Pricing

pub mod config;
mod engine;

pub use config::{PricingConfig, PricingConfigError, ShippingRule};
pub use engine::*;
