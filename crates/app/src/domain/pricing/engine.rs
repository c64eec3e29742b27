//! Tax and shipping computation.

use std::fmt::Debug;

use mockall::automock;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::domain::pricing::config::PricingConfig;

/// Computes the tax and shipping legs of an order total.
///
/// Implementations are pure: the same inputs always produce the same amounts.
#[automock]
pub trait PricingEngine: Debug + Send + Sync {
    /// Tax owed on `subtotal` (minor units) for a shipment to `country`.
    fn compute_tax(&self, subtotal: u64, country: &str) -> u64;

    /// Shipping fee for `item_count` units sent to `country`.
    fn compute_shipping(&self, country: &str, item_count: u32) -> u64;
}

/// [`PricingEngine`] backed by per-country rate tables.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTablePricing {
    config: PricingConfig,
}

impl RateTablePricing {
    #[must_use]
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    fn tax_rate(&self, country: &str) -> Decimal {
        self.config
            .tax
            .rates
            .get(&country.to_ascii_uppercase())
            .copied()
            .unwrap_or(self.config.tax.default_rate)
    }
}

impl Default for RateTablePricing {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

impl PricingEngine for RateTablePricing {
    fn compute_tax(&self, subtotal: u64, country: &str) -> u64 {
        apply_rate(self.tax_rate(country), subtotal)
    }

    fn compute_shipping(&self, country: &str, item_count: u32) -> u64 {
        self.config
            .shipping
            .countries
            .get(&country.to_ascii_uppercase())
            .unwrap_or(&self.config.shipping.default)
            .fee(item_count)
    }
}

/// Multiply minor units by a rate, rounding half away from zero.
///
/// Rates are validated to `0..=1` on load, so the result never exceeds `minor`.
fn apply_rate(rate: Decimal, minor: u64) -> u64 {
    Decimal::from(minor)
        .checked_mul(rate)
        .map(|applied| applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_u64())
        .unwrap_or(minor)
}
