//! Checkout Config

use std::{path::PathBuf, time::Duration};

use clap::Args;
use rust_decimal::Decimal;

const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Cart lifetime, price drift and rate table settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Hours a cart stays usable after creation.
    #[arg(long, env = "CART_TTL_HOURS", default_value_t = 168)]
    pub cart_ttl_hours: u64,

    /// Largest price change, in percent, accepted between add-to-cart and order.
    #[arg(long, env = "PRICE_DRIFT_TOLERANCE_PERCENT", default_value = "5")]
    pub price_drift_tolerance_percent: Decimal,

    /// YAML file with tax and shipping rate tables.
    #[arg(long, env = "PRICING_CONFIG_PATH")]
    pub pricing_config_path: Option<PathBuf>,
}

impl CheckoutConfig {
    pub(crate) fn cart_ttl(&self) -> Duration {
        Duration::from_secs(self.cart_ttl_hours.saturating_mul(SECONDS_PER_HOUR))
    }
}
