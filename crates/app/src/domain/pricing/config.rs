//! Pricing rate tables.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating rate tables.
#[derive(Debug, Error)]
pub enum PricingConfigError {
    #[error("failed to read rate table file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rate table YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("tax rate for {country} must be between 0 and 1, got {rate}")]
    TaxRateOutOfRange { country: String, rate: Decimal },

    #[error("shipping rule for {country} sets only one of bulk_threshold and bulk")]
    IncompleteBulkRule { country: String },
}

/// Flat shipping fee with an optional bulk fee charged above an item threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ShippingRule {
    /// Fee in minor units.
    pub base: u64,

    /// Item count above which `bulk` applies instead of `base`.
    #[serde(default)]
    pub bulk_threshold: Option<u32>,

    #[serde(default)]
    pub bulk: Option<u64>,
}

impl ShippingRule {
    #[must_use]
    pub const fn flat(base: u64) -> Self {
        Self {
            base,
            bulk_threshold: None,
            bulk: None,
        }
    }

    #[must_use]
    pub const fn with_bulk(base: u64, bulk_threshold: u32, bulk: u64) -> Self {
        Self {
            base,
            bulk_threshold: Some(bulk_threshold),
            bulk: Some(bulk),
        }
    }

    /// Fee for a shipment of `item_count` units.
    #[must_use]
    pub fn fee(&self, item_count: u32) -> u64 {
        match (self.bulk_threshold, self.bulk) {
            (Some(threshold), Some(bulk)) if item_count > threshold => bulk,
            _ => self.base,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxTable {
    pub default_rate: Decimal,

    /// Rates keyed by ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub rates: FxHashMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShippingTable {
    pub default: ShippingRule,

    #[serde(default)]
    pub countries: FxHashMap<String, ShippingRule>,
}

/// Tax and shipping tables used by [`super::RateTablePricing`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PricingConfig {
    pub tax: TaxTable,
    pub shipping: ShippingTable,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let rates = [
            ("US", Decimal::new(8, 2)),
            ("GB", Decimal::new(20, 2)),
            ("DE", Decimal::new(19, 2)),
            ("FR", Decimal::new(20, 2)),
        ]
        .into_iter()
        .map(|(country, rate)| (country.to_string(), rate))
        .collect();

        let countries = [
            ("US", ShippingRule::with_bulk(5_99, 5, 12_99)),
            ("CA", ShippingRule::flat(15_99)),
        ]
        .into_iter()
        .map(|(country, rule)| (country.to_string(), rule))
        .collect();

        Self {
            tax: TaxTable {
                default_rate: Decimal::new(10, 2),
                rates,
            },
            shipping: ShippingTable {
                default: ShippingRule::with_bulk(25_99, 3, 45_99),
                countries,
            },
        }
    }
}

impl PricingConfig {
    /// Load rate tables from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a rate
    /// falls outside `0..=1`.
    pub fn from_yaml_file(path: &Path) -> Result<Self, PricingConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Parse rate tables from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a rule is invalid.
    pub fn from_yaml_str(contents: &str) -> Result<Self, PricingConfigError> {
        let mut config: Self = serde_norway::from_str(contents)?;

        config.normalize();
        config.validate()?;

        Ok(config)
    }

    fn normalize(&mut self) {
        self.tax.rates = self
            .tax
            .rates
            .drain()
            .map(|(country, rate)| (country.to_ascii_uppercase(), rate))
            .collect();

        self.shipping.countries = self
            .shipping
            .countries
            .drain()
            .map(|(country, rule)| (country.to_ascii_uppercase(), rule))
            .collect();
    }

    fn validate(&self) -> Result<(), PricingConfigError> {
        let tax_rates = std::iter::once(("default", &self.tax.default_rate))
            .chain(self.tax.rates.iter().map(|(k, v)| (k.as_str(), v)));

        for (country, rate) in tax_rates {
            if *rate < Decimal::ZERO || *rate > Decimal::ONE {
                return Err(PricingConfigError::TaxRateOutOfRange {
                    country: country.to_string(),
                    rate: *rate,
                });
            }
        }

        let shipping_rules = std::iter::once(("default", &self.shipping.default))
            .chain(self.shipping.countries.iter().map(|(k, v)| (k.as_str(), v)));

        for (country, rule) in shipping_rules {
            if rule.bulk_threshold.is_some() != rule.bulk.is_some() {
                return Err(PricingConfigError::IncompleteBulkRule {
                    country: country.to_string(),
                });
            }
        }

        Ok(())
    }
}
