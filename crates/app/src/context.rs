//! App Context

use std::{path::PathBuf, sync::Arc, time::Duration};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db, Timeouts},
    domain::{
        carts::{CartsService, DEFAULT_CART_TTL, PgCartsService},
        inventory::{InventoryService, PgInventoryService},
        orders::{
            OrdersService, PgOrdersService,
            drift::{DEFAULT_PRICE_DRIFT_TOLERANCE_PERCENT, PriceDriftPolicy},
        },
        pricing::{PricingConfig, PricingConfigError, RateTablePricing},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to load pricing rate tables")]
    Pricing(#[source] PricingConfigError),
}

/// Everything needed to wire the services together.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub timeouts: Timeouts,
    pub cart_ttl: Duration,
    pub price_drift_tolerance_percent: Decimal,

    /// YAML rate tables. Built-in rates are used when unset.
    pub pricing_config_path: Option<PathBuf>,
}

impl AppConfig {
    /// Defaults for everything except the database URL.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            timeouts: Timeouts::default(),
            cart_ttl: DEFAULT_CART_TTL,
            price_drift_tolerance_percent: DEFAULT_PRICE_DRIFT_TOLERANCE_PERCENT,
            pricing_config_path: None,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub inventory: Arc<dyn InventoryService>,
    pub orders: Arc<dyn OrdersService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Connect to the database and build every service.
    ///
    /// # Errors
    ///
    /// Returns an error when the pricing tables cannot be loaded or the
    /// database connection fails.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let pricing = match &config.pricing_config_path {
            Some(path) => PricingConfig::from_yaml_file(path).map_err(AppInitError::Pricing)?,
            None => PricingConfig::default(),
        };

        let pool = database::connect_with(
            &config.database_url,
            config.max_connections,
            config.acquire_timeout,
        )
        .await
        .map_err(AppInitError::Database)?;

        let db = Db::with_timeouts(pool.clone(), config.timeouts);

        Ok(Self {
            carts: Arc::new(PgCartsService::new(db.clone(), config.cart_ttl)),
            inventory: Arc::new(PgInventoryService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(
                db,
                Arc::new(RateTablePricing::new(pricing)),
                PriceDriftPolicy::new(config.price_drift_tolerance_percent),
            )),
            auth: Arc::new(PgAuthService::new(pool)),
        })
    }
}
