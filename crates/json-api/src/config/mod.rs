//! Server configuration module

use clap::Parser;

use emporium_app::{context::AppConfig, database::Timeouts};

use crate::config::{
    checkout::CheckoutConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod checkout;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;

/// Emporium JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "emporium-json", about = "Emporium JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Metrics and request logging settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Cart and order placement settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings for building the application services.
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            max_connections: self.database.max_connections,
            acquire_timeout: self.database.acquire_timeout(),
            timeouts: Timeouts {
                lock: self.database.lock_timeout(),
                statement: self.database.statement_timeout(),
            },
            cart_ttl: self.checkout.cart_ttl(),
            price_drift_tolerance_percent: self.checkout.price_drift_tolerance_percent,
            pricing_config_path: self.checkout.pricing_config_path.clone(),
            ..AppConfig::new(self.database.database_url.clone())
        }
    }
}
