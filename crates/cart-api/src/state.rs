//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the payment strategy, the order repository, the catalog and config.

use cart_core::{BoxedOrderRepository, BoxedPaymentStrategy, CheckoutUrls, ProductCatalog};
use cart_store::SupabaseOrderStore;
use cart_stripe::{webhook_setup_instructions, StripeCheckoutStrategy};
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public site URL, used when a request carries no `Origin`
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Product catalog file
    pub catalog_path: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let var = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };

        Self {
            host: var("HOST", "127.0.0.1"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: var("BASE_URL", "http://localhost:8080"),
            environment: var("ENVIRONMENT", "development"),
            catalog_path: var("CATALOG_PATH", "config/products.toml"),
            json_logs: var("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            environment: "development".to_string(),
            catalog_path: "config/products.toml".to_string(),
            json_logs: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Hosted payment processor
    pub strategy: BoxedPaymentStrategy,
    /// Order rows
    pub orders: BoxedOrderRepository,
    /// Product catalog
    pub catalog: Arc<ProductCatalog>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        strategy: BoxedPaymentStrategy,
        orders: BoxedOrderRepository,
        catalog: ProductCatalog,
    ) -> Self {
        Self {
            strategy,
            orders,
            catalog: Arc::new(catalog),
            config,
        }
    }

    /// Build state for `config`, reading provider credentials from the
    /// environment. Fails fast when the Stripe key or the Supabase
    /// credentials are missing.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let catalog = load_product_catalog(&config.catalog_path)?;

        let stripe = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        if stripe.config().webhook_secret.is_some() {
            info!("{}", webhook_setup_instructions(&config.base_url));
        } else {
            warn!("STRIPE_WEBHOOK_SECRET is not set; /webhook/stripe answers 503");
        }

        let orders = SupabaseOrderStore::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Supabase: {}", e))?;

        Ok(Self::new(config, Arc::new(stripe), Arc::new(orders), catalog))
    }

    /// Redirect targets for a checkout started from `origin`
    pub fn checkout_urls(&self, origin: Option<&str>) -> CheckoutUrls {
        let origin = origin
            .map(str::trim)
            .filter(|o| !o.is_empty() && *o != "null")
            .unwrap_or(self.config.base_url.as_str());
        CheckoutUrls::from_origin(origin)
    }
}

/// Load product catalog from a TOML file, falling back to the built-in blocks
fn load_product_catalog(path: &str) -> anyhow::Result<ProductCatalog> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let catalog = ProductCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            info!("Loaded {} products from {}", catalog.len(), path);
            Ok(catalog)
        }
        Err(e) => {
            warn!("No product catalog at {} ({}), using built-in study blocks", path, e);
            Ok(ProductCatalog::study_blocks())
        }
    }
}
