//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables.

use cart_core::{CartError, Currency};
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2023-10-16";

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Webhook signing secret (whsec_...); webhooks are rejected without it
    pub webhook_secret: Option<String>,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,

    /// Currency for every line item
    pub currency: Currency,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("mode", &if self.is_live_mode() { "live" } else { "test" })
            .field("webhooks", &self.webhook_secret.is_some())
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("currency", &self.currency)
            .finish()
    }
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY` (or `SECRET_KEY`)
    ///
    /// Optional:
    /// - `STRIPE_WEBHOOK_SECRET`
    /// - `CHECKOUT_CURRENCY` (default `eur`)
    /// - `STRIPE_API_BASE_URL`
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = env::var("STRIPE_SECRET_KEY")
            .or_else(|_| env::var("SECRET_KEY"))
            .map_err(|_| CartError::Configuration("STRIPE_SECRET_KEY is not set".to_string()))?;

        let webhook_secret = env::var("STRIPE_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let currency = match env::var("CHECKOUT_CURRENCY") {
            Ok(code) => Currency::parse(&code).ok_or_else(|| {
                CartError::Configuration(format!("Unsupported CHECKOUT_CURRENCY: {}", code))
            })?,
            Err(_) => Currency::EUR,
        };

        let mut config = Self::new(secret_key).with_currency(currency);
        config.webhook_secret = webhook_secret;
        if let Ok(url) = env::var("STRIPE_API_BASE_URL") {
            config = config.with_api_base_url(url);
        }

        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            webhook_secret: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            currency: Currency::EUR,
        }
    }

    /// Check key formats and the checkout currency.
    ///
    /// Wire prices carry two decimals, so only two-decimal currencies are
    /// accepted.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.currency.decimal_places() != 2 {
            return Err(CartError::Configuration(format!(
                "CHECKOUT_CURRENCY {} has {} decimal places; only two-decimal currencies are supported",
                self.currency,
                self.currency.decimal_places()
            )));
        }

        if !self.secret_key.starts_with("sk_test_") && !self.secret_key.starts_with("sk_live_") {
            return Err(CartError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if let Some(secret) = &self.webhook_secret {
            if !secret.starts_with("whsec_") {
                return Err(CartError::Configuration(
                    "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set webhook signing secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Builder: set checkout currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}
