//! Client configuration.

use cart_core::CartError;
use std::time::Duration;

/// Path of the payment-session function under a Supabase project URL
pub const CREATE_PAYMENT_PATH: &str = "/functions/v1/create-payment";

/// Where and how the submitter reaches the payment-session endpoint
#[derive(Clone)]
pub struct ClientConfig {
    /// Full URL of the payment-session endpoint
    pub endpoint: String,
    /// Public anon key, sent as `apikey` and bearer token when present
    pub anon_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            anon_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Endpoint under a Supabase-style project URL
    pub fn for_project(project_url: &str) -> Self {
        Self::new(format!(
            "{}{}",
            project_url.trim_end_matches('/'),
            CREATE_PAYMENT_PATH
        ))
    }

    /// Load from environment variables.
    ///
    /// `CHECKOUT_ENDPOINT` wins over `SUPABASE_URL`; `SUPABASE_ANON_KEY` is
    /// optional.
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok();

        let config = match std::env::var("CHECKOUT_ENDPOINT") {
            Ok(endpoint) => Self::new(endpoint),
            Err(_) => {
                let project = std::env::var("SUPABASE_URL").map_err(|_| {
                    CartError::Configuration(
                        "CHECKOUT_ENDPOINT or SUPABASE_URL must be set".to_string(),
                    )
                })?;
                Self::for_project(&project)
            }
        };

        Ok(match std::env::var("SUPABASE_ANON_KEY") {
            Ok(key) if !key.is_empty() => config.with_anon_key(key),
            _ => config,
        })
    }

    /// Builder: set anon key
    pub fn with_anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(key.into());
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
