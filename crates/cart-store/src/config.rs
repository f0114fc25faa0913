//! # Supabase Configuration
//!
//! Connection settings for the hosted database, loaded from the environment.

use cart_core::CartError;
use std::env;

const DEFAULT_ORDERS_TABLE: &str = "orders";

/// PostgREST endpoint and service credential
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    pub url: String,

    /// Service-role key; bypasses row-level security, server side only
    pub service_role_key: String,

    /// Table that receives order rows
    pub orders_table: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("orders_table", &self.orders_table)
            .finish_non_exhaustive()
    }
}

impl SupabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_SERVICE_ROLE_KEY`
    ///
    /// Optional:
    /// - `SUPABASE_ORDERS_TABLE` (default `orders`)
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok();

        let url = required("SUPABASE_URL")?;
        let service_role_key = required("SUPABASE_SERVICE_ROLE_KEY")?;

        let mut config = Self::new(url, service_role_key);
        if let Ok(table) = env::var("SUPABASE_ORDERS_TABLE") {
            if !table.is_empty() {
                config.orders_table = table;
            }
        }
        Ok(config)
    }

    pub fn new(url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
            orders_table: DEFAULT_ORDERS_TABLE.to_string(),
        }
    }

    /// `{url}/rest/v1/{orders_table}`
    pub fn orders_endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.orders_table)
    }
}

fn required(name: &str) -> Result<String, CartError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CartError::Configuration(format!("{} is not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_endpoint() {
        let config = SupabaseConfig::new("https://abc.supabase.co/", "service-key");
        assert_eq!(
            config.orders_endpoint(),
            "https://abc.supabase.co/rest/v1/orders"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let config = SupabaseConfig::new("https://abc.supabase.co", "service-key");
        assert!(!format!("{:?}", config).contains("service-key"));
    }
}
