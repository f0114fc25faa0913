//! # Supabase Order Store
//!
//! Writes order rows through Supabase's PostgREST API using the service-role
//! key.

use crate::config::SupabaseConfig;
use async_trait::async_trait;
use cart_core::{CartError, OrderRecord, OrderRepository, OrderStatus, PaymentResult};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, instrument};

/// PostgREST-backed order repository
pub struct SupabaseOrderStore {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseOrderStore {
    pub fn new(config: SupabaseConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| CartError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.service_role_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.service_role_key),
            )
    }

    async fn check(response: Response) -> PaymentResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("PostgREST error: status={}, body={}", status, body);

        let message = serde_json::from_str::<PostgrestError>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));
        Err(CartError::Database(message))
    }
}

#[async_trait]
impl OrderRepository for SupabaseOrderStore {
    #[instrument(skip(self, order), fields(session_id = %order.stripe_session_id))]
    async fn insert_pending(&self, order: &OrderRecord) -> PaymentResult<()> {
        let request = self
            .client
            .post(self.config.orders_endpoint())
            .query(&[("on_conflict", "stripe_session_id")])
            .header("Prefer", "return=minimal,resolution=ignore-duplicates")
            .json(order);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| CartError::Database(format!("Network error: {}", e)))?;

        Self::check(response).await?;
        debug!("Order saved to database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_status(&self, session_id: &str, status: OrderStatus) -> PaymentResult<()> {
        let request = self
            .client
            .patch(self.config.orders_endpoint())
            .query(&[
                ("stripe_session_id", format!("eq.{}", session_id)),
                ("status", format!("eq.{}", OrderStatus::Pending)),
            ])
            .header("Prefer", "return=minimal")
            .json(&json!({ "status": status }));

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| CartError::Database(format!("Network error: {}", e)))?;

        Self::check(response).await
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::CheckoutItem;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn order() -> OrderRecord {
        OrderRecord {
            email: "ana@example.com".into(),
            items: vec![CheckoutItem {
                id: "pack".into(),
                title: "Pack".into(),
                unit_price: 10000,
                quantity: 1,
            }],
            total_amount: 10000,
            stripe_session_id: "cs_test_abc".into(),
            status: OrderStatus::Pending,
        }
    }

    fn store(server: &MockServer) -> SupabaseOrderStore {
        SupabaseOrderStore::new(SupabaseConfig::new(server.uri(), "service-key")).unwrap()
    }

    #[tokio::test]
    async fn test_insert_pending_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/orders"))
            .and(query_param("on_conflict", "stripe_session_id"))
            .and(header("apikey", "service-key"))
            .and(header("Authorization", "Bearer service-key"))
            .and(body_json(serde_json::json!({
                "email": "ana@example.com",
                "items": [{"id": "pack", "title": "Pack", "price": 100, "quantity": 1}],
                "total_amount": 10000,
                "stripe_session_id": "cs_test_abc",
                "status": "pending"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).insert_pending(&order()).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_failure_is_database_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/orders"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "42501",
                "message": "permission denied for table orders"
            })))
            .mount(&server)
            .await;

        let err = store(&server).insert_pending(&order()).await.unwrap_err();
        match err {
            CartError::Database(message) => {
                assert_eq!(message, "permission denied for table orders")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_status_only_touches_pending_rows() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/orders"))
            .and(query_param("stripe_session_id", "eq.cs_test_abc"))
            .and(query_param("status", "eq.pending"))
            .and(body_json(serde_json::json!({"status": "paid"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .update_status("cs_test_abc", OrderStatus::Paid)
            .await
            .unwrap();
    }
}
