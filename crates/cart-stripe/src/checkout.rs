//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API.
//! Every cart becomes a one-off `payment` mode session with inline prices.

use crate::config::StripeConfig;
use crate::signature::verify_signature;
use async_trait::async_trait;
use cart_core::{
    CartError, CheckoutRequest, CheckoutSession, CheckoutUrls, PaymentResult, PaymentStrategy,
    WebhookEvent, WebhookEventType,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

const PROVIDER: &str = "stripe";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page; card data never touches this service.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CartError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Build the form body for `POST /v1/checkout/sessions`
    fn session_form(&self, request: &CheckoutRequest, urls: &CheckoutUrls) -> Vec<(String, String)> {
        let currency = self.config.currency.as_str();

        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), urls.success_url.clone()),
            ("cancel_url".to_string(), urls.cancel_url.clone()),
            ("customer_email".to_string(), request.email.trim().to_string()),
        ];

        for (i, item) in request.items.iter().enumerate() {
            form_params.push((
                format!("line_items[{}][price_data][currency]", i),
                currency.to_string(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                item.unit_price.to_string(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.title.clone(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][product_data][metadata][product_id]", i),
                item.id.clone(),
            ));
            form_params.push((
                format!("line_items[{}][quantity]", i),
                item.quantity.to_string(),
            ));
        }

        form_params.push(("metadata[total_amount]".to_string(), request.total_amount.to_string()));
        form_params
    }

    /// POST a form to Stripe and return the body of a 2xx response
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> PaymentResult<String> {
        let mut builder = self
            .client
            .post(url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(form);

        if let Some(key) = idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(CartError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(CartError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, request, urls), fields(items = request.items.len(), total = request.total_amount))]
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
        urls: &CheckoutUrls,
    ) -> PaymentResult<CheckoutSession> {
        if request.items.is_empty() {
            return Err(CartError::InvalidRequest("Order has no items".to_string()));
        }

        let form = self.session_form(request, urls);
        debug!("Creating Stripe checkout session: {} items", request.items.len());

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let body = self
            .post_form(&url, &form, request.idempotency_key.as_deref())
            .await?;

        let session: StripeCheckoutSessionResponse = serde_json::from_str(&body).map_err(|e| {
            CartError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        let checkout_url = session.url.ok_or_else(|| CartError::ProviderError {
            provider: PROVIDER.to_string(),
            message: format!("Session {} has no url", session.id),
        })?;

        info!("Created Stripe checkout session: id={}", session.id);

        Ok(CheckoutSession {
            session_id: session.id,
            provider: PROVIDER.to_string(),
            checkout_url,
            expires_at: session
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self))]
    async fn expire_checkout(&self, session_id: &str) -> PaymentResult<()> {
        let url = format!(
            "{}/v1/checkout/sessions/{}/expire",
            self.config.api_base_url, session_id
        );
        self.post_form(&url, &[], None).await?;
        warn!("Expired Stripe checkout session: id={}", session_id);
        Ok(())
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent> {
        let secret = self.config.webhook_secret.as_deref().ok_or_else(|| {
            CartError::WebhookDisabled("STRIPE_WEBHOOK_SECRET is not set".to_string())
        })?;

        verify_signature(payload, signature, secret, Utc::now().timestamp())?;
        parse_webhook_event(payload)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Parse a verified webhook payload into a provider-neutral event
pub fn parse_webhook_event(payload: &[u8]) -> PaymentResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| CartError::WebhookParseError(format!("Failed to parse webhook: {}", e)))?;

    debug!("Verified Stripe webhook: type={}", event.event_type);

    let event_type = match event.event_type.as_str() {
        "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
        "checkout.session.async_payment_succeeded" => WebhookEventType::AsyncPaymentSucceeded,
        "checkout.session.async_payment_failed" => WebhookEventType::AsyncPaymentFailed,
        "checkout.session.expired" => WebhookEventType::CheckoutExpired,
        other => WebhookEventType::Unknown(other.to_string()),
    };

    let object = &event.data.object;
    let str_field = |key: &str| object.get(key).and_then(|v| v.as_str()).map(String::from);

    let customer_email = object
        .get("customer_details")
        .and_then(|cd| cd.get("email"))
        .and_then(|v| v.as_str())
        .map(String::from)
        .or_else(|| str_field("customer_email"));

    Ok(WebhookEvent {
        event_id: event.id,
        event_type,
        provider: PROVIDER.to_string(),
        session_id: str_field("id"),
        customer_email,
        amount_total: object.get("amount_total").and_then(|v| v.as_i64()),
        payment_status: str_field("payment_status"),
        raw_data: Some(serde_json::Value::Object(event.data.object.clone())),
        timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    })
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::CheckoutItem;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            email: "ana@example.com".into(),
            items: vec![
                CheckoutItem {
                    id: "1".into(),
                    title: "Block 1".into(),
                    unit_price: 2000,
                    quantity: 1,
                },
                CheckoutItem {
                    id: "pack".into(),
                    title: "Pack".into(),
                    unit_price: 10000,
                    quantity: 1,
                },
            ],
            total_amount: 12000,
            idempotency_key: Some("idem-123".into()),
        }
    }

    fn strategy(server: &MockServer) -> StripeCheckoutStrategy {
        let config = StripeConfig::new("sk_test_abc").with_api_base_url(server.uri());
        StripeCheckoutStrategy::new(config).unwrap()
    }

    #[test]
    fn test_session_form() {
        let strategy =
            StripeCheckoutStrategy::new(StripeConfig::new("sk_test_abc")).unwrap();
        let urls = CheckoutUrls::from_origin("https://shop.example");
        let form = strategy.session_form(&request(), &urls);

        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("success_url"), Some("https://shop.example/success"));
        assert_eq!(get("cancel_url"), Some("https://shop.example/checkout"));
        assert_eq!(get("customer_email"), Some("ana@example.com"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("eur"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("2000"));
        assert_eq!(get("line_items[1][price_data][unit_amount]"), Some("10000"));
        assert_eq!(get("line_items[1][price_data][product_data][name]"), Some("Pack"));
        assert_eq!(get("line_items[1][quantity]"), Some("1"));
    }

    #[tokio::test]
    async fn test_create_checkout_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc"))
            .and(header("Idempotency-Key", "idem-123"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains("customer_email=ana%40example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_abc",
                "url": "https://checkout.stripe.com/c/pay/cs_test_abc",
                "expires_at": 1_900_000_000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let urls = CheckoutUrls::from_origin("https://shop.example");
        let session = strategy(&server)
            .create_checkout(&request(), &urls)
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_abc");
        assert_eq!(session.checkout_url, "https://checkout.stripe.com/c/pay/cs_test_abc");
        assert_eq!(session.provider, "stripe");
        assert!(session.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_stripe_error_maps_to_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "Invalid email address", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let urls = CheckoutUrls::from_origin("https://shop.example");
        let err = strategy(&server)
            .create_checkout(&request(), &urls)
            .await
            .unwrap_err();

        match err {
            CartError::ProviderError { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Invalid email address");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_without_url_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cs_test_nourl"})))
            .mount(&server)
            .await;

        let urls = CheckoutUrls::from_origin("https://shop.example");
        let err = strategy(&server)
            .create_checkout(&request(), &urls)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProviderError { .. }));
    }

    #[tokio::test]
    async fn test_empty_request_never_reaches_stripe() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let urls = CheckoutUrls::from_origin("https://shop.example");
        let empty = CheckoutRequest {
            items: vec![],
            ..request()
        };
        let err = strategy(&server)
            .create_checkout(&empty, &urls)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_expire_checkout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions/cs_test_abc/expire"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_abc",
                "status": "expired"
            })))
            .expect(1)
            .mount(&server)
            .await;

        strategy(&server).expire_checkout("cs_test_abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_webhook_disabled_without_secret() {
        let strategy =
            StripeCheckoutStrategy::new(StripeConfig::new("sk_test_abc")).unwrap();
        let err = strategy.verify_webhook(b"{}", "t=1,v1=abc").await.unwrap_err();
        assert!(matches!(err, CartError::WebhookDisabled(_)));
    }

    #[test]
    fn test_parse_webhook_event() {
        let payload = json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": {"object": {
                "id": "cs_test_abc",
                "amount_total": 12000,
                "payment_status": "paid",
                "customer_details": {"email": "ana@example.com"}
            }}
        });

        let event = parse_webhook_event(payload.to_string().as_bytes()).unwrap();
        assert_eq!(event.event_type, WebhookEventType::CheckoutCompleted);
        assert_eq!(event.session_id.as_deref(), Some("cs_test_abc"));
        assert_eq!(event.customer_email.as_deref(), Some("ana@example.com"));
        assert_eq!(event.amount_total, Some(12000));
        assert!(event.is_paid());

        let other = json!({
            "id": "evt_2", "type": "charge.refunded", "created": 1_700_000_000,
            "data": {"object": {"id": "ch_1"}}
        });
        let event = parse_webhook_event(other.to_string().as_bytes()).unwrap();
        assert_eq!(
            event.event_type,
            WebhookEventType::Unknown("charge.refunded".to_string())
        );
    }
}
