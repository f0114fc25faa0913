//! # Checkout Submitter
//!
//! Sends a cart to the payment-session endpoint and hands the returned
//! hosted-checkout URL to a [`UrlOpener`]. The cart is cleared only after the
//! endpoint answers with a URL.

use crate::config::ClientConfig;
use crate::opener::UrlOpener;
use cart_core::{
    new_idempotency_key, validate_email, CartError, CartStore, CheckoutRequest,
    PaymentResult, PaymentSessionResponse,
};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const CLIENT_INFO: &str = concat!("study-cart-client/", env!("CARGO_PKG_VERSION"));

/// One-shot checkout against the payment-session endpoint
pub struct CheckoutSubmitter {
    config: ClientConfig,
    client: Client,
    opener: Arc<dyn UrlOpener>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the submission ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> PaymentResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| CartError::CheckoutInFlight)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CheckoutSubmitter {
    pub fn new(config: ClientConfig, opener: Arc<dyn UrlOpener>) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CartError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            opener,
            in_flight: AtomicBool::new(false),
        })
    }

    /// True while a submission is waiting on the endpoint
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit the cart. Returns the hosted checkout URL.
    ///
    /// Email and cart are checked before any network call. On failure the
    /// cart is left as it was.
    #[instrument(skip(self, cart, email), fields(items = cart.total_items()))]
    pub async fn submit(&self, cart: &CartStore, email: &str) -> PaymentResult<String> {
        validate_email(email)?;
        if cart.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let _guard = InFlight::acquire(&self.in_flight)?;

        let request = cart
            .checkout_request(email.trim())
            .with_idempotency_key(new_idempotency_key());

        info!(
            "Submitting checkout: {} items, total={}",
            request.item_count(),
            request.total_amount
        );

        let url = self.request_session(&request).await.map_err(|e| {
            warn!("Checkout failed: {}", e);
            e
        })?;

        cart.clear();
        self.opener.open(&url);
        Ok(url)
    }

    async fn request_session(&self, request: &CheckoutRequest) -> PaymentResult<String> {
        let mut builder = self
            .client
            .post(&self.config.endpoint)
            .header("x-client-info", CLIENT_INFO)
            .json(request);

        if let Some(key) = &self.config.anon_key {
            builder = builder.header("apikey", key).bearer_auth(key);
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

        debug!("Payment endpoint answered {}", status);

        if !status.is_success() {
            let message = serde_json::from_str::<PaymentSessionResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(body);
            return Err(CartError::EndpointError {
                status: status.as_u16(),
                message,
            });
        }

        let session: PaymentSessionResponse = serde_json::from_str(&body)
            .map_err(|e| CartError::Serialization(format!("Invalid endpoint response: {}", e)))?;

        session
            .url
            .filter(|url| !url.is_empty())
            .ok_or(CartError::MissingRedirectUrl)
    }
}
