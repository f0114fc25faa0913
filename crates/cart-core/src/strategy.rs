//! # Payment Strategy Trait
//!
//! Seam between the checkout endpoint and the hosted payment processor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_checkout()                                      │
//! │  ├── expire_checkout()                                      │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┴─────────────────┐
//!  ┌───────┴───────┐                   ┌───────┴───────┐
//!  │StripeCheckout │                   │  test doubles │
//!  │   Strategy    │                   │               │
//!  └───────────────┘                   └───────────────┘
//! ```

use crate::checkout::{CheckoutRequest, CheckoutUrls};
use crate::error::PaymentResult;
use crate::order::{CheckoutSession, WebhookEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a hosted checkout session and return its redirect URL.
    ///
    /// # Arguments
    /// * `request` - Validated checkout request (email, items, total)
    /// * `urls` - Where the provider sends the customer afterwards
    ///
    /// The request's idempotency key, when present, must be forwarded so a
    /// retried request resolves to the same session.
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
        urls: &CheckoutUrls,
    ) -> PaymentResult<CheckoutSession>;

    /// Expire an open session so it can no longer be paid.
    async fn expire_checkout(&self, session_id: &str) -> PaymentResult<()>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> PaymentResult<WebhookEvent>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;
