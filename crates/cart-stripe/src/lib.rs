//! # cart-stripe
//!
//! Stripe payment strategy for study-cart.
//!
//! `StripeCheckoutStrategy` creates one-off Checkout Sessions with inline
//! prices, forwards the caller's idempotency key, can expire a session that
//! could not be recorded, and verifies `Stripe-Signature` webhooks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_stripe::StripeCheckoutStrategy;
//! use cart_core::{CheckoutUrls, PaymentStrategy};
//!
//! let strategy = StripeCheckoutStrategy::from_env()?;
//! let urls = CheckoutUrls::from_origin("https://notes.example.es");
//! let session = strategy.create_checkout(&request, &urls).await?;
//!
//! // Redirect the customer to session.checkout_url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! let event = strategy.verify_webhook(payload, signature).await?;
//! cart_stripe::apply_webhook_event(orders.as_ref(), &event).await?;
//! ```

pub mod checkout;
pub mod config;
pub mod signature;
pub mod webhook;

// Re-exports
pub use checkout::{parse_webhook_event, StripeCheckoutStrategy};
pub use config::StripeConfig;
pub use signature::{compute_signature, verify_signature};
pub use webhook::{
    apply_webhook_event, order_status_for, webhook_setup_instructions, REQUIRED_WEBHOOK_EVENTS,
};
