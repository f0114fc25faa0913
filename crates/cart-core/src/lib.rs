//! # cart-core
//!
//! Core types and traits for the study-cart checkout engine.
//!
//! This crate provides:
//! - `Cart` and `CartStore` for the customer's in-memory cart
//! - `Product` and `ProductCatalog` for the study-note bundles
//! - `CheckoutRequest` and `PaymentSessionResponse`, the payment endpoint's wire types
//! - `OrderRecord` and `CheckoutSession` for the checkout flow
//! - `PaymentStrategy` and `OrderRepository` traits for the external services
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{CartStore, ProductCatalog};
//!
//! let catalog = ProductCatalog::study_blocks();
//! let store = CartStore::new();
//!
//! store.add_product(catalog.get("1").unwrap());
//! store.add_product(catalog.get("pack").unwrap());
//!
//! assert_eq!(store.total_price().display(), "€120.00");
//! let request = store.checkout_request("ana@example.com");
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod order;
pub mod repository;
pub mod store;
pub mod strategy;

// Re-exports for convenience
pub use cart::{Cart, CartItem};
pub use catalog::{Product, ProductCatalog, SAMPLE_VIEWER_FLAGS};
pub use checkout::{
    is_plausible_email, new_idempotency_key, validate_email, CheckoutItem, CheckoutRequest,
    CheckoutUrls, PaymentSessionResponse,
};
pub use error::{CartError, PaymentResult};
pub use money::{Currency, Price};
pub use order::{CheckoutSession, OrderRecord, OrderStatus, WebhookEvent, WebhookEventType};
pub use repository::{BoxedOrderRepository, OrderRepository};
pub use store::CartStore;
pub use strategy::{BoxedPaymentStrategy, PaymentStrategy};
