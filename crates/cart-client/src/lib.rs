//! # cart-client
//!
//! Client side of the study-cart checkout: drives a [`cart_core::CartStore`]
//! against the payment-session endpoint.
//!
//! ```no_run
//! use cart_client::{CheckoutSubmitter, ClientConfig, LoggingOpener};
//! use cart_core::{CartStore, ProductCatalog};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), cart_core::CartError> {
//! let catalog = ProductCatalog::study_blocks();
//! let cart = CartStore::new();
//! if let Some(pack) = catalog.get("pack") {
//!     cart.add_product(pack);
//! }
//!
//! let submitter = CheckoutSubmitter::new(ClientConfig::from_env()?, Arc::new(LoggingOpener))?;
//! match submitter.submit(&cart, "ana@example.com").await {
//!     Ok(url) => println!("redirecting to {url}"),
//!     Err(e) => eprintln!("{}", e.notice()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod opener;
pub mod submitter;

pub use config::{ClientConfig, CREATE_PAYMENT_PATH};
pub use opener::{LoggingOpener, UrlOpener};
pub use submitter::CheckoutSubmitter;
