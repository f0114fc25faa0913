//! # Error Types
//!
//! Typed error handling for the study-cart checkout engine.
//! All cart and checkout operations return `Result<T, CartError>`.

use thiserror::Error;

/// Core error type for cart, checkout and order operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Checkout submitted without an email
    #[error("Email is required")]
    MissingEmail,

    /// Email does not look like an address
    #[error("Invalid email: {email}")]
    InvalidEmail { email: String },

    /// Checkout submitted with an empty cart
    #[error("Cart is empty")]
    EmptyCart,

    /// A checkout for this submitter is already running
    #[error("A checkout is already in progress")]
    CheckoutInFlight,

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Price mismatch or invalid amount
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with a remote service
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The payment endpoint answered with an error status
    #[error("Checkout endpoint returned {status}: {message}")]
    EndpointError { status: u16, message: String },

    /// The payment endpoint answered 2xx without a redirect URL
    #[error("Checkout endpoint response has no redirect url")]
    MissingRedirectUrl,

    /// Order persistence failed
    #[error("Database error: {0}")]
    Database(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Webhook endpoint is not configured
    #[error("Webhook handling is disabled: {0}")]
    WebhookDisabled(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CartError {
    /// Returns true if the user may simply try again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CartError::NetworkError(_)
                | CartError::EndpointError { .. }
                | CartError::MissingRedirectUrl
                | CartError::ProviderError { .. }
                | CartError::Database(_)
        )
    }

    /// Returns true for errors caught before any network call
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            CartError::MissingEmail | CartError::InvalidEmail { .. } | CartError::EmptyCart
        )
    }

    /// Short notice suitable for showing inline to the customer
    pub fn notice(&self) -> &'static str {
        match self {
            CartError::MissingEmail => "Please enter your email to continue.",
            CartError::InvalidEmail { .. } => "Please enter a valid email address.",
            CartError::EmptyCart => "Add products to your cart before paying.",
            CartError::CheckoutInFlight => "Your payment is already being processed.",
            _ => "Something went wrong while processing the payment. Please try again.",
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::Configuration(_) => 500,
            CartError::InvalidRequest(_)
            | CartError::MissingEmail
            | CartError::InvalidEmail { .. }
            | CartError::EmptyCart
            | CartError::InvalidPrice { .. } => 400,
            CartError::CheckoutInFlight => 409,
            CartError::ProductNotFound { .. } => 404,
            CartError::ProviderError { .. } | CartError::EndpointError { .. } => 502,
            CartError::MissingRedirectUrl => 502,
            CartError::NetworkError(_) => 503,
            CartError::Database(_) => 500,
            CartError::WebhookVerificationFailed(_) => 401,
            CartError::WebhookParseError(_) => 400,
            CartError::WebhookDisabled(_) => 503,
            CartError::Serialization(_) | CartError::Internal(_) => 500,
        }
    }
}

/// Result type alias for cart and checkout operations
pub type PaymentResult<T> = Result<T, CartError>;
