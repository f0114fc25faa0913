//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /functions/v1/create-payment - Create a hosted payment session
/// - GET  /api/v1/products - List products
/// - GET  /api/v1/products/{id} - Get product by ID
/// - GET  /api/v1/products/{id}/sample - Sample PDF preview URL
/// - POST /webhook/stripe - Stripe webhook handler
/// - GET  /health, / - Health check
pub fn create_router(state: AppState) -> Router {
    // Browser clients call from any origin with Supabase-style auth headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    let function_routes =
        Router::new().route("/create-payment", post(handlers::create_payment));

    let api_routes = Router::new()
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product))
        .route(
            "/products/{product_id}/sample",
            get(handlers::get_product_sample),
        );

    // Raw body is needed for signature verification
    let webhook_routes = Router::new().route("/stripe", post(handlers::stripe_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/functions/v1", function_routes)
        .nest("/api/v1", api_routes)
        .nest("/webhook", webhook_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
