//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//! The payment-session endpoint answers `{url}` or a 500 `{error}`; the
//! catalog and webhook endpoints use regular status codes.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cart_core::{CartError, CheckoutRequest, OrderRecord, PaymentSessionResponse};
use cart_stripe::apply_webhook_event;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Sample preview for a product
#[derive(Debug, Serialize)]
pub struct SampleResponse {
    pub title: String,
    pub url: String,
}

fn cart_error_to_response(err: CartError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Every payment-session failure is a 500 with `{error}`
fn payment_failure(err: &CartError) -> Response {
    let message = match err {
        CartError::InvalidRequest(message) => message.clone(),
        other => other.to_string(),
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(PaymentSessionResponse::failure(message)),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "study-cart",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted payment session for the submitted cart
#[instrument(skip_all)]
pub async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected payment request body: {}", rejection.body_text());
            return payment_failure(&CartError::InvalidRequest(rejection.body_text()));
        }
    };

    match create_payment_session(&state, &headers, &request).await {
        Ok(url) => Json(PaymentSessionResponse::redirect(url)).into_response(),
        Err(e) => {
            error!("Payment session failed: {}", e);
            payment_failure(&e)
        }
    }
}

async fn create_payment_session(
    state: &AppState,
    headers: &HeaderMap,
    request: &CheckoutRequest,
) -> Result<String, CartError> {
    request.validate()?;

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());
    let urls = state.checkout_urls(origin);

    info!(
        "Creating payment session: {} items, total={}, success_url={}",
        request.item_count(),
        request.total_amount,
        urls.success_url
    );

    let session = state.strategy.create_checkout(request, &urls).await?;

    let order = OrderRecord::pending(request, &session.session_id);
    if let Err(e) = state.orders.insert_pending(&order).await {
        error!(
            "Order write failed for session {}, expiring it: {}",
            session.session_id, e
        );
        if let Err(expire_err) = state.strategy.expire_checkout(&session.session_id).await {
            error!(
                "Failed to expire session {}: {}",
                session.session_id, expire_err
            );
        }
        return Err(e);
    }

    info!(
        "Order saved: session={}, backend={}",
        session.session_id,
        state.orders.backend_name()
    );
    Ok(session.checkout_url)
}

/// Handle Stripe webhook
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            cart_error_to_response(CartError::WebhookVerificationFailed(
                "Missing Stripe-Signature header".to_string(),
            ))
        })?;

    let event = state
        .strategy
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            error!("Webhook verification failed: {}", e);
            cart_error_to_response(e)
        })?;

    info!(
        "Received webhook: type={:?}, id={}",
        event.event_type, event.event_id
    );

    apply_webhook_event(state.orders.as_ref(), &event)
        .await
        .map_err(|e| {
            error!("Webhook handler error: {}", e);
            cart_error_to_response(e)
        })?;

    Ok(StatusCode::OK)
}

/// Get products list
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let products: Vec<_> = state.catalog.active_products().collect();
    Json(serde_json::json!({
        "products": products,
        "count": products.len()
    }))
}

/// Get a single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    state
        .catalog
        .get(&product_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| cart_error_to_response(CartError::ProductNotFound { product_id }))
}

/// Sample PDF for a product, with the viewer chrome hidden
pub async fn get_product_sample(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<SampleResponse>, (StatusCode, Json<ErrorResponse>)> {
    let product = state
        .catalog
        .get(&product_id)
        .ok_or_else(|| cart_error_to_response(CartError::ProductNotFound {
            product_id: product_id.clone(),
        }))?;

    let url = product.sample_preview_url().ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("No sample for product: {}", product_id),
                404,
            )),
        )
    })?;

    Ok(Json(SampleResponse {
        title: product.title.clone(),
        url,
    }))
}
