//! # Stripe Webhook Handling
//!
//! Turns verified checkout-session events into order status changes.

use cart_core::{OrderRepository, OrderStatus, PaymentResult, WebhookEvent, WebhookEventType};
use tracing::{debug, info, warn};

/// Events that should be enabled in the Stripe Dashboard for this endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "checkout.session.async_payment_succeeded",
    "checkout.session.async_payment_failed",
    "checkout.session.expired",
];

/// Dashboard setup hint for a service reachable at `base_url`
pub fn webhook_setup_instructions(base_url: &str) -> String {
    format!(
        "Stripe webhook endpoint: {}/webhook/stripe (events: {})",
        base_url.trim_end_matches('/'),
        REQUIRED_WEBHOOK_EVENTS.join(", ")
    )
}

/// Status an order should move to for this event, if any.
///
/// A completed session whose payment is still processing (delayed methods
/// such as SEPA debit) stays pending until the async outcome arrives.
pub fn order_status_for(event: &WebhookEvent) -> Option<OrderStatus> {
    match &event.event_type {
        WebhookEventType::CheckoutCompleted if event.is_paid() => Some(OrderStatus::Paid),
        WebhookEventType::CheckoutCompleted => None,
        WebhookEventType::AsyncPaymentSucceeded => Some(OrderStatus::Paid),
        WebhookEventType::AsyncPaymentFailed => Some(OrderStatus::Failed),
        WebhookEventType::CheckoutExpired => Some(OrderStatus::Expired),
        WebhookEventType::Unknown(_) => None,
    }
}

/// Apply a verified event to the order store. Returns the status written.
pub async fn apply_webhook_event(
    orders: &dyn OrderRepository,
    event: &WebhookEvent,
) -> PaymentResult<Option<OrderStatus>> {
    let Some(status) = order_status_for(event) else {
        debug!("Ignoring webhook event: {:?}", event.event_type);
        return Ok(None);
    };

    let Some(session_id) = event.session_id.as_deref() else {
        warn!("Webhook {} has no session id", event.event_id);
        return Ok(None);
    };

    orders.update_status(session_id, status).await?;
    info!(
        "Order for session {} is now {} (event {})",
        session_id, status, event.event_id
    );
    Ok(Some(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cart_core::OrderRecord;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRepo {
        updates: Mutex<Vec<(String, OrderStatus)>>,
    }

    #[async_trait]
    impl OrderRepository for RecordingRepo {
        async fn insert_pending(&self, _order: &OrderRecord) -> PaymentResult<()> {
            Ok(())
        }

        async fn update_status(&self, session_id: &str, status: OrderStatus) -> PaymentResult<()> {
            self.updates
                .lock()
                .unwrap()
                .push((session_id.to_string(), status));
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "recording"
        }
    }

    fn event(event_type: WebhookEventType, payment_status: Option<&str>) -> WebhookEvent {
        WebhookEvent {
            event_id: "evt_test".to_string(),
            event_type,
            provider: "stripe".to_string(),
            session_id: Some("cs_test_123".to_string()),
            customer_email: Some("ana@example.com".to_string()),
            amount_total: Some(12000),
            payment_status: payment_status.map(String::from),
            raw_data: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_setup_instructions_list_every_event() {
        let text = webhook_setup_instructions("https://notes.example.es/");
        assert!(text.contains("https://notes.example.es/webhook/stripe"));
        for event in REQUIRED_WEBHOOK_EVENTS {
            assert!(text.contains(event), "{text}");
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            order_status_for(&event(WebhookEventType::CheckoutCompleted, Some("paid"))),
            Some(OrderStatus::Paid)
        );
        assert_eq!(
            order_status_for(&event(WebhookEventType::CheckoutCompleted, Some("unpaid"))),
            None
        );
        assert_eq!(
            order_status_for(&event(WebhookEventType::AsyncPaymentFailed, None)),
            Some(OrderStatus::Failed)
        );
        assert_eq!(
            order_status_for(&event(WebhookEventType::CheckoutExpired, None)),
            Some(OrderStatus::Expired)
        );
        assert_eq!(
            order_status_for(&event(WebhookEventType::Unknown("x".into()), None)),
            None
        );
    }

    #[tokio::test]
    async fn test_apply_paid_event() {
        let repo = RecordingRepo::default();
        let status = apply_webhook_event(
            &repo,
            &event(WebhookEventType::CheckoutCompleted, Some("paid")),
        )
        .await
        .unwrap();

        assert_eq!(status, Some(OrderStatus::Paid));
        assert_eq!(
            *repo.updates.lock().unwrap(),
            vec![("cs_test_123".to_string(), OrderStatus::Paid)]
        );
    }

    #[tokio::test]
    async fn test_ignored_event_touches_nothing() {
        let repo = RecordingRepo::default();
        let mut unknown = event(WebhookEventType::Unknown("charge.refunded".into()), None);
        assert_eq!(apply_webhook_event(&repo, &unknown).await.unwrap(), None);

        unknown.event_type = WebhookEventType::CheckoutExpired;
        unknown.session_id = None;
        assert_eq!(apply_webhook_event(&repo, &unknown).await.unwrap(), None);
        assert!(repo.updates.lock().unwrap().is_empty());
    }
}
