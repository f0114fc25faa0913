//! # Order Repository Trait
//!
//! Persistence seam for order rows. The production implementation writes to
//! the hosted database; tests use an in-memory store.

use crate::error::PaymentResult;
use crate::order::{OrderRecord, OrderStatus};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Write a pending order. Inserting a second row for the same
    /// `stripe_session_id` is ignored rather than duplicated.
    async fn insert_pending(&self, order: &OrderRecord) -> PaymentResult<()>;

    /// Move the order for a session to a new status.
    async fn update_status(&self, session_id: &str, status: OrderStatus) -> PaymentResult<()>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

pub type BoxedOrderRepository = Arc<dyn OrderRepository>;
