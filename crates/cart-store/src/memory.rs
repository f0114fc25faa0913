//! In-memory order repository for development and tests.

use async_trait::async_trait;
use cart_core::{OrderRecord, OrderRepository, OrderStatus, PaymentResult};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Orders keyed by session id, with the same duplicate and finality rules as
/// the hosted table
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, OrderRecord>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str) -> Option<OrderRecord> {
        self.orders.read().await.get(session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderStore {
    async fn insert_pending(&self, order: &OrderRecord) -> PaymentResult<()> {
        self.orders
            .write()
            .await
            .entry(order.stripe_session_id.clone())
            .or_insert_with(|| order.clone());
        Ok(())
    }

    async fn update_status(&self, session_id: &str, status: OrderStatus) -> PaymentResult<()> {
        if let Some(order) = self.orders.write().await.get_mut(session_id) {
            if !order.status.is_final() {
                order.status = status;
            }
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
