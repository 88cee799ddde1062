//! In-process order store.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{OrderStore, StoreError};
use crate::order::{Order, OrderStatus};

/// Orders kept in a map guarded by a single async lock.
///
/// The compare and the write of [`OrderStore::update_status`] happen under one
/// write guard, which makes them atomic within this process.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `orders`.
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders
            .into_iter()
            .map(|o| (o.order_id.clone(), o))
            .collect();
        Self {
            orders: RwLock::new(orders),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn find_by_external_id(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        expected_current: Option<OrderStatus>,
    ) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;

        if let Some(expected) = expected_current {
            if order.status != expected {
                return Err(StoreError::Conflict {
                    current: order.clone(),
                });
            }
        }

        order.status = new_status;
        order.version += 1;
        order.updated_at = OffsetDateTime::now_utc();
        Ok(order.clone())
    }

    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.order_id) {
            return Err(StoreError::Duplicate(order.order_id));
        }
        orders.insert(order.order_id.clone(), order.clone());
        Ok(order)
    }
}
