//! Order storage
//!
//! Orders carry a `version` that the store checks on every update, so two
//! writers racing on the same order cannot silently overwrite each other.

use crate::error::{Result, SdkError};
use async_trait::async_trait;
use shield_core::Order;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persistence for orders
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Store a new order; fails if the id is taken
    async fn insert(&self, order: Order) -> Result<()>;

    async fn get(&self, order_id: &str) -> Result<Option<Order>>;

    /// Replace the stored order if its version still matches, bumping
    /// `order.version` on success
    async fn update(&self, order: &mut Order) -> Result<()>;

    async fn list(&self) -> Result<Vec<Order>>;
}

/// In-memory order store
///
/// Suitable for a single process; everything is lost on restart.
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.order_id) {
            return Err(SdkError::Conflict(format!(
                "order {} already exists",
                order.order_id
            )));
        }
        orders.insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn update(&self, order: &mut Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.order_id)
            .ok_or_else(|| SdkError::OrderNotFound(order.order_id.clone()))?;

        if stored.version != order.version {
            return Err(SdkError::Conflict(format!(
                "order {} was modified concurrently (expected version {}, found {})",
                order.order_id, order.version, stored.version
            )));
        }

        order.version += 1;
        *stored = order.clone();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }
}
