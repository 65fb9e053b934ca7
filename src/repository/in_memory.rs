use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{Order, OrderId};

use super::{OrderRepository, RepositoryError};

// ============================================================================
// In-Memory Order Repository
// ============================================================================
//
// Ids come from a monotonically increasing counter, so iterating the
// BTreeMap yields insertion order. Audit stamps are applied here, never by
// handlers.
//
// ============================================================================

pub struct InMemoryOrderRepository {
    orders: RwLock<BTreeMap<OrderId, Order>>,
    next_id: AtomicI32,
    writes: AtomicUsize,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of committed add/update/delete operations.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn add(&self, mut order: Order) -> Result<Order, RepositoryError> {
        if order.is_persisted() {
            return Err(RepositoryError::AlreadyPersisted(order.id));
        }

        let now = Utc::now();
        order.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        order.created_at = Some(now);
        order.last_modified_at = Some(now);

        self.orders.write().await.insert(order.id, order.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(order_id = order.id, "Inserted order");
        Ok(order)
    }

    async fn update(&self, mut order: Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.id)
            .ok_or(RepositoryError::MissingRow(order.id))?;

        order.created_at = stored.created_at;
        order.last_modified_at = Some(Utc::now());
        *stored = order;
        self.writes.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(order_id = stored.id, "Updated order");
        Ok(())
    }

    async fn delete(&self, order: Order) -> Result<(), RepositoryError> {
        let removed = self.orders.write().await.remove(&order.id);
        if removed.is_none() {
            return Err(RepositoryError::MissingRow(order.id));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(order_id = order.id, "Deleted order");
        Ok(())
    }

    async fn list_by_user_name(&self, user_name: &str) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|order| order.user_name == user_name)
            .cloned()
            .collect())
    }
}
