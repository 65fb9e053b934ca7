// ============================================================================
// Order Repository - Sole writer of durable order state
// ============================================================================
//
// Handlers only ever talk to storage through the OrderRepository port.
// The in-memory adapter backs the demo binary and the tests.
//
// ============================================================================

mod error;
mod in_memory;

pub use error::RepositoryError;
pub use in_memory::InMemoryOrderRepository;

use async_trait::async_trait;

use crate::models::{Order, OrderId};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Persist a new order and return it with its assigned id.
    async fn add(&self, order: Order) -> Result<Order, RepositoryError>;

    async fn update(&self, order: Order) -> Result<(), RepositoryError>;

    async fn delete(&self, order: Order) -> Result<(), RepositoryError>;

    /// Exact match on user name, in storage order.
    async fn list_by_user_name(&self, user_name: &str) -> Result<Vec<Order>, RepositoryError>;
}
