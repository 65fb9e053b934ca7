use crate::models::OrderId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Order {0} does not exist in storage")]
    MissingRow(OrderId),

    #[error("Order {0} is already persisted")]
    AlreadyPersisted(OrderId),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
