use crate::repository::RepositoryError;

use super::validation::ValidationFailure;

// ============================================================================
// Ordering Failures
// ============================================================================
//
// Validation and not-found are decided by the handler before any write.
// Repository failures pass through unchanged. Notification failures never
// show up here; they are swallowed by the best-effort notifier.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderingError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("Entity \"{entity}\" ({key}) was not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("Request was cancelled")]
    Cancelled,
}

impl OrderingError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        OrderingError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Stable label for metrics and boundary layers.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderingError::Validation(_) => "validation",
            OrderingError::NotFound { .. } => "not_found",
            OrderingError::Persistence(_) => "persistence",
            OrderingError::Cancelled => "cancelled",
        }
    }
}
