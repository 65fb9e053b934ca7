use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::IsTransient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("Mail transport rejected the message: {0}")]
    Rejected(String),

    #[error("Mail transport unavailable: {0}")]
    Unavailable(String),

    #[error("Mail send timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Mail circuit breaker is open")]
    CircuitOpen,
}

impl NotificationError {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationError::Rejected(_) => "rejected",
            NotificationError::Unavailable(_) => "unavailable",
            NotificationError::TimedOut(_) => "timed_out",
            NotificationError::CircuitOpen => "circuit_open",
        }
    }
}

impl IsTransient for NotificationError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            NotificationError::Unavailable(_) | NotificationError::TimedOut(_)
        )
    }
}

/// Outbound mail transport.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_email(&self, email: &Email) -> Result<(), NotificationError>;
}

/// Transport that only writes the message to the log. Used when no real
/// mail relay is wired in.
#[derive(Debug, Default, Clone)]
pub struct LoggingEmailService;

#[async_trait]
impl EmailService for LoggingEmailService {
    async fn send_email(&self, email: &Email) -> Result<(), NotificationError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "Email sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(NotificationError::Unavailable("relay busy".into()).is_transient());
        assert!(NotificationError::TimedOut(Duration::from_secs(1)).is_transient());
        assert!(!NotificationError::Rejected("bad address".into()).is_transient());
        assert!(!NotificationError::CircuitOpen.is_transient());
    }

    #[tokio::test]
    async fn test_logging_transport_always_succeeds() {
        let email = Email {
            to: "ops@example.com".into(),
            subject: "Order was created".into(),
            body: "Order 1 was created.".into(),
        };
        assert!(LoggingEmailService.send_email(&email).await.is_ok());
    }
}
