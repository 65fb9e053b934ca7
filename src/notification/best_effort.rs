use std::sync::Arc;

use crate::config::{DeliveryMode, NotificationConfig};
use crate::health::{ComponentHealth, HealthCheckable, HealthStatus};
use crate::metrics::Metrics;
use crate::models::{Order, OrderId};
use crate::utils::{retry_on_transient, CircuitBreaker, CircuitBreakerError, CircuitState, RetryOutcome};

use super::dead_letter::FailedNotificationLog;
use super::email::{Email, EmailService, NotificationError};

// ============================================================================
// Best-Effort Notifier
// ============================================================================
//
// Each send runs as its own task:
//   retry(transient) -> circuit breaker -> per-attempt timeout -> transport
//
// A send that still fails is logged and parked in the dead letter log. The
// caller only ever sees `()`; in Bounded mode it waits at most
// `delivery_timeout`, in Detached mode it does not wait at all.
//
// ============================================================================

pub const ORDER_CREATED_SUBJECT: &str = "Order was created";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Delivered { attempts: u32 },
    Failed { error: NotificationError, attempts: u32 },
}

#[derive(Clone)]
pub struct BestEffortNotifier {
    transport: Arc<dyn EmailService>,
    breaker: CircuitBreaker,
    dead_letters: Arc<FailedNotificationLog>,
    metrics: Option<Arc<Metrics>>,
    config: Arc<NotificationConfig>,
}

impl BestEffortNotifier {
    pub fn new(transport: Arc<dyn EmailService>, config: NotificationConfig) -> Self {
        Self {
            transport,
            breaker: CircuitBreaker::new(config.circuit_breaker.clone()),
            dead_letters: Arc::new(FailedNotificationLog::new(config.dead_letter_capacity)),
            metrics: None,
            config: Arc::new(config),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        metrics.update_circuit_state(self.breaker.state());
        self.metrics = Some(metrics);
        self
    }

    pub fn dead_letters(&self) -> &FailedNotificationLog {
        &self.dead_letters
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// The message sent when an order has been checked out.
    pub fn order_created_email(&self, order: &Order) -> Email {
        let to = self
            .config
            .recipient
            .clone()
            .unwrap_or_else(|| order.email_address.clone());

        Email {
            to,
            subject: ORDER_CREATED_SUBJECT.to_string(),
            body: format!("Order {} was created.", order.id),
        }
    }

    /// Hand `email` off for delivery. Never fails and never blocks the
    /// caller past `delivery_timeout`.
    pub async fn send_best_effort(&self, order_id: OrderId, email: Email) {
        let notifier = self.clone();
        let handle = tokio::spawn(async move { notifier.deliver(order_id, email).await });

        match self.config.delivery {
            DeliveryMode::Detached => {
                tracing::debug!(order_id, "Notification detached");
            }
            DeliveryMode::Bounded => {
                match tokio::time::timeout(self.config.delivery_timeout, handle).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(join_error)) => {
                        tracing::error!(order_id, error = %join_error, "Notification task aborted");
                    }
                    Err(_) => {
                        tracing::warn!(
                            order_id,
                            timeout_ms = self.config.delivery_timeout.as_millis() as u64,
                            "Notification still in flight, continuing without it"
                        );
                    }
                }
            }
        }
    }

    /// Run the full delivery pipeline for one message and report how it went.
    pub async fn deliver(&self, order_id: OrderId, email: Email) -> NotificationOutcome {
        let outcome = retry_on_transient(&self.config.retry, |attempt| {
            let email = &email;
            async move {
                tracing::debug!(order_id, attempt, to = %email.to, "Sending notification");
                if let Some(metrics) = &self.metrics {
                    metrics.record_notification_attempt();
                }
                self.attempt(email).await
            }
        })
        .await;

        if let Some(metrics) = &self.metrics {
            metrics.update_circuit_state(self.breaker.state());
        }

        match outcome {
            RetryOutcome::Succeeded { attempts, .. } => {
                tracing::info!(order_id, attempts, "Notification delivered");
                if let Some(metrics) = &self.metrics {
                    metrics.record_notification("delivered");
                }
                NotificationOutcome::Delivered { attempts }
            }
            RetryOutcome::Exhausted { error, attempts }
            | RetryOutcome::Permanent { error, attempts } => {
                tracing::error!(
                    order_id,
                    attempts,
                    error = %error,
                    "Order {} failed due to an error with the mail service",
                    order_id
                );
                self.dead_letters.record(order_id, &email, &error, attempts).await;
                if let Some(metrics) = &self.metrics {
                    metrics.record_notification("failed");
                    metrics.record_dead_letter();
                }
                NotificationOutcome::Failed { error, attempts }
            }
        }
    }

    async fn attempt(&self, email: &Email) -> Result<(), NotificationError> {
        let attempt_timeout = self.config.attempt_timeout;
        let send = async {
            match tokio::time::timeout(attempt_timeout, self.transport.send_email(email)).await {
                Ok(result) => result,
                Err(_) => Err(NotificationError::TimedOut(attempt_timeout)),
            }
        };

        match self.breaker.call(send).await {
            Ok(()) => Ok(()),
            Err(CircuitBreakerError::CircuitOpen) => Err(NotificationError::CircuitOpen),
            Err(CircuitBreakerError::OperationFailed(error)) => Err(error),
        }
    }
}

impl HealthCheckable for BestEffortNotifier {
    /// Mail is a side effect of checkout, so the worst this reports is
    /// `Degraded`.
    fn check_health(&self) -> ComponentHealth {
        let state = self.breaker.observed_state();
        let status = match state {
            CircuitState::Closed => HealthStatus::Healthy,
            CircuitState::HalfOpen => {
                HealthStatus::Degraded("mail transport recovering".to_string())
            }
            CircuitState::Open => HealthStatus::Degraded(format!(
                "mail transport failing ({} consecutive failures)",
                self.breaker.failure_count()
            )),
        };

        ComponentHealth::new(self.component_name(), status)
            .with_details(format!("circuit {}", state.as_str()))
    }

    fn component_name(&self) -> &str {
        "notification"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        sample_order, FailingEmailService, FlakyEmailService, RecordingEmailService,
        SlowEmailService,
    };
    use crate::utils::{CircuitBreakerConfig, RetryConfig};
    use std::time::{Duration, Instant};

    fn fast_config() -> NotificationConfig {
        NotificationConfig {
            attempt_timeout: Duration::from_millis(100),
            delivery_timeout: Duration::from_millis(500),
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                multiplier: 2.0,
            },
            ..NotificationConfig::default()
        }
    }

    fn email_to(to: &str) -> Email {
        Email {
            to: to.to_string(),
            subject: ORDER_CREATED_SUBJECT.to_string(),
            body: "Order 1 was created.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_order_created_email_uses_billing_address() {
        let notifier =
            BestEffortNotifier::new(Arc::new(RecordingEmailService::default()), fast_config());
        let order = sample_order(12, "swn");

        let email = notifier.order_created_email(&order);

        assert_eq!(email.to, order.email_address);
        assert_eq!(email.subject, "Order was created");
        assert!(email.body.contains("12"));
    }

    #[tokio::test]
    async fn test_configured_recipient_overrides_billing_address() {
        let config = NotificationConfig {
            recipient: Some("orders@example.com".to_string()),
            ..fast_config()
        };
        let notifier = BestEffortNotifier::new(Arc::new(RecordingEmailService::default()), config);

        let email = notifier.order_created_email(&sample_order(1, "swn"));
        assert_eq!(email.to, "orders@example.com");
    }

    #[tokio::test]
    async fn test_delivers_through_transport() {
        let transport = Arc::new(RecordingEmailService::default());
        let notifier = BestEffortNotifier::new(transport.clone(), fast_config());

        notifier.send_best_effort(1, email_to("a@b.com")).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.com");
        assert_eq!(notifier.dead_letters().stats().await.total_recorded, 0);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let transport = Arc::new(FlakyEmailService::new(2));
        let notifier = BestEffortNotifier::new(transport.clone(), fast_config());

        let outcome = notifier.deliver(1, email_to("a@b.com")).await;

        assert_eq!(outcome, NotificationOutcome::Delivered { attempts: 3 });
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_dead_lettered_without_retry() {
        let transport = Arc::new(FailingEmailService::new(NotificationError::Rejected(
            "mailbox full".into(),
        )));
        let notifier = BestEffortNotifier::new(transport.clone(), fast_config());

        notifier.send_best_effort(7, email_to("a@b.com")).await;

        assert_eq!(transport.calls(), 1);
        let recent = notifier.dead_letters().recent(10).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].order_id, 7);
        assert_eq!(recent[0].error_kind, "rejected");
        assert_eq!(recent[0].attempts, 1);
    }

    #[tokio::test]
    async fn test_slow_transport_times_out_each_attempt() {
        let config = NotificationConfig {
            attempt_timeout: Duration::from_millis(20),
            retry: RetryConfig::once(),
            ..fast_config()
        };
        let notifier = BestEffortNotifier::new(
            Arc::new(SlowEmailService::new(Duration::from_secs(5))),
            config,
        );

        let outcome = notifier.deliver(3, email_to("a@b.com")).await;

        assert_eq!(
            outcome,
            NotificationOutcome::Failed {
                error: NotificationError::TimedOut(Duration::from_millis(20)),
                attempts: 1,
            }
        );
        assert_eq!(notifier.dead_letters().stats().await.by_error_kind.get("timed_out"), Some(&1));
    }

    #[tokio::test]
    async fn test_bounded_mode_caps_caller_wait() {
        let config = NotificationConfig {
            attempt_timeout: Duration::from_secs(10),
            delivery_timeout: Duration::from_millis(50),
            ..fast_config()
        };
        let notifier = BestEffortNotifier::new(
            Arc::new(SlowEmailService::new(Duration::from_secs(5))),
            config,
        );

        let started = Instant::now();
        notifier.send_best_effort(1, email_to("a@b.com")).await;

        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_detached_mode_returns_before_delivery() {
        let config = NotificationConfig {
            delivery: DeliveryMode::Detached,
            ..fast_config()
        };
        let transport = Arc::new(SlowEmailService::new(Duration::from_millis(50)));
        let notifier = BestEffortNotifier::new(transport.clone(), config);

        notifier.send_best_effort(1, email_to("a@b.com")).await;
        assert_eq!(transport.delivered(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(transport.delivered(), 1);
    }

    #[tokio::test]
    async fn test_open_circuit_skips_transport_and_reports_degraded() {
        let config = NotificationConfig {
            retry: RetryConfig::once(),
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 2,
                open_duration: Duration::from_secs(60),
                success_threshold: 1,
            },
            ..fast_config()
        };
        let transport = Arc::new(FailingEmailService::new(NotificationError::Unavailable(
            "relay down".into(),
        )));
        let notifier = BestEffortNotifier::new(transport.clone(), config);

        assert!(notifier.check_health().status.is_healthy());

        notifier.deliver(1, email_to("a@b.com")).await;
        notifier.deliver(2, email_to("a@b.com")).await;
        let outcome = notifier.deliver(3, email_to("a@b.com")).await;

        assert_eq!(
            outcome,
            NotificationOutcome::Failed {
                error: NotificationError::CircuitOpen,
                attempts: 1,
            }
        );
        assert_eq!(transport.calls(), 2);
        assert_eq!(notifier.circuit_state(), CircuitState::Open);
        let health = notifier.check_health();
        assert!(health.status.is_degraded());
        assert!(!crate::health::aggregate(&[health]).is_unhealthy());
        assert_eq!(notifier.dead_letters().stats().await.total_recorded, 3);
    }

    #[tokio::test]
    async fn test_health_recovers_once_open_duration_elapses() {
        let config = NotificationConfig {
            retry: RetryConfig::once(),
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 1,
                open_duration: Duration::from_millis(10),
                success_threshold: 1,
            },
            ..fast_config()
        };
        let notifier = BestEffortNotifier::new(
            Arc::new(FailingEmailService::new(NotificationError::Unavailable(
                "relay down".into(),
            ))),
            config,
        );

        notifier.deliver(1, email_to("a@b.com")).await;
        assert_eq!(notifier.circuit_state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(100)).await;

        let health = notifier.check_health();
        assert_eq!(
            health.status,
            HealthStatus::Degraded("mail transport recovering".to_string())
        );
        assert_eq!(health.details.as_deref(), Some("circuit half_open"));
        assert_eq!(notifier.circuit_state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_records_notification_metrics() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let notifier = BestEffortNotifier::new(Arc::new(FlakyEmailService::new(1)), fast_config())
            .with_metrics(metrics.clone());

        notifier.deliver(1, email_to("a@b.com")).await;

        assert_eq!(metrics.notification_attempts.get(), 2);
        assert_eq!(
            metrics
                .notification_deliveries
                .with_label_values(&["delivered"])
                .get(),
            1
        );
        assert_eq!(metrics.notification_dead_letters.get(), 0);
    }
}
