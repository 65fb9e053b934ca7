use std::str::FromStr;
use std::time::Duration;

use crate::utils::{CircuitBreakerConfig, RetryConfig};

// ============================================================================
// Pipeline Configuration
// ============================================================================
//
// Defaults suit local development. `from_env` overlays ORDERING_* variables.
//
// ============================================================================

pub const DEFAULT_LOG_FILTER: &str = "info,ordering_pipeline=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// How checkout waits for the order-created notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Wait for the attempt, but never longer than `delivery_timeout`
    Bounded,
    /// Spawn the attempt and return immediately
    Detached,
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounded" => Ok(DeliveryMode::Bounded),
            "detached" => Ok(DeliveryMode::Detached),
            other => Err(format!("expected \"bounded\" or \"detached\", got \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub delivery: DeliveryMode,
    /// Upper bound on one transport call
    pub attempt_timeout: Duration,
    /// Upper bound on how long checkout waits in `Bounded` mode
    pub delivery_timeout: Duration,
    /// Fixed recipient; when `None` the order's billing address is used
    pub recipient: Option<String>,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub dead_letter_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryMode::Bounded,
            attempt_timeout: Duration::from_secs(2),
            delivery_timeout: Duration::from_secs(5),
            recipient: None,
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            dead_letter_capacity: 1_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub log_filter: String,
    /// Metrics/health endpoint port; disabled when `None`
    pub metrics_port: Option<u16>,
    pub notification: NotificationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            metrics_port: None,
            notification: NotificationConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from defaults, overriding every key `lookup` returns a value for.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(filter) = lookup("ORDERING_LOG") {
            config.log_filter = filter;
        }
        if let Some(port) = parse(&lookup, "ORDERING_METRICS_PORT")? {
            config.metrics_port = Some(port);
        }

        let notification = &mut config.notification;
        if let Some(mode) = parse(&lookup, "ORDERING_NOTIFY_MODE")? {
            notification.delivery = mode;
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "ORDERING_NOTIFY_TIMEOUT_MS")? {
            notification.delivery_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "ORDERING_NOTIFY_ATTEMPT_TIMEOUT_MS")? {
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    key: "ORDERING_NOTIFY_ATTEMPT_TIMEOUT_MS",
                    value: ms.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            notification.attempt_timeout = Duration::from_millis(ms);
        }
        if let Some(recipient) = lookup("ORDERING_NOTIFY_RECIPIENT") {
            let recipient = recipient.trim().to_string();
            notification.recipient = (!recipient.is_empty()).then_some(recipient);
        }
        if let Some(attempts) = parse::<u32, _>(&lookup, "ORDERING_NOTIFY_MAX_ATTEMPTS")? {
            if attempts == 0 {
                return Err(ConfigError::Invalid {
                    key: "ORDERING_NOTIFY_MAX_ATTEMPTS",
                    value: attempts.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            notification.retry.max_attempts = attempts;
        }

        Ok(config)
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
    }
}
