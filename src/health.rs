use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// Components with an external dependency report their health here; the
// metrics server exposes the collected reports on /health.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, HealthStatus::Degraded(_))
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub trait HealthCheckable: Send + Sync {
    fn check_health(&self) -> ComponentHealth;

    fn component_name(&self) -> &str;
}

/// Overall status: the worst status among `components`.
pub fn aggregate(components: &[ComponentHealth]) -> HealthStatus {
    if let Some(bad) = components.iter().find(|c| c.status.is_unhealthy()) {
        return HealthStatus::Unhealthy(format!("{} is unhealthy", bad.name));
    }
    if let Some(degraded) = components.iter().find(|c| c.status.is_degraded()) {
        return HealthStatus::Degraded(format!("{} is degraded", degraded.name));
    }
    HealthStatus::Healthy
}
