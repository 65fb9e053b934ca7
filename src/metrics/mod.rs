// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

use crate::utils::CircuitState;

pub use server::{start_metrics_server, HealthSources};

// ============================================================================
// Metrics Module - Prometheus metrics for the ordering pipeline
// ============================================================================
//
// - Dispatched requests (throughput, failures by reason, latency)
// - Notification deliveries, transport attempts and dead letters
// - Mail circuit breaker state
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Dispatch
    pub requests_total: IntCounterVec,
    pub request_failures: IntCounterVec,
    pub request_duration: HistogramVec,

    // Notification
    pub notification_deliveries: IntCounterVec,
    pub notification_attempts: IntCounter,
    pub notification_dead_letters: IntCounter,
    pub notification_circuit_state: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("ordering_requests_total", "Total requests dispatched"),
            &["kind"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_failures = IntCounterVec::new(
            Opts::new("ordering_request_failures_total", "Dispatched requests that failed"),
            &["kind", "reason"],
        )?;
        registry.register(Box::new(request_failures.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("ordering_request_duration_seconds", "Handler duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["kind"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let notification_deliveries = IntCounterVec::new(
            Opts::new("notification_deliveries_total", "Best-effort notification outcomes"),
            &["outcome"],
        )?;
        registry.register(Box::new(notification_deliveries.clone()))?;

        let notification_attempts = IntCounter::new(
            "notification_attempts_total",
            "Mail transport calls, including retries",
        )?;
        registry.register(Box::new(notification_attempts.clone()))?;

        let notification_dead_letters = IntCounter::new(
            "notification_dead_letters_total",
            "Notifications recorded as undeliverable",
        )?;
        registry.register(Box::new(notification_dead_letters.clone()))?;

        let notification_circuit_state = IntGauge::new(
            "notification_circuit_state",
            "Mail circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(notification_circuit_state.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_failures,
            request_duration,
            notification_deliveries,
            notification_attempts,
            notification_dead_letters,
            notification_circuit_state,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// `failure` is the error kind when the request failed.
    pub fn record_request(&self, kind: &str, duration_secs: f64, failure: Option<&str>) {
        self.requests_total.with_label_values(&[kind]).inc();
        if let Some(reason) = failure {
            self.request_failures.with_label_values(&[kind, reason]).inc();
        }
        self.request_duration.with_label_values(&[kind]).observe(duration_secs);
    }

    pub fn record_notification(&self, outcome: &str) {
        self.notification_deliveries.with_label_values(&[outcome]).inc();
    }

    pub fn record_notification_attempt(&self) {
        self.notification_attempts.inc();
    }

    pub fn record_dead_letter(&self) {
        self.notification_dead_letters.inc();
    }

    pub fn update_circuit_state(&self, state: CircuitState) {
        self.notification_circuit_state.set(state.as_gauge());
    }
}
