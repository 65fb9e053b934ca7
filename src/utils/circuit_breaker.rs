use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Tracks consecutive failures of a downstream call and short-circuits it
// while the downstream looks unhealthy.
//
// States:
// - Closed: calls pass through
// - Open: calls rejected until `open_duration` has elapsed
// - HalfOpen: calls pass through on probation; one failure reopens
//
// The lock is never held across an await.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }

    /// Gauge encoding: 0 = closed, 1 = open, 2 = half-open.
    pub fn as_gauge(&self) -> i64 {
        match self {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// How long to reject calls before probing again
    pub open_duration: Duration,
    /// Successes in half-open needed to close
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
}

#[derive(Clone)]
pub struct CircuitBreaker {
    inner: Arc<Mutex<BreakerState>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                half_open_successes: 0,
                opened_at: None,
            })),
            config,
        }
    }

    /// Run `operation` if the circuit admits it.
    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        if !self.admit() {
            return Err(CircuitBreakerError::CircuitOpen);
        }

        match operation.await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                self.record_failure();
                Err(CircuitBreakerError::OperationFailed(error))
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// State as the next call would see it. An open circuit whose
    /// `open_duration` has elapsed reads as half-open; nothing is changed.
    pub fn observed_state(&self) -> CircuitState {
        let guard = self.lock();
        match guard.state {
            CircuitState::Open if self.cooled_down(&guard) => CircuitState::HalfOpen,
            state => state,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // Counters stay usable after a poisoned lock
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn admit(&self) -> bool {
        let mut guard = self.lock();
        match guard.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                if self.cooled_down(&guard) {
                    tracing::info!("Circuit breaker half-open, probing downstream");
                    guard.state = CircuitState::HalfOpen;
                    guard.half_open_successes = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn cooled_down(&self, state: &BreakerState) -> bool {
        state
            .opened_at
            .map_or(true, |at| at.elapsed() >= self.config.open_duration)
    }

    fn record_success(&self) {
        let mut guard = self.lock();
        guard.consecutive_failures = 0;

        if guard.state == CircuitState::HalfOpen {
            guard.half_open_successes += 1;
            if guard.half_open_successes >= self.config.success_threshold {
                tracing::info!(
                    successes = guard.half_open_successes,
                    "Circuit breaker closed"
                );
                guard.state = CircuitState::Closed;
                guard.half_open_successes = 0;
                guard.opened_at = None;
            }
        }
    }

    fn record_failure(&self) {
        let mut guard = self.lock();
        guard.consecutive_failures += 1;

        let should_open = match guard.state {
            CircuitState::Closed => guard.consecutive_failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };

        if should_open {
            tracing::warn!(
                failures = guard.consecutive_failures,
                from = guard.state.as_str(),
                "Circuit breaker opened"
            );
            guard.state = CircuitState::Open;
            guard.half_open_successes = 0;
            guard.opened_at = Some(Instant::now());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    #[error("Circuit breaker is open")]
    CircuitOpen,

    #[error("Operation failed: {0}")]
    OperationFailed(E),
}
