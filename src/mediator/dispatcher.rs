use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::domain::order::OrderingError;
use crate::metrics::Metrics;

use super::cancellation::CancellationSignal;
use super::request::{Request, RequestHandler, RequestKind};

// ============================================================================
// Dispatcher - Routes a typed request to its single registered handler
// ============================================================================
//
// Registration happens once, through DispatcherBuilder, at startup. The
// built Dispatcher is immutable and shared (Arc) across all in-flight
// requests. It adds logging, timing and metrics around the handler call
// and forwards the handler's outcome unchanged.
//
// ============================================================================

/// Holds an `Arc<dyn RequestHandler<R>>` for the `R` matching its key.
type ErasedHandler = Box<dyn Any + Send + Sync>;

pub struct DispatcherBuilder {
    handlers: HashMap<RequestKind, ErasedHandler>,
    metrics: Option<Arc<Metrics>>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            metrics: None,
        }
    }

    /// Register the handler for request type `R`.
    ///
    /// # Panics
    /// If a handler for `R` is already registered.
    pub fn register<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        if self.handlers.insert(R::KIND, Box::new(handler)).is_some() {
            panic!("a handler for {} is already registered", R::KIND);
        }
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Dispatcher {
        let mut kinds: Vec<&'static str> = self.handlers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        tracing::info!(handlers = ?kinds, "Dispatcher configured");

        Dispatcher {
            handlers: self.handlers,
            metrics: self.metrics,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Dispatcher {
    handlers: HashMap<RequestKind, ErasedHandler>,
    metrics: Option<Arc<Metrics>>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn is_registered(&self, kind: RequestKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Send a request that cannot be cancelled.
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response, OrderingError> {
        let never = CancellationSignal::never();
        self.send_with(request, &never).await
    }

    /// Send a request to its handler.
    ///
    /// # Panics
    /// If no handler is registered for `R`. That is a wiring bug, not a
    /// runtime condition.
    pub async fn send_with<R: Request>(
        &self,
        request: R,
        cancel: &CancellationSignal,
    ) -> Result<R::Response, OrderingError> {
        let handler = self.resolve::<R>();
        let correlation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dispatch",
            kind = %R::KIND,
            correlation_id = %correlation_id,
        );

        let started = Instant::now();
        let result = async {
            tracing::debug!("Dispatching request");
            cancel.ensure_active()?;
            handler.handle(request, cancel).await
        }
        .instrument(span.clone())
        .await;
        let elapsed = started.elapsed();

        span.in_scope(|| match &result {
            Ok(_) => tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Request handled"),
            Err(e) => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                reason = e.kind(),
                error = %e,
                "Request failed"
            ),
        });

        if let Some(metrics) = &self.metrics {
            let failure = result.as_ref().err().map(OrderingError::kind);
            metrics.record_request(R::KIND.as_str(), elapsed.as_secs_f64(), failure);
        }

        result
    }

    fn resolve<R: Request>(&self) -> Arc<dyn RequestHandler<R>> {
        let handler = self
            .handlers
            .get(&R::KIND)
            .and_then(|erased| erased.downcast_ref::<Arc<dyn RequestHandler<R>>>());

        match handler {
            Some(handler) => handler.clone(),
            None => panic!("no handler registered for {}", R::KIND),
        }
    }
}
