use std::future::Future;

use tokio::sync::watch;

use crate::domain::order::OrderingError;

// ============================================================================
// Cooperative Cancellation
// ============================================================================
//
// The caller keeps the source; handlers receive the signal. Handlers check
// it before committing a write and race reads against it.
//
// ============================================================================

/// Create a connected source/signal pair.
pub fn cancellation() -> (CancellationSource, CancellationSignal) {
    let (tx, rx) = watch::channel(false);
    (
        CancellationSource { tx },
        CancellationSignal { rx: Some(rx) },
    )
}

#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl CancellationSource {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            rx: Some(self.tx.subscribe()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CancellationSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancellationSignal {
    /// A signal that is never triggered.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    pub fn ensure_active(&self) -> Result<(), OrderingError> {
        if self.is_cancelled() {
            Err(OrderingError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once cancellation is requested. Pending forever otherwise.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Source dropped without cancelling
                return std::future::pending().await;
            }
        }
    }

    /// Run `operation` unless cancellation wins the race.
    ///
    /// Only use this for work that is safe to abandon midway (reads).
    pub async fn run<F, T>(&self, operation: F) -> Result<T, OrderingError>
    where
        F: Future<Output = Result<T, OrderingError>>,
    {
        self.ensure_active()?;

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(OrderingError::Cancelled),
            result = operation => result,
        }
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::never()
    }
}
