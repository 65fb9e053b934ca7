// ============================================================================
// Mediator - In-process request routing
// ============================================================================
//
// - request.rs      - Request trait, RequestKind tag, RequestHandler trait
// - cancellation.rs - Cooperative cancellation signal passed to handlers
// - dispatcher.rs   - Registry of handlers keyed by RequestKind
//
// ============================================================================

mod cancellation;
mod dispatcher;
mod request;

pub use cancellation::{cancellation, CancellationSignal, CancellationSource};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use request::{Request, RequestHandler, RequestKind};
