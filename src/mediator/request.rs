use std::fmt;

use async_trait::async_trait;

use crate::domain::order::OrderingError;

use super::cancellation::CancellationSignal;

/// Tag used to route a request to its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    CheckoutOrder,
    UpdateOrder,
    DeleteOrder,
    GetOrdersList,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::CheckoutOrder => "checkout_order",
            RequestKind::UpdateOrder => "update_order",
            RequestKind::DeleteOrder => "delete_order",
            RequestKind::GetOrdersList => "get_orders_list",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed command or query that the dispatcher can route.
pub trait Request: Send + 'static {
    type Response: Send + 'static;

    const KIND: RequestKind;
}

/// Handles exactly one request type.
///
/// Handlers are stateless between calls, so a single instance serves every
/// in-flight request.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        cancel: &CancellationSignal,
    ) -> Result<R::Response, OrderingError>;
}
