use serde::{Deserialize, Serialize};

use crate::mediator::{Request, RequestKind};
use crate::models::OrdersVm;

// ============================================================================
// Order Queries - Read side, no state change
// ============================================================================

/// All orders placed by one user, matched exactly on user name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOrdersList {
    pub user_name: String,
}

impl GetOrdersList {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

impl Request for GetOrdersList {
    type Response = Vec<OrdersVm>;
    const KIND: RequestKind = RequestKind::GetOrdersList;
}
