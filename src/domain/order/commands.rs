use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::mediator::{Request, RequestKind};
use crate::models::OrderId;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================
//
// Commands are built by the caller, consumed once by their handler and
// never persisted themselves.
//
// ============================================================================

/// Place a new order from a checked-out basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub user_name: String,
    pub total_price: Decimal,

    // Billing address
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub address_line: String,
    pub country: String,
    pub state: String,
    pub zip_code: String,

    // Payment
    pub card_name: String,
    pub card_number: String,
    pub expiration: String,
    pub cvv: String,
    pub payment_method: i32,
}

impl Request for CheckoutOrder {
    type Response = OrderId;
    const KIND: RequestKind = RequestKind::CheckoutOrder;
}

/// Change an existing order. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOrder {
    pub id: OrderId,
    pub user_name: Option<String>,
    pub total_price: Option<Decimal>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub address_line: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,

    pub card_name: Option<String>,
    pub card_number: Option<String>,
    pub expiration: Option<String>,
    pub cvv: Option<String>,
    pub payment_method: Option<i32>,
}

impl UpdateOrder {
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_total_price(mut self, total_price: Decimal) -> Self {
        self.total_price = Some(total_price);
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    pub fn with_email_address(mut self, email_address: impl Into<String>) -> Self {
        self.email_address = Some(email_address.into());
        self
    }

    pub fn with_address_line(mut self, address_line: impl Into<String>) -> Self {
        self.address_line = Some(address_line.into());
        self
    }
}

impl Request for UpdateOrder {
    type Response = ();
    const KIND: RequestKind = RequestKind::UpdateOrder;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOrder {
    pub id: OrderId,
}

impl Request for DeleteOrder {
    type Response = ();
    const KIND: RequestKind = RequestKind::DeleteOrder;
}
