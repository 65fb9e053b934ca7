use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Models
// ============================================================================

/// Storage-assigned order identity. `0` means "not yet persisted".
pub type OrderId = i32;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: OrderId,
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

    // Audit trail, stamped by the repository
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

// ============================================================================
// View Models
// These are read-only projections handed back to callers
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrdersVm {
    pub id: OrderId,
    pub user_name: String,
    pub total_price: Decimal,

    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub address_line: String,
    pub country: String,
    pub state: String,
    pub zip_code: String,

    pub card_name: String,
    pub card_number: String,
    pub expiration: String,
    pub cvv: String,
    pub payment_method: i32,
}
