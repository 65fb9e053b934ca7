use crate::models::{Order, OrdersVm};

use super::commands::{CheckoutOrder, UpdateOrder};

// ============================================================================
// Order Mapping
// ============================================================================
//
// Field-by-field transforms between commands, the entity and the view
// model. No validation and no defaulting happens here.
//
// ============================================================================

impl From<CheckoutOrder> for Order {
    fn from(command: CheckoutOrder) -> Self {
        Self {
            id: 0,
            user_name: command.user_name,
            total_price: command.total_price,
            first_name: command.first_name,
            last_name: command.last_name,
            email_address: command.email_address,
            address_line: command.address_line,
            country: command.country,
            state: command.state,
            zip_code: command.zip_code,
            card_name: command.card_name,
            card_number: command.card_number,
            expiration: command.expiration,
            cvv: command.cvv,
            payment_method: command.payment_method,
            created_at: None,
            last_modified_at: None,
        }
    }
}

/// Overwrite the fields present in `command`. Identity and audit stamps
/// are left alone.
pub fn merge_update(target: &mut Order, command: UpdateOrder) {
    fn set<T>(slot: &mut T, value: Option<T>) {
        if let Some(value) = value {
            *slot = value;
        }
    }

    set(&mut target.user_name, command.user_name);
    set(&mut target.total_price, command.total_price);
    set(&mut target.first_name, command.first_name);
    set(&mut target.last_name, command.last_name);
    set(&mut target.email_address, command.email_address);
    set(&mut target.address_line, command.address_line);
    set(&mut target.country, command.country);
    set(&mut target.state, command.state);
    set(&mut target.zip_code, command.zip_code);
    set(&mut target.card_name, command.card_name);
    set(&mut target.card_number, command.card_number);
    set(&mut target.expiration, command.expiration);
    set(&mut target.cvv, command.cvv);
    set(&mut target.payment_method, command.payment_method);
}

impl From<&Order> for OrdersVm {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            user_name: order.user_name.clone(),
            total_price: order.total_price,
            first_name: order.first_name.clone(),
            last_name: order.last_name.clone(),
            email_address: order.email_address.clone(),
            address_line: order.address_line.clone(),
            country: order.country.clone(),
            state: order.state.clone(),
            zip_code: order.zip_code.clone(),
            card_name: order.card_name.clone(),
            card_number: order.card_number.clone(),
            expiration: order.expiration.clone(),
            cvv: order.cvv.clone(),
            payment_method: order.payment_method,
        }
    }
}
