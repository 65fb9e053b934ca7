// ============================================================================
// Order Domain - Commands, queries and their handlers
// ============================================================================
//
// - Commands (CheckoutOrder, UpdateOrder, DeleteOrder)
// - Queries (GetOrdersList)
// - Validation rule sets, run by handlers before any write
// - Mapper between commands, the Order entity and OrdersVm
// - Errors (OrderingError)
// - Handlers, one per request type
//
// ============================================================================

pub mod commands;
pub mod errors;
pub mod handlers;
pub mod mapper;
pub mod queries;
pub mod validation;

pub use commands::*;
pub use errors::*;
pub use handlers::*;
pub use mapper::merge_update;
pub use queries::*;
pub use validation::*;
