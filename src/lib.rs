// ============================================================================
// Ordering Pipeline
// ============================================================================
//
// Typed requests go through the mediator Dispatcher to one handler each.
// Handlers validate, map, write through the OrderRepository port and, on
// checkout, hand an email to the BestEffortNotifier.
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod health;
pub mod mediator;
pub mod metrics;
pub mod models;
pub mod notification;
pub mod repository;
pub mod utils;

#[cfg(test)]
mod testing;
