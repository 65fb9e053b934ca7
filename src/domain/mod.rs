// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each area has its own subdirectory. Storage and transport live outside
// this layer and are reached through ports.
//
// ============================================================================

pub mod discount;
pub mod order;
