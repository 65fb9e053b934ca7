// ============================================================================
// Discount Domain - Per-product coupons
// ============================================================================
//
// - coupon.rs     - Coupon entity and the "no discount" fallback
// - repository.rs - CouponRepository port and in-memory adapter
//
// ============================================================================

pub mod coupon;
pub mod repository;

pub use coupon::*;
pub use repository::*;
