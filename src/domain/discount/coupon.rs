use serde::{Deserialize, Serialize};

pub type CouponId = i32;

pub const NO_DISCOUNT_PRODUCT: &str = "No Discount";
pub const NO_DISCOUNT_DESCRIPTION: &str = "No Discount Desc";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Coupon {
    pub id: CouponId,
    pub product_name: String,
    pub description: String,
    pub amount: i32,
}

impl Coupon {
    pub fn new(product_name: impl Into<String>, description: impl Into<String>, amount: i32) -> Self {
        Self {
            id: 0,
            product_name: product_name.into(),
            description: description.into(),
            amount,
        }
    }

    /// Returned for products without a coupon.
    pub fn no_discount() -> Self {
        Self::new(NO_DISCOUNT_PRODUCT, NO_DISCOUNT_DESCRIPTION, 0)
    }

    pub fn is_discount(&self) -> bool {
        self.amount != 0
    }
}
