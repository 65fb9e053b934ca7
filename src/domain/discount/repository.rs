use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repository::RepositoryError;

use super::coupon::{Coupon, CouponId};

/// Coupon storage. Writes report whether a row was affected.
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// The coupon for `product_name`, or the "no discount" coupon.
    async fn get_discount(&self, product_name: &str) -> Result<Coupon, RepositoryError>;

    async fn create_discount(&self, coupon: Coupon) -> Result<bool, RepositoryError>;

    /// Matched on id.
    async fn update_discount(&self, coupon: Coupon) -> Result<bool, RepositoryError>;

    /// Removes every coupon for `product_name`.
    async fn delete_discount(&self, product_name: &str) -> Result<bool, RepositoryError>;
}

pub struct InMemoryCouponRepository {
    coupons: RwLock<BTreeMap<CouponId, Coupon>>,
    next_id: AtomicI32,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self {
            coupons: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryCouponRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn get_discount(&self, product_name: &str) -> Result<Coupon, RepositoryError> {
        let coupons = self.coupons.read().await;
        let found = coupons
            .values()
            .find(|c| c.product_name == product_name)
            .cloned();

        Ok(found.unwrap_or_else(|| {
            tracing::debug!(product_name, "No coupon for product");
            Coupon::no_discount()
        }))
    }

    async fn create_discount(&self, mut coupon: Coupon) -> Result<bool, RepositoryError> {
        coupon.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(coupon_id = coupon.id, product_name = %coupon.product_name, "Coupon created");
        self.coupons.write().await.insert(coupon.id, coupon);
        Ok(true)
    }

    async fn update_discount(&self, coupon: Coupon) -> Result<bool, RepositoryError> {
        let mut coupons = self.coupons.write().await;
        match coupons.get_mut(&coupon.id) {
            Some(existing) => {
                *existing = coupon;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_discount(&self, product_name: &str) -> Result<bool, RepositoryError> {
        let mut coupons = self.coupons.write().await;
        let before = coupons.len();
        coupons.retain(|_, c| c.product_name != product_name);
        Ok(coupons.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discount::NO_DISCOUNT_PRODUCT;

    #[tokio::test]
    async fn test_missing_coupon_falls_back_to_no_discount() {
        let repo = InMemoryCouponRepository::new();

        let coupon = repo.get_discount("IPhone X").await.unwrap();

        assert_eq!(coupon.product_name, NO_DISCOUNT_PRODUCT);
        assert_eq!(coupon.amount, 0);
        assert!(!coupon.is_discount());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = InMemoryCouponRepository::new();
        assert!(repo
            .create_discount(Coupon::new("IPhone X", "IPhone Discount", 150))
            .await
            .unwrap());

        let coupon = repo.get_discount("IPhone X").await.unwrap();
        assert_eq!(coupon.id, 1);
        assert_eq!(coupon.amount, 150);
    }

    #[tokio::test]
    async fn test_update_reports_affected_rows() {
        let repo = InMemoryCouponRepository::new();
        repo.create_discount(Coupon::new("Samsung 10", "Samsung Discount", 100))
            .await
            .unwrap();

        let mut coupon = repo.get_discount("Samsung 10").await.unwrap();
        coupon.amount = 120;
        assert!(repo.update_discount(coupon).await.unwrap());
        assert_eq!(repo.get_discount("Samsung 10").await.unwrap().amount, 120);

        let mut ghost = Coupon::new("Ghost", "none", 5);
        ghost.id = 42;
        assert!(!repo.update_discount(ghost).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_reports_affected_rows() {
        let repo = InMemoryCouponRepository::new();
        repo.create_discount(Coupon::new("IPhone X", "IPhone Discount", 150))
            .await
            .unwrap();

        assert!(repo.delete_discount("IPhone X").await.unwrap());
        assert!(!repo.delete_discount("IPhone X").await.unwrap());
        assert!(!repo.get_discount("IPhone X").await.unwrap().is_discount());
    }
}
