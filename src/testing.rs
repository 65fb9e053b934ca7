//! Shared fixtures and fakes for unit tests.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::order::CheckoutOrder;
use crate::models::{Order, OrderId};
use crate::notification::{Email, EmailService, NotificationError};
use crate::repository::{InMemoryOrderRepository, OrderRepository, RepositoryError};

pub fn sample_checkout(user_name: &str) -> CheckoutOrder {
    CheckoutOrder {
        user_name: user_name.to_string(),
        total_price: Decimal::new(35000, 2),
        first_name: "Mehmet".to_string(),
        last_name: "Ozkaya".to_string(),
        email_address: "ezozkme@gmail.com".to_string(),
        address_line: "Bahcelievler".to_string(),
        country: "Turkey".to_string(),
        state: "Istanbul".to_string(),
        zip_code: "34000".to_string(),
        card_name: "Mehmet Ozkaya".to_string(),
        card_number: "5555444433332222".to_string(),
        expiration: "12/28".to_string(),
        cvv: "123".to_string(),
        payment_method: 1,
    }
}

pub fn sample_order(id: OrderId, user_name: &str) -> Order {
    let mut order = Order::from(sample_checkout(user_name));
    order.id = id;
    order
}

/// Keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingEmailService {
    sent: Mutex<Vec<Email>>,
}

impl RecordingEmailService {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send_email(&self, email: &Email) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Fails every send with the same error.
pub struct FailingEmailService {
    error: NotificationError,
    calls: AtomicU32,
}

impl FailingEmailService {
    pub fn new(error: NotificationError) -> Self {
        Self {
            error,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailService for FailingEmailService {
    async fn send_email(&self, _email: &Email) -> Result<(), NotificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// Unavailable for the first `failures` sends, then succeeds.
pub struct FlakyEmailService {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyEmailService {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailService for FlakyEmailService {
    async fn send_email(&self, _email: &Email) -> Result<(), NotificationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(NotificationError::Unavailable(format!("relay busy (call {call})")))
        } else {
            Ok(())
        }
    }
}

/// Succeeds after sleeping for `delay`.
pub struct SlowEmailService {
    delay: Duration,
    delivered: AtomicU32,
}

impl SlowEmailService {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            delivered: AtomicU32::new(0),
        }
    }

    pub fn delivered(&self) -> u32 {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailService for SlowEmailService {
    async fn send_email(&self, _email: &Email) -> Result<(), NotificationError> {
        tokio::time::sleep(self.delay).await;
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory repository whose storage can be switched off or slowed down.
#[derive(Default)]
pub struct OutageRepository {
    pub inner: Arc<InMemoryOrderRepository>,
    down: AtomicBool,
    read_delay_ms: AtomicU64,
}

impl OutageRepository {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Delay applied to every `get_by_id`.
    pub fn set_read_delay(&self, delay: Duration) {
        self.read_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.down.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable("storage offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl OrderRepository for OutageRepository {
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.check()?;
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.inner.get_by_id(id).await
    }

    async fn add(&self, order: Order) -> Result<Order, RepositoryError> {
        self.check()?;
        self.inner.add(order).await
    }

    async fn update(&self, order: Order) -> Result<(), RepositoryError> {
        self.check()?;
        self.inner.update(order).await
    }

    async fn delete(&self, order: Order) -> Result<(), RepositoryError> {
        self.check()?;
        self.inner.delete(order).await
    }

    async fn list_by_user_name(&self, user_name: &str) -> Result<Vec<Order>, RepositoryError> {
        self.check()?;
        self.inner.list_by_user_name(user_name).await
    }
}
