use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::OrderId;

use super::email::{Email, NotificationError};

// ============================================================================
// Failed Notification Log
// ============================================================================
//
// Keeps the most recent undeliverable notifications for inspection or
// manual resend. Bounded; the oldest entry is evicted first.
//
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FailedNotification {
    pub id: Uuid,
    pub order_id: OrderId,
    pub recipient: String,
    pub subject: String,
    /// JSON encoding of the original message
    pub payload: String,
    pub error_kind: &'static str,
    pub error_message: String,
    pub attempts: u32,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeadLetterStats {
    /// Every failure ever recorded, including evicted ones
    pub total_recorded: u64,
    pub retained: usize,
    pub by_error_kind: HashMap<&'static str, u64>,
}

pub struct FailedNotificationLog {
    inner: Mutex<LogState>,
    capacity: usize,
}

#[derive(Default)]
struct LogState {
    entries: VecDeque<FailedNotification>,
    total_recorded: u64,
    by_error_kind: HashMap<&'static str, u64>,
}

impl FailedNotificationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LogState::default()),
            capacity: capacity.max(1),
        }
    }

    pub async fn record(
        &self,
        order_id: OrderId,
        email: &Email,
        error: &NotificationError,
        attempts: u32,
    ) -> FailedNotification {
        let payload = serde_json::to_string(email).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not encode failed notification payload");
            String::new()
        });

        let entry = FailedNotification {
            id: Uuid::now_v7(),
            order_id,
            recipient: email.to.clone(),
            subject: email.subject.clone(),
            payload,
            error_kind: error.kind(),
            error_message: error.to_string(),
            attempts,
            failed_at: Utc::now(),
        };

        tracing::error!(
            dead_letter_id = %entry.id,
            order_id,
            error = %entry.error_message,
            attempts,
            "Adding notification to dead letter log"
        );

        let mut state = self.inner.lock().await;
        if state.entries.len() >= self.capacity {
            state.entries.pop_front();
        }
        state.entries.push_back(entry.clone());
        state.total_recorded += 1;
        *state.by_error_kind.entry(entry.error_kind).or_insert(0) += 1;

        entry
    }

    /// Newest first.
    pub async fn recent(&self, limit: usize) -> Vec<FailedNotification> {
        let state = self.inner.lock().await;
        state.entries.iter().rev().take(limit).cloned().collect()
    }

    pub async fn stats(&self) -> DeadLetterStats {
        let state = self.inner.lock().await;
        DeadLetterStats {
            total_recorded: state.total_recorded,
            retained: state.entries.len(),
            by_error_kind: state.by_error_kind.clone(),
        }
    }
}
