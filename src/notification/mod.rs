// ============================================================================
// Notification - Best-effort outbound mail
// ============================================================================
//
// - email.rs       - Email message, EmailService port, logging transport
// - best_effort.rs - BestEffortNotifier: timeout + retry + circuit breaker,
//                    never reports failure to its caller
// - dead_letter.rs - In-memory record of notifications that could not be sent
//
// ============================================================================

mod best_effort;
mod dead_letter;
mod email;

pub use best_effort::{BestEffortNotifier, NotificationOutcome};
pub use dead_letter::{DeadLetterStats, FailedNotification, FailedNotificationLog};
pub use email::{Email, EmailService, LoggingEmailService, NotificationError};
