use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::commands::{CheckoutOrder, UpdateOrder};

// ============================================================================
// Command Validation
// ============================================================================
//
// Every rule of a command is evaluated; failures are collected, never
// short-circuited. Rules only look at the command's own fields.
//
// ============================================================================

pub const USER_NAME_MAX_LENGTH: usize = 50;

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: &'static str,
    pub message: String,
}

impl FieldFailure {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of evaluating a rule set. Empty means the command passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    failures: Vec<FieldFailure>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn push(&mut self, failure: FieldFailure) {
        self.failures.push(failure);
    }

    /// Turn a non-passing result into the error a handler returns.
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure {
                failures: self.failures,
            })
        }
    }

    fn not_empty(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(FieldFailure::new(field, format!("{field} is required")));
        }
    }

    fn max_length(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(FieldFailure::new(
                field,
                format!("{field} must not exceed {max} characters"),
            ));
        }
    }

    fn not_zero(&mut self, field: &'static str, value: Decimal) {
        if value.is_zero() {
            self.push(FieldFailure::new(field, format!("{field} is required")));
        }
    }

    fn greater_than_zero(&mut self, field: &'static str, value: Decimal) {
        if value <= Decimal::ZERO {
            self.push(FieldFailure::new(
                field,
                format!("{field} should be greater than zero"),
            ));
        }
    }
}

/// One or more field-level violations, reported before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    failures: Vec<FieldFailure>,
}

impl ValidationFailure {
    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn has_failure_for(&self, field: &str) -> bool {
        self.failures.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationFailure {}

/// Per-command rule set.
pub trait Validate {
    fn validate(&self) -> ValidationResult;
}

impl Validate for CheckoutOrder {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        result.not_empty("user_name", &self.user_name);
        result.max_length("user_name", &self.user_name, USER_NAME_MAX_LENGTH);

        result.not_empty("email_address", &self.email_address);

        result.not_zero("total_price", self.total_price);
        result.greater_than_zero("total_price", self.total_price);

        result
    }
}

impl Validate for UpdateOrder {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if let Some(user_name) = &self.user_name {
            result.not_empty("user_name", user_name);
            result.max_length("user_name", user_name, USER_NAME_MAX_LENGTH);
        }

        if let Some(email_address) = &self.email_address {
            result.not_empty("email_address", email_address);
        }

        if let Some(total_price) = self.total_price {
            result.not_zero("total_price", total_price);
            result.greater_than_zero("total_price", total_price);
        }

        result
    }
}
