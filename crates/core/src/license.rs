//! License renewal inputs: order keys and update intents.
//!
//! Everything here is validated before a batch touches the store, so a
//! malformed request fails as a whole instead of partially.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{parse_date, Environment, ExpiryDate};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of order keys per batch.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Maximum order key length, in characters, after trimming.
pub const MAX_ORDER_KEY_LENGTH: usize = 100;

/// Maximum audit comment length, in characters.
pub const MAX_COMMENT_LENGTH: usize = 1000;

// ---------------------------------------------------------------------------
// OrderKey
// ---------------------------------------------------------------------------

/// Identifier of one license record (`licenses.order_number`).
///
/// Opaque to this crate. Surrounding whitespace is stripped on parse; the
/// trimmed value must be non-empty. Duplicates within a batch are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderKey(String);

impl OrderKey {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(
                "Order number must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_ORDER_KEY_LENGTH {
            return Err(CoreError::Validation(format!(
                "Order number exceeds maximum length of {MAX_ORDER_KEY_LENGTH}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a caller-supplied key list, preserving its order.
///
/// Fails on an empty list, an oversized list, or any single bad key.
pub fn parse_order_keys<S: AsRef<str>>(raw: &[S]) -> Result<Vec<OrderKey>, CoreError> {
    validate_batch_size(raw.len())?;
    raw.iter()
        .enumerate()
        .map(|(i, key)| {
            OrderKey::parse(key.as_ref()).map_err(|e| match e {
                CoreError::Validation(msg) => {
                    CoreError::Validation(format!("Order number at position {}: {msg}", i + 1))
                }
                other => other,
            })
        })
        .collect()
}

/// Validate the number of keys in a batch.
pub fn validate_batch_size(count: usize) -> Result<(), CoreError> {
    if count == 0 {
        return Err(CoreError::Validation(
            "Invalid order numbers provided".to_string(),
        ));
    }
    if count > MAX_BATCH_SIZE {
        return Err(CoreError::Validation(format!(
            "Batch of {count} order numbers exceeds maximum of {MAX_BATCH_SIZE}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// UpdateIntent
// ---------------------------------------------------------------------------

/// A validated request to move licenses to a new expiry date.
///
/// The comment is the mandatory audit trail and is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateIntent {
    expiry_date: ExpiryDate,
    comment: String,
    environment: Environment,
}

impl UpdateIntent {
    pub fn new(
        expiry_date: ExpiryDate,
        comment: &str,
        environment: Environment,
    ) -> Result<Self, CoreError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(CoreError::Validation(
                "Comments are required for audit trail".to_string(),
            ));
        }
        if comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Comment exceeds maximum length of {MAX_COMMENT_LENGTH}"
            )));
        }
        Ok(Self {
            expiry_date,
            comment: comment.to_string(),
            environment,
        })
    }

    /// Build an intent from raw request strings.
    pub fn parse(
        expiry_date: &str,
        comment: &str,
        environment: Environment,
    ) -> Result<Self, CoreError> {
        if expiry_date.trim().is_empty() {
            return Err(CoreError::Validation("Expiry date is required".to_string()));
        }
        let date = parse_date(expiry_date).map_err(CoreError::Validation)?;
        Self::new(date, comment, environment)
    }

    pub fn expiry_date(&self) -> ExpiryDate {
        self.expiry_date
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}
