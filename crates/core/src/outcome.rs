//! Per-record outcomes and the batch result that carries them.
//!
//! The `to_*` functions are total: every input maps to exactly one
//! [`RecordOutcome`]. A missing row or a missing expiry date is an explicit
//! "unknown", never an error.

use serde::Serialize;

use crate::license::OrderKey;
use crate::store::{LicenseRow, StoreError};
use crate::types::ExpiryDate;

pub const MSG_FOUND: &str = "Found";
pub const MSG_SUCCESS: &str = "Success";
pub const MSG_NOT_FOUND: &str = "No matching order found";
pub const MSG_PREVIEW_FAILED: &str = "Failed to retrieve order information";
pub const MSG_APPLY_FAILED: &str = "Failed to update";

/// Why a record did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Zero matching rows. A normal outcome, not a failure of the store.
    NotFound,
    /// The statement itself failed or timed out.
    ExecutionError,
}

/// Result for one input key. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub order_key: OrderKey,
    pub success: bool,
    pub expiry_date: Option<ExpiryDate>,
    pub message: String,
    pub error_kind: Option<ErrorKind>,
}

impl RecordOutcome {
    pub fn is_execution_error(&self) -> bool {
        self.error_kind == Some(ErrorKind::ExecutionError)
    }
}

/// Map a preview lookup to an outcome.
pub fn to_preview_row(row: Option<LicenseRow>, key: &OrderKey) -> RecordOutcome {
    match row {
        Some(row) => RecordOutcome {
            order_key: key.clone(),
            success: true,
            expiry_date: row.expiry_date,
            message: MSG_FOUND.to_string(),
            error_kind: None,
        },
        None => RecordOutcome {
            order_key: key.clone(),
            success: false,
            expiry_date: None,
            message: MSG_NOT_FOUND.to_string(),
            error_kind: Some(ErrorKind::NotFound),
        },
    }
}

/// Map an update's affected-row count to an outcome.
pub fn to_apply_row(rows_affected: u64, key: &OrderKey) -> RecordOutcome {
    if rows_affected > 0 {
        RecordOutcome {
            order_key: key.clone(),
            success: true,
            expiry_date: None,
            message: MSG_SUCCESS.to_string(),
            error_kind: None,
        }
    } else {
        RecordOutcome {
            order_key: key.clone(),
            success: false,
            expiry_date: None,
            message: MSG_NOT_FOUND.to_string(),
            error_kind: Some(ErrorKind::NotFound),
        }
    }
}

/// Map a failed statement to an outcome.
///
/// `context` is the caller-facing message prefix; the store detail is
/// appended only for timeouts, which carry nothing sensitive.
pub fn to_execution_failure(key: &OrderKey, context: &str, err: &StoreError) -> RecordOutcome {
    let message = match err {
        StoreError::Timeout(_) => format!("{context}: {err}"),
        _ => context.to_string(),
    };
    RecordOutcome {
        order_key: key.clone(),
        success: false,
        expiry_date: None,
        message,
        error_kind: Some(ErrorKind::ExecutionError),
    }
}

// ---------------------------------------------------------------------------
// BatchResult
// ---------------------------------------------------------------------------

/// Whether every key was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Complete,
    /// Stopped early. `outcomes` holds only the keys processed before the stop.
    Cancelled,
}

/// Outcomes in input order plus completion status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchResult {
    pub fn is_complete(&self) -> bool {
        self.status == BatchStatus::Complete
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}
