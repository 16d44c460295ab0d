/// Batch-level failures.
///
/// Any of these means nothing was attempted for the batch: no per-key
/// outcomes exist. Per-key failures are never raised as a `CoreError`;
/// they travel inside [`crate::outcome::RecordOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store connection failed: {0}")]
    Connection(String),
}
