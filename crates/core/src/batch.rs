//! Batch orchestrator: one statement per order key over one connection.
//!
//! Guarantees:
//! - batch-level problems (bad input, unreachable store) fail the call
//!   before any key is processed;
//! - a failing key is recorded in its own outcome and never stops the keys
//!   after it;
//! - outcomes come back in input order, one per key, unless the batch is
//!   cancelled, in which case the result is marked [`BatchStatus::Cancelled`];
//! - the connection is closed on every path once it has been opened.
//!
//! Keys run strictly sequentially: a single connection does not accept
//! concurrent statements. No retries happen at this layer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::CoreError;
use crate::license::{validate_batch_size, OrderKey, UpdateIntent};
use crate::outcome::{
    to_apply_row, to_execution_failure, to_preview_row, BatchResult, BatchStatus, RecordOutcome,
    MSG_APPLY_FAILED, MSG_PREVIEW_FAILED,
};
use crate::query::{build_apply, build_preview, Statement};
use crate::store::{ConnectionFactory, LicenseConnection, StoreError};
use crate::types::Environment;

/// Default bound on a single statement.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do with every key of a batch.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Read current expiry metadata.
    Preview { environment: Environment },
    /// Write a new expiry date and audit comment, stamped with `actor`.
    Apply { intent: UpdateIntent, actor: String },
}

impl Operation {
    pub fn environment(&self) -> Environment {
        match self {
            Self::Preview { environment } => *environment,
            Self::Apply { intent, .. } => intent.environment(),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::Preview { .. } => "preview",
            Self::Apply { .. } => "apply",
        }
    }
}

/// Runs preview and apply batches against stores handed out by a factory.
#[derive(Clone)]
pub struct BatchOrchestrator {
    factory: Arc<dyn ConnectionFactory>,
    statement_timeout: Duration,
    cancel: CancellationToken,
}

impl BatchOrchestrator {
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Client-side bound on each statement. Stores that enforce their own
    /// server-side timeout should be given a slightly longer one here.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Stop in-flight batches between keys once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn factory(&self) -> &Arc<dyn ConnectionFactory> {
        &self.factory
    }

    /// Run `operation` for every key, in order.
    pub async fn run(
        &self,
        keys: &[OrderKey],
        operation: &Operation,
    ) -> Result<BatchResult, CoreError> {
        let statements = build_statements(keys, operation)?;

        let span = tracing::info_span!(
            "license_batch",
            batch_id = %uuid::Uuid::now_v7(),
            mode = operation.mode(),
            environment = %operation.environment(),
            keys = keys.len(),
        );

        async move {
            let mut conn = self
                .factory
                .connect(operation.environment())
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to acquire store connection");
                    CoreError::Connection(e.to_string())
                })?;

            let result = self.process(conn.as_mut(), keys, &statements, operation).await;

            if let Err(e) = conn.close().await {
                tracing::warn!(error = %e, "Failed to close store connection");
            }

            tracing::info!(
                total = result.outcomes.len(),
                succeeded = result.succeeded(),
                failed = result.failed(),
                complete = result.is_complete(),
                "License batch finished"
            );

            Ok::<_, CoreError>(result)
        }
        .instrument(span)
        .await
    }

    async fn process(
        &self,
        conn: &mut dyn LicenseConnection,
        keys: &[OrderKey],
        statements: &[Statement],
        operation: &Operation,
    ) -> BatchResult {
        let mut outcomes = Vec::with_capacity(keys.len());

        for (key, statement) in keys.iter().zip(statements) {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    processed = outcomes.len(),
                    remaining = keys.len() - outcomes.len(),
                    "License batch cancelled"
                );
                return BatchResult {
                    status: BatchStatus::Cancelled,
                    outcomes,
                };
            }

            let outcome = match operation {
                Operation::Preview { .. } => match self.bounded(conn.fetch_one(statement)).await {
                    Ok(row) => to_preview_row(row, key),
                    Err(e) => key_failed(key, MSG_PREVIEW_FAILED, &e),
                },
                Operation::Apply { .. } => match self.bounded(conn.execute(statement)).await {
                    Ok(rows) => to_apply_row(rows, key),
                    Err(e) => key_failed(key, MSG_APPLY_FAILED, &e),
                },
            };
            outcomes.push(outcome);
        }

        BatchResult {
            status: BatchStatus::Complete,
            outcomes,
        }
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.statement_timeout, fut)
            .await
            .unwrap_or_else(|_| Err(StoreError::Timeout(self.statement_timeout.as_millis() as u64)))
    }
}

/// Build every statement up front so bad input fails before the store is touched.
fn build_statements(keys: &[OrderKey], operation: &Operation) -> Result<Vec<Statement>, CoreError> {
    validate_batch_size(keys.len())?;
    keys.iter()
        .map(|key| match operation {
            Operation::Preview { .. } => build_preview(key.as_str()),
            Operation::Apply { intent, actor } => build_apply(key.as_str(), intent, actor),
        })
        .collect()
}

fn key_failed(key: &OrderKey, context: &str, err: &StoreError) -> RecordOutcome {
    tracing::warn!(order_number = %key, error = %err, "{context}");
    to_execution_failure(key, context, err)
}
