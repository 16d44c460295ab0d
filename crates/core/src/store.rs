//! Store seam for the batch orchestrator.
//!
//! A [`ConnectionFactory`] hands out one exclusively owned
//! [`LicenseConnection`] per batch. Implementations own credentials,
//! environment lookup and any retry policy; the orchestrator only executes
//! statements and closes the handle.

use async_trait::async_trait;

use crate::query::Statement;
use crate::types::{Environment, ExpiryDate};

/// Failures reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or refused authentication.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// A statement failed (constraint violation, transient fault, ...).
    #[error("statement failed: {0}")]
    Execution(String),

    /// A statement did not finish within the allowed time.
    #[error("statement timed out after {0} ms")]
    Timeout(u64),
}

/// One row returned by a preview lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRow {
    pub order_number: String,
    /// `NULL` in the store means the expiry is unknown.
    pub expiry_date: Option<ExpiryDate>,
}

/// A live, authenticated handle to one environment's license store.
#[async_trait]
pub trait LicenseConnection: Send {
    /// Run a lookup statement, returning the first matching row if any.
    async fn fetch_one(&mut self, statement: &Statement) -> Result<Option<LicenseRow>, StoreError>;

    /// Run a mutating statement, returning the number of affected rows.
    async fn execute(&mut self, statement: &Statement) -> Result<u64, StoreError>;

    /// Cheap round trip proving the handle is usable.
    async fn ping(&mut self) -> Result<(), StoreError>;

    /// Release the handle.
    async fn close(self: Box<Self>) -> Result<(), StoreError>;
}

/// Opens connections for a given environment.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(
        &self,
        environment: Environment,
    ) -> Result<Box<dyn LicenseConnection>, StoreError>;

    /// Whether the environment has a store configured at all.
    fn is_configured(&self, environment: Environment) -> bool;
}
