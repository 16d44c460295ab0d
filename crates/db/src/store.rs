//! `sqlx` implementation of the license store traits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Connection, PgConnection, Postgres, Row};

use renewal_core::query::{SqlParam, Statement};
use renewal_core::store::{ConnectionFactory, LicenseConnection, LicenseRow, StoreError};
use renewal_core::types::{Environment, ExpiryDate};

use crate::config::{url_var, StoreConfig};

/// Opens a fresh PostgreSQL connection per batch for the requested environment.
#[derive(Debug, Clone)]
pub struct PgConnectionFactory {
    config: Arc<StoreConfig>,
}

impl PgConnectionFactory {
    pub fn new(config: Arc<StoreConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    async fn connect(
        &self,
        environment: Environment,
    ) -> Result<Box<dyn LicenseConnection>, StoreError> {
        let url = self.config.database_url(environment).ok_or_else(|| {
            StoreError::Unreachable(format!(
                "no database configured for environment '{environment}' (set {})",
                url_var(environment)
            ))
        })?;

        let statement_timeout = self.config.statement_timeout;
        let conn = crate::connect(url, self.config.connect_timeout, statement_timeout)
            .await
            .map_err(|e| {
                tracing::error!(%environment, error = %e, "Failed to connect to license store");
                StoreError::Unreachable(format!("cannot connect to '{environment}' store"))
            })?;

        tracing::debug!(%environment, "License store connection opened");
        Ok(Box::new(PgLicenseConnection::new(conn, statement_timeout)))
    }

    fn is_configured(&self, environment: Environment) -> bool {
        self.config.database_url(environment).is_some()
    }
}

/// SQLSTATE raised when the server cancels a statement (`query_canceled`).
const QUERY_CANCELED: &str = "57014";

/// One open PostgreSQL connection.
pub struct PgLicenseConnection {
    conn: PgConnection,
    /// Server-side `statement_timeout` the session was opened with.
    statement_timeout: Duration,
}

impl PgLicenseConnection {
    pub fn new(conn: PgConnection, statement_timeout: Duration) -> Self {
        Self {
            conn,
            statement_timeout,
        }
    }

    /// Like [`execution_error`], but a server-side cancellation is reported
    /// as a timeout.
    fn statement_error(&self, err: sqlx::Error) -> StoreError {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(QUERY_CANCELED) => {
                StoreError::Timeout(self.statement_timeout.as_millis() as u64)
            }
            _ => execution_error(err),
        }
    }
}

#[async_trait]
impl LicenseConnection for PgLicenseConnection {
    async fn fetch_one(&mut self, statement: &Statement) -> Result<Option<LicenseRow>, StoreError> {
        let row = bind(statement)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| self.statement_error(e))?;
        row.map(|row| license_row(&row)).transpose()
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64, StoreError> {
        let result = bind(statement)
            .execute(&mut self.conn)
            .await
            .map_err(|e| self.statement_error(e))?;
        Ok(result.rows_affected())
    }

    async fn ping(&mut self) -> Result<(), StoreError> {
        crate::health_check(&mut self.conn)
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        self.conn.close().await.map_err(execution_error)?;
        tracing::debug!("License store connection closed");
        Ok(())
    }
}

/// Attach every statement parameter as a bind value, in order.
fn bind(statement: &Statement) -> Query<'_, Postgres, PgArguments> {
    statement
        .params()
        .iter()
        .fold(sqlx::query(statement.sql()), |query, param| match param {
            SqlParam::Text(value) => query.bind(value.as_str()),
            SqlParam::Date(value) => query.bind(*value),
        })
}

fn license_row(row: &PgRow) -> Result<LicenseRow, StoreError> {
    Ok(LicenseRow {
        order_number: row.try_get("order_number").map_err(execution_error)?,
        expiry_date: row
            .try_get::<Option<ExpiryDate>, _>("expiry_date")
            .map_err(execution_error)?,
    })
}

fn execution_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => StoreError::Execution(format!(
            "database error {}: {}",
            db_err.code().as_deref().unwrap_or("unknown"),
            db_err.message()
        )),
        _ => StoreError::Execution(err.to_string()),
    }
}
