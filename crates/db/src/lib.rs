//! PostgreSQL license store.
//!
//! Implements the `renewal_core::store` traits on a single `sqlx`
//! connection per batch. Connections are opened on demand and closed by the
//! orchestrator; nothing is pooled.

pub mod config;
pub mod store;

use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

pub use config::StoreConfig;
pub use store::{PgConnectionFactory, PgLicenseConnection};

/// Open one connection to `database_url`. See [`connect_with`].
pub async fn connect(
    database_url: &str,
    connect_timeout: Duration,
    statement_timeout: Duration,
) -> Result<PgConnection, sqlx::Error> {
    let options: PgConnectOptions = database_url.parse()?;
    connect_with(options, connect_timeout, statement_timeout).await
}

/// Open one connection, bounded by `connect_timeout`.
///
/// The session's `statement_timeout` is set to `statement_timeout`, so a
/// statement that overruns is cancelled and rolled back by the server and the
/// connection is ready for the next statement.
pub async fn connect_with(
    options: PgConnectOptions,
    connect_timeout: Duration,
    statement_timeout: Duration,
) -> Result<PgConnection, sqlx::Error> {
    let options = options.options([(
        "statement_timeout",
        format!("{}ms", statement_timeout.as_millis()),
    )]);
    tokio::time::timeout(connect_timeout, PgConnection::connect_with(&options))
        .await
        .unwrap_or_else(|_| {
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "connect timed out",
            )))
        })
}

/// Run a trivial query to verify the connection is alive.
pub async fn health_check(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(conn)
        .await?;
    Ok(())
}
