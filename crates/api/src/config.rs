use std::str::FromStr;

use axum::http::HeaderName;

/// Server configuration loaded from environment variables.
///
/// Every setting has a default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long in-flight batches may keep running after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Identity recorded as `updated_by` when no actor header is present.
    pub default_actor: String,
    /// Header carrying the identity resolved by the upstream auth proxy.
    pub actor_header: HeaderName,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `DEFAULT_ACTOR`         | `current-user@example.com` |
    /// | `ACTOR_HEADER`          | `x-authenticated-user`     |
    ///
    /// Panics on a value that does not parse; misconfiguration should stop
    /// the server before it binds.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parsed_env_or("PORT", 3000),
            cors_origins: split_origins(&env_or("CORS_ORIGINS", "http://localhost:5173")),
            request_timeout_secs: parsed_env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parsed_env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            default_actor: env_or("DEFAULT_ACTOR", "current-user@example.com"),
            actor_header: parsed_env_or(
                "ACTOR_HEADER",
                HeaderName::from_static("x-authenticated-user"),
            ),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

/// Comma-separated origins, blanks dropped.
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
