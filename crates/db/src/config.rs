use std::collections::HashMap;
use std::time::Duration;

use renewal_core::types::Environment;

/// Extra time the client waits past the server-side statement timeout before
/// giving up on a statement itself.
pub const CLIENT_TIMEOUT_GRACE: Duration = Duration::from_secs(2);

/// Per-environment store configuration loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    database_urls: HashMap<Environment, String>,
    /// Bound on opening and authenticating a connection (default: 30s).
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout` for each per-key statement (default: 30s).
    pub statement_timeout: Duration,
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `DEV_DATABASE_URL`       | unset   |
    /// | `TEST_DATABASE_URL`      | unset   |
    /// | `PROD_DATABASE_URL`      | unset   |
    /// | `CONNECT_TIMEOUT_SECS`   | `30`    |
    /// | `STATEMENT_TIMEOUT_SECS` | `30`    |
    ///
    /// An environment whose URL is unset or blank is not configured.
    pub fn from_env() -> Self {
        let database_urls = Environment::ALL
            .into_iter()
            .filter_map(|env| {
                std::env::var(url_var(env))
                    .ok()
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty())
                    .map(|url| (env, url))
            })
            .collect();

        let connect_timeout_secs: u64 = std::env::var("CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("CONNECT_TIMEOUT_SECS must be a valid u64");

        let statement_timeout_secs: u64 = std::env::var("STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("STATEMENT_TIMEOUT_SECS must be a valid u64");

        Self {
            database_urls,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            statement_timeout: Duration::from_secs(statement_timeout_secs),
        }
    }

    /// Set the connection URL for one environment.
    pub fn with_database_url(mut self, environment: Environment, url: impl Into<String>) -> Self {
        self.database_urls.insert(environment, url.into());
        self
    }

    pub fn database_url(&self, environment: Environment) -> Option<&str> {
        self.database_urls.get(&environment).map(String::as_str)
    }

    /// Client-side bound for one statement. Outlives the server-side
    /// timeout so the server cancels first and the connection stays usable.
    pub fn client_timeout(&self) -> Duration {
        self.statement_timeout + CLIENT_TIMEOUT_GRACE
    }
}

/// Name of the variable holding `environment`'s connection URL.
pub fn url_var(environment: Environment) -> &'static str {
    match environment {
        Environment::Dev => "DEV_DATABASE_URL",
        Environment::Test => "TEST_DATABASE_URL",
        Environment::Prod => "PROD_DATABASE_URL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_environment_has_no_url() {
        let config = StoreConfig::default().with_database_url(Environment::Dev, "postgres://dev");
        assert_eq!(config.database_url(Environment::Dev), Some("postgres://dev"));
        assert_eq!(config.database_url(Environment::Prod), None);
    }

    #[test]
    fn client_timeout_outlasts_server_timeout() {
        let config = StoreConfig {
            statement_timeout: Duration::from_secs(30),
            ..StoreConfig::default()
        };
        assert!(config.client_timeout() > config.statement_timeout);
        assert_eq!(config.client_timeout(), Duration::from_secs(32));
    }

    #[test]
    fn each_environment_has_its_own_variable() {
        assert_eq!(url_var(Environment::Dev), "DEV_DATABASE_URL");
        assert_eq!(url_var(Environment::Test), "TEST_DATABASE_URL");
        assert_eq!(url_var(Environment::Prod), "PROD_DATABASE_URL");
    }
}
