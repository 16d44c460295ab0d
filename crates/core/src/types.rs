use std::fmt;

use serde::{Deserialize, Serialize};

/// Calendar dates without time-of-day (license expiry).
pub type ExpiryDate = chrono::NaiveDate;

/// Wire and display format for [`ExpiryDate`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const ENV_DEV: &str = "dev";
pub const ENV_TEST: &str = "test";
pub const ENV_PROD: &str = "prod";

/// All valid environment strings.
pub const VALID_ENVIRONMENTS: &[&str] = &[ENV_DEV, ENV_TEST, ENV_PROD];

/// Deployment environment a batch runs against. Each one maps to its own store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Dev, Self::Test, Self::Prod];

    /// Convert from a request string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ENV_DEV => Ok(Self::Dev),
            ENV_TEST => Ok(Self::Test),
            ENV_PROD => Ok(Self::Prod),
            _ => Err(format!(
                "Invalid environment '{s}'. Must be one of: {}",
                VALID_ENVIRONMENTS.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => ENV_DEV,
            Self::Test => ENV_TEST,
            Self::Prod => ENV_PROD,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<ExpiryDate, String> {
    chrono::NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid date '{s}'. Expected format YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_round_trips_through_str_value() {
        for env in Environment::ALL {
            assert_eq!(Environment::from_str_value(env.as_str()), Ok(env));
        }
    }

    #[test]
    fn unknown_environment_rejected() {
        let err = Environment::from_str_value("staging").unwrap_err();
        assert!(err.contains("dev, test, prod"));
    }

    #[test]
    fn parse_date_accepts_calendar_dates() {
        let date = parse_date("2025-01-01").unwrap();
        assert_eq!(date.to_string(), "2025-01-01");
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("01/02/2025").is_err());
        assert!(parse_date("").is_err());
    }
}
