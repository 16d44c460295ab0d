//! Parameterized statements against the `licenses` table.
//!
//! Statement text is fixed at compile time. Every per-call value (order
//! number, date, comment, actor) is carried as a bound parameter, so caller
//! input can never change the shape of the SQL. Placeholders use the
//! PostgreSQL `$n` form.

use crate::error::CoreError;
use crate::license::{OrderKey, UpdateIntent};
use crate::types::ExpiryDate;

const PREVIEW_SQL: &str = "\
    SELECT order_number, expiry_date \
    FROM licenses \
    WHERE order_number = $1";

const APPLY_SQL: &str = "\
    UPDATE licenses \
    SET expiry_date = $1, \
        comment = $2, \
        last_updated = CURRENT_TIMESTAMP, \
        updated_by = $3 \
    WHERE order_number = $4";

/// Which of the two statement shapes a [`Statement`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT` of one license row. Params: `[order_number]`.
    Preview,
    /// `UPDATE` of one license row. Params: `[expiry_date, comment, updated_by, order_number]`.
    Apply,
}

/// A single bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Date(ExpiryDate),
}

impl SqlParam {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Date(_) => None,
        }
    }

    pub fn as_date(&self) -> Option<ExpiryDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Text(_) => None,
        }
    }
}

/// Statement text plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    sql: &'static str,
    params: Vec<SqlParam>,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }
}

/// Build the read-only lookup for one order number.
pub fn build_preview(key: &str) -> Result<Statement, CoreError> {
    let key = OrderKey::parse(key)?;
    Ok(Statement {
        kind: StatementKind::Preview,
        sql: PREVIEW_SQL,
        params: vec![SqlParam::Text(key.as_str().to_string())],
    })
}

/// Build the update of one order number, stamping `actor` as `updated_by`.
pub fn build_apply(key: &str, intent: &UpdateIntent, actor: &str) -> Result<Statement, CoreError> {
    let key = OrderKey::parse(key)?;
    if actor.trim().is_empty() {
        return Err(CoreError::Validation("Actor must not be empty".to_string()));
    }
    Ok(Statement {
        kind: StatementKind::Apply,
        sql: APPLY_SQL,
        params: vec![
            SqlParam::Date(intent.expiry_date()),
            SqlParam::Text(intent.comment().to_string()),
            SqlParam::Text(actor.to_string()),
            SqlParam::Text(key.as_str().to_string()),
        ],
    })
}
