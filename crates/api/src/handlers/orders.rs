//! Handlers for the order preview and bulk expiry update endpoints.
//!
//! Both run one batch through the orchestrator. Batch-level problems
//! (malformed input, unreachable store) become an error response; per-order
//! failures are reported inside the `orders` / `results` list.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use renewal_core::batch::Operation;
use renewal_core::error::CoreError;
use renewal_core::license::{parse_order_keys, UpdateIntent};
use renewal_core::outcome::BatchResult;
use renewal_core::types::{Environment, ExpiryDate};

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /orders/preview`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[serde(default, alias = "orderKeys")]
    #[validate(length(min = 1, message = "Invalid order numbers provided"))]
    pub order_numbers: Vec<String>,
    /// `dev`, `test` or `prod`; defaults to `dev`.
    pub environment: Option<String>,
}

/// Request body for `POST /orders/update`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default, alias = "orderKeys")]
    #[validate(length(min = 1, message = "Invalid order numbers provided"))]
    pub order_numbers: Vec<String>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    #[validate(length(min = 1, message = "Expiry date is required"))]
    pub expiry_date: String,
    #[serde(default, alias = "comment")]
    #[validate(length(min = 1, message = "Comments are required for audit trail"))]
    pub comments: String,
    pub environment: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// One row of the preview table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOrder {
    pub order_number: String,
    /// `null` when the order does not exist or has no expiry recorded.
    pub expiry_date: Option<ExpiryDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub orders: Vec<PreviewOrder>,
    /// `false` when the batch stopped before every order was looked up.
    pub complete: bool,
}

/// Per-order result of an update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub order_number: String,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub results: Vec<UpdateResult>,
    pub summary: UpdateSummary,
    /// `false` when the batch stopped before every order was updated.
    pub complete: bool,
}

impl From<BatchResult> for PreviewResponse {
    fn from(result: BatchResult) -> Self {
        let complete = result.is_complete();
        let orders = result
            .outcomes
            .into_iter()
            .map(|outcome| PreviewOrder {
                error: outcome.is_execution_error().then_some(outcome.message),
                order_number: outcome.order_key.to_string(),
                expiry_date: outcome.expiry_date,
            })
            .collect();
        Self { orders, complete }
    }
}

impl From<BatchResult> for UpdateResponse {
    fn from(result: BatchResult) -> Self {
        let summary = UpdateSummary {
            total: result.outcomes.len(),
            succeeded: result.succeeded(),
            failed: result.failed(),
        };
        let complete = result.is_complete();
        let results = result
            .outcomes
            .into_iter()
            .map(|outcome| UpdateResult {
                order_number: outcome.order_key.to_string(),
                success: outcome.success,
                message: outcome.message,
            })
            .collect();
        Self {
            results,
            summary,
            complete,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /orders/preview
///
/// Look up the current expiry date of every listed order.
pub async fn preview_orders(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> AppResult<Json<PreviewResponse>> {
    let Json(body) = payload?;
    body.validate().map_err(validation_error)?;
    let environment = parse_environment(body.environment.as_deref())?;
    let keys = parse_order_keys(&body.order_numbers)?;

    let result = state
        .orchestrator
        .run(&keys, &Operation::Preview { environment })
        .await?;

    Ok(Json(PreviewResponse::from(result)))
}

/// POST /orders/update
///
/// Set a new expiry date and audit comment on every listed order. Each
/// order commits independently.
pub async fn update_orders(
    actor: Actor,
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> AppResult<Json<UpdateResponse>> {
    let Json(body) = payload?;
    body.validate().map_err(validation_error)?;
    let environment = parse_environment(body.environment.as_deref())?;
    let keys = parse_order_keys(&body.order_numbers)?;
    let intent = UpdateIntent::parse(&body.expiry_date, &body.comments, environment)?;

    tracing::info!(
        actor = %actor.0,
        %environment,
        expiry_date = %intent.expiry_date(),
        order_count = keys.len(),
        "License expiry update requested"
    );

    let result = state
        .orchestrator
        .run(
            &keys,
            &Operation::Apply {
                intent,
                actor: actor.0,
            },
        )
        .await?;

    Ok(Json(UpdateResponse::from(result)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse the optional environment field. Absent or blank means `dev`.
pub fn parse_environment(raw: Option<&str>) -> Result<Environment, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Environment::default()),
        Some(value) => Environment::from_str_value(value).map_err(CoreError::Validation),
    }
}

/// Collapse `validator` errors into a single validation message.
fn validation_error(errors: validator::ValidationErrors) -> CoreError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect();
    messages.sort();
    CoreError::Validation(messages.join("; "))
}
