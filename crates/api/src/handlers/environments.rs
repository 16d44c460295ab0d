//! Handlers for environment discovery and connection status.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use renewal_core::store::StoreError;
use renewal_core::types::Environment;

use crate::error::AppResult;
use crate::handlers::orders::parse_environment;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EnvironmentInfo {
    pub environment: Environment,
    pub configured: bool,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentStatus {
    pub environment: Environment,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /environments
pub async fn list_environments(
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<EnvironmentInfo>>> {
    let factory = state.orchestrator.factory();
    let data = Environment::ALL
        .into_iter()
        .map(|environment| EnvironmentInfo {
            environment,
            configured: factory.is_configured(environment),
        })
        .collect();

    Json(DataResponse { data })
}

/// GET /environments/{environment}/status
///
/// Open a connection, round-trip once, close it. An unreachable store is a
/// normal `connected: false` answer, not an error response.
pub async fn environment_status(
    State(state): State<AppState>,
    Path(environment): Path<String>,
) -> AppResult<Json<DataResponse<EnvironmentStatus>>> {
    let environment = parse_environment(Some(environment.as_str()))?;

    let outcome = check_connection(&state, environment).await;
    if let Err(e) = &outcome {
        tracing::warn!(%environment, error = %e, "Environment connection check failed");
    }

    Ok(Json(DataResponse {
        data: EnvironmentStatus {
            environment,
            connected: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
        },
    }))
}

async fn check_connection(state: &AppState, environment: Environment) -> Result<(), StoreError> {
    let mut conn = state.orchestrator.factory().connect(environment).await?;
    let pinged = conn.ping().await;
    if let Err(e) = conn.close().await {
        tracing::warn!(%environment, error = %e, "Failed to close store connection");
    }
    pinged
}
