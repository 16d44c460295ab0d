//! Actor identity extractor for audited writes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Identity recorded as `updated_by` on applied changes.
///
/// Authentication happens upstream; the proxy forwards the resolved identity
/// in the configured actor header. Without the header the configured
/// default actor is used.
///
/// ```ignore
/// async fn my_handler(actor: Actor) -> AppResult<Json<()>> {
///     tracing::info!(actor = %actor.0, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(&state.config.actor_header) else {
            return Ok(Actor(state.config.default_actor.clone()));
        };

        let identity = value
            .to_str()
            .map_err(|_| AppError::BadRequest("Actor header must be valid ASCII".into()))?
            .trim();

        if identity.is_empty() {
            return Ok(Actor(state.config.default_actor.clone()));
        }

        Ok(Actor(identity.to_string()))
    }
}
