//! Route definitions for environment discovery.
//!
//! Mounted at `/environments` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::environments;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(environments::list_environments))
        .route(
            "/{environment}/status",
            get(environments::environment_status),
        )
}
