//! Route definitions for order preview and bulk update.
//!
//! Mounted at `/orders` by `api_routes()`.

use axum::routing::post;
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/preview", post(orders::preview_orders))
        .route("/update", post(orders::update_orders))
}
