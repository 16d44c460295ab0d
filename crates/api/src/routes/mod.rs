pub mod environments;
pub mod health;
pub mod orders;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /orders/preview                       POST  preview expiry of listed orders
/// /orders/update                        POST  set expiry + audit comment
/// /environments                         GET   configured environments
/// /environments/{environment}/status    GET   live connection check
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", orders::router())
        .nest("/environments", environments::router())
}
