//! Shared response envelope for auxiliary endpoints.
//!
//! The order endpoints keep the `{ "orders": ... }` / `{ "results": ... }`
//! bodies the renewal frontend consumes; everything else uses [`DataResponse`].

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
