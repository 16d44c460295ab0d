//! Domain core for bulk license renewal.
//!
//! Validation, statement building, outcome shaping and the batch
//! orchestrator. The store is reached only through the traits in
//! [`store`]; this crate has no database dependency.

pub mod batch;
pub mod error;
pub mod license;
pub mod outcome;
pub mod query;
pub mod store;
pub mod types;
