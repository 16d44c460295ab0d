//! Request handlers.
//!
//! Handlers validate input, hand batches to the orchestrator in
//! `renewal_core`, and map errors via [`crate::error::AppError`].

pub mod environments;
pub mod orders;
