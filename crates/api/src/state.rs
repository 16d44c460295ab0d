use std::sync::Arc;

use renewal_core::batch::BatchOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable. Holds no connection: every batch opens and closes its own.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Batch orchestrator wired to the per-environment connection factory.
    pub orchestrator: BatchOrchestrator,
}
