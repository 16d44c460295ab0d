use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use renewal_api::config::ServerConfig;
use renewal_api::router::build_app_router;
use renewal_api::state::AppState;
use renewal_core::batch::BatchOrchestrator;
use renewal_core::types::Environment;
use renewal_db::{PgConnectionFactory, StoreConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "renewal_api=debug,renewal_core=debug,renewal_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let store_config = Arc::new(StoreConfig::from_env());
    for environment in Environment::ALL {
        tracing::info!(
            %environment,
            configured = store_config.database_url(environment).is_some(),
            "License store environment"
        );
    }

    // --- Batch orchestrator ---
    let shutdown = CancellationToken::new();
    let orchestrator = BatchOrchestrator::new(Arc::new(PgConnectionFactory::new(Arc::clone(
        &store_config,
    ))))
    .with_statement_timeout(store_config.client_timeout())
    .with_cancellation(shutdown.clone());

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let server = axum::serve(listener, app).with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            // Stop in-flight batches between keys; they return what they have.
            shutdown.cancel();
        }
    });

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => {
            report_server_exit(result);
            return;
        }
        () = shutdown.cancelled() => {}
    }

    // Signal received: give in-flight requests `drain` to finish.
    match tokio::time::timeout(drain, server).await {
        Ok(result) => report_server_exit(result),
        Err(_) => tracing::warn!(?drain, "Shutdown drain timed out, exiting"),
    }
}

fn report_server_exit(result: Result<std::io::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => tracing::info!("Graceful shutdown complete"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server error"),
        Err(e) => tracing::error!(error = %e, "Server task failed"),
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
