//! Server initialization and routing

use crate::routes::{api_info, embeddings, generate, health, not_found, search, tool_manifest};
use crate::state::ServerState;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use lexrag_core::{CancellationToken, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/models", get(health::list_models))
        .route("/tools", get(tool_manifest))
        .route("/generate", post(generate::generate))
        .route("/search", post(search::search))
        .route("/embeddings", post(embeddings::embeddings))
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.server.request_timeout_secs),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until SIGTERM or Ctrl+C
///
/// On shutdown, requests still in flight are cancelled and answer 499.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config.server.bind.parse()?;
    let state = Arc::new(ServerState::new(config)?);
    let shutdown = state.shutdown.clone();

    tracing::info!(
        "Starting lexrag server on {} (collection {}, model {})",
        addr,
        state.config.vector_store.collection,
        state.config.model.default_model
    );
    tracing::info!(
        "Timeout: {}s, CORS: {}, model concurrency: {}",
        state.config.server.request_timeout_secs,
        state.config.server.enable_cors,
        state.config.model.max_concurrency
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a termination signal, then cancel in-flight work
async fn shutdown_signal(shutdown: CancellationToken) {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }

    shutdown.cancel();
}
