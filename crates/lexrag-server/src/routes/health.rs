use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "lexrag-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_secs(),
        "model_metrics": state.pipeline.model().metrics(),
    }))
}

/// Readiness check endpoint
/// Returns 503 unless the vector store, embedding service and model backend all answer
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let status = state.pipeline.check_services().await;
    let ready = status.all_ok();

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let component = |ok: bool| if ok { "ready" } else { "unavailable" };

    (
        code,
        Json(json!({
            "status": if ready { "ready" } else { "degraded" },
            "service": "lexrag-server",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "components": {
                "vector_store": component(status.vector_store),
                "embedding": component(status.embedding),
                "model": component(status.model),
            },
            "models": status.models,
        })),
    )
}

/// Models the generation backend can serve
pub async fn list_models(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let model = state.pipeline.model();
    let models = model.list_models().await?;

    Ok(Json(json!({
        "default": model.default_model(),
        "models": models,
    })))
}
