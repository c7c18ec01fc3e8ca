//! API route handlers
//!
//! - `generate`: question answering over retrieved passages
//! - `search`: nearest-neighbour search by text or vector
//! - `embeddings`: batch embedding
//! - `health`: liveness, readiness and model listing

pub mod embeddings;
pub mod generate;
pub mod health;
pub mod search;

use crate::error::ServerError;
use crate::tools;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "lexrag",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/generate",
            "/search",
            "/embeddings",
            "/models",
            "/tools",
            "/health",
            "/ready"
        ]
    }))
}

/// Manifest of the tool-style endpoints
pub async fn tool_manifest() -> impl IntoResponse {
    Json(json!({ "tools": tools::all_tool_definitions() }))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
