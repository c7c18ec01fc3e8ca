use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use lexrag_core::EmbeddingVector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct EmbeddingsRequest {
    pub texts: Vec<String>,

    #[serde(default)]
    pub model: Option<String>,
}

/// One slot per input text; failed slots are `null` and listed in `failedIndices`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingsResponse {
    pub model: String,
    pub vectors: Vec<Option<EmbeddingVector>>,
    pub dim: usize,
    pub failed_indices: Vec<usize>,
}

/// POST /embeddings
pub async fn embeddings(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<EmbeddingsRequest>, JsonRejection>,
) -> ServerResult<Json<EmbeddingsResponse>> {
    let Json(request) = payload?;
    let cancel = state.request_token();
    let embedder = state.pipeline.embedder();

    if let Some(requested) = request.model.as_deref().filter(|m| !m.is_empty()) {
        if requested != embedder.model_name() {
            tracing::debug!(
                "Requested embedding model {} ignored, service uses {}",
                requested,
                embedder.model_name()
            );
        }
    }

    let batch = embedder
        .embed_batch(
            &request.texts,
            state.config.embedding.batch_concurrency,
            &cancel,
        )
        .await?;

    if !batch.is_complete() {
        tracing::warn!(
            "{} of {} texts failed to embed",
            batch.failures.len(),
            request.texts.len()
        );
    }

    Ok(Json(EmbeddingsResponse {
        model: embedder.model_name().to_string(),
        dim: batch.dimensions(),
        failed_indices: batch.failed_indices(),
        vectors: batch.vectors,
    }))
}
