use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use lexrag_core::SearchResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Search by text or by a precomputed vector, never both
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query_text: Option<String>,

    #[serde(default)]
    pub query_vector: Option<Vec<f32>>,

    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchResult>,
}

/// POST /search
pub async fn search(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ServerResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    let cancel = state.request_token();
    let limit = request
        .top_k
        .filter(|k| *k > 0)
        .unwrap_or(state.config.vector_store.default_limit);

    let items = match (request.query_text, request.query_vector) {
        (Some(text), None) => {
            state
                .pipeline
                .retrieve(&text, Some(limit), &cancel)
                .await?
        }
        (None, Some(vector)) => {
            if vector.is_empty() {
                return Err(ServerError::BadRequest(
                    "query_vector must not be empty".to_string(),
                ));
            }
            state
                .pipeline
                .search_vector(&vector, limit, &cancel)
                .await?
        }
        _ => {
            return Err(ServerError::BadRequest(
                "exactly one of query_text or query_vector is required".to_string(),
            ))
        }
    };

    tracing::debug!("Search returned {} items", items.len());
    Ok(Json(SearchResponse { items }))
}
