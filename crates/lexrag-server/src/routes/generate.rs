use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use lexrag_core::{ChatResponse, Outcome, Query, SearchResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request to answer one question
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub query: String,

    /// Passages retrieved as evidence
    #[serde(rename = "topK", default)]
    pub top_k: Option<usize>,

    #[serde(default)]
    pub model: Option<String>,
}

/// Answer with its cited sources
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub text: String,
    pub model: String,
    pub sources: Vec<SourceRef>,
    pub is_error: bool,
    pub outcome: Outcome,
}

/// Citation of one retrieved passage
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub law_number: String,
    pub law_code: String,
    pub score: f32,
    pub filename: String,
    pub chunk: i64,
}

impl From<&SearchResult> for SourceRef {
    fn from(result: &SearchResult) -> Self {
        Self {
            law_number: result.law_number.clone(),
            law_code: result.law_code.clone(),
            score: result.score,
            filename: result.filename.clone(),
            chunk: result.chunk,
        }
    }
}

impl GenerateResponse {
    fn from_chat(response: ChatResponse, fallback_model: String, max_sources: usize) -> Self {
        Self {
            sources: response
                .sources
                .iter()
                .take(max_sources)
                .map(SourceRef::from)
                .collect(),
            text: response.answer,
            model: response.model.unwrap_or(fallback_model),
            is_error: response.is_error,
            outcome: response.outcome,
        }
    }
}

/// POST /generate
///
/// Pipeline failures are reported in the body with HTTP 200; only malformed
/// requests and cancellation produce error statuses.
pub async fn generate(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ServerResult<Json<GenerateResponse>> {
    let Json(request) = payload?;
    let cancel = state.request_token();

    let requested_model = request
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from);
    let fallback_model = requested_model
        .clone()
        .unwrap_or_else(|| state.pipeline.model().default_model().to_string());

    let query = Query {
        text: request.query,
        model: requested_model,
        limit: request.top_k.filter(|k| *k > 0),
    };

    let response = state
        .pipeline
        .ask(query, &cancel)
        .await
        .map_err(ServerError::from)?;

    tracing::info!(
        "Answered query with outcome {:?} ({} sources)",
        response.outcome,
        response.sources.len()
    );

    Ok(Json(GenerateResponse::from_chat(
        response,
        fallback_model,
        state.config.server.max_sources,
    )))
}
