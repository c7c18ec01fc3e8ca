//! Pipeline inputs, outputs and stages

use crate::search::SearchResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown when the question cannot be embedded (or is empty)
pub const MSG_COULD_NOT_PROCESS: &str = "Could not process your question.";

/// Shown when the search found nothing
pub const MSG_NO_RESULTS: &str = "No relevant results were found for this question.";

/// Shown when the model produced no usable answer
pub const MSG_GENERATION_FAILED: &str = "Could not get an answer because of an error.";

/// Shown for any failure caught at the pipeline boundary
pub const MSG_UNEXPECTED: &str = "An error occurred while processing your question.";

/// One question put to the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    /// Target model; the configured default when absent
    #[serde(default)]
    pub model: Option<String>,
    /// Retrieval count override
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            limit: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The model answered from retrieved evidence
    Answered,
    /// Search succeeded but found nothing
    NoEvidence,
    Failed,
}

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Embedding,
    Searching,
    Assembling,
    Prompting,
    Generating,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Embedding => "embedding",
            Stage::Searching => "searching",
            Stage::Assembling => "assembling",
            Stage::Prompting => "prompting",
            Stage::Generating => "generating",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal artifact of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub query: String,
    pub answer: String,
    /// Evidence the answer was grounded on, in search order
    pub sources: Vec<SearchResult>,
    pub timestamp: DateTime<Utc>,
    pub is_error: bool,
    pub outcome: Outcome,
    /// Model that produced the answer
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model: Option<String>,
}

impl ChatResponse {
    pub fn answered(
        query: impl Into<String>,
        answer: impl Into<String>,
        sources: Vec<SearchResult>,
        model: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
            sources,
            timestamp,
            is_error: false,
            outcome: Outcome::Answered,
            model: Some(model.into()),
        }
    }

    pub fn no_evidence(query: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            query: query.into(),
            answer: MSG_NO_RESULTS.to_string(),
            sources: Vec::new(),
            timestamp,
            is_error: false,
            outcome: Outcome::NoEvidence,
            model: None,
        }
    }

    pub fn failed(
        query: impl Into<String>,
        message: &str,
        sources: Vec<SearchResult>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            query: query.into(),
            answer: message.to_string(),
            sources,
            timestamp,
            is_error: true,
            outcome: Outcome::Failed,
            model: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = Query::new("q").with_model("mistral").with_limit(3);
        assert_eq!(query.model.as_deref(), Some("mistral"));
        assert_eq!(query.limit, Some(3));
    }

    #[test]
    fn test_response_json_shape() {
        let response = ChatResponse::no_evidence("q", Utc::now());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["outcome"], "no_evidence");
        assert_eq!(value["isError"], false);
        assert_eq!(value["answer"], MSG_NO_RESULTS);
        assert!(value.get("model").is_none());
    }

    #[test]
    fn test_failed_keeps_sources() {
        let sources = vec![SearchResult::default()];
        let response = ChatResponse::failed("q", MSG_GENERATION_FAILED, sources, Utc::now());
        assert!(response.is_error);
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.outcome, Outcome::Failed);
    }
}
