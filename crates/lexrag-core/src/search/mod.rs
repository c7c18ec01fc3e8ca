//! Search module
//!
//! Provides:
//! - Nearest-neighbour search against the Qdrant vector store
//! - Deterministic context assembly from ranked results

mod context;
mod qdrant;

pub use context::{assemble_context, citation_line, CONTEXT_HEADER};
pub use qdrant::{payload_keys, PointPayload, QdrantClient, VectorPoint};

use crate::cancel::CancellationToken;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One ranked chunk returned by the vector store
///
/// Missing payload fields decode to empty strings and zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Similarity score, higher is more relevant
    pub score: f32,
    pub text: String,
    pub year: i64,
    pub law_number: String,
    pub law_code: String,
    pub filename: String,
    pub chunk: i64,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, Score: {:.3}] {}",
            self.year, self.filename, self.score, self.text
        )
    }
}

/// Nearest-neighbour search over stored chunk vectors
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Up to `limit` results in index order (0 means the configured default)
    ///
    /// Connectivity and protocol failures yield an empty list; only
    /// cancellation is returned as an error.
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>>;

    /// Whether the store answers at all
    async fn health_check(&self) -> bool;
}
