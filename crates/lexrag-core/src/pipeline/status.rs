//! Backend reachability report

use super::QueryPipeline;
use crate::cancel::CancellationToken;
use serde::{Deserialize, Serialize};

/// Which backends answered a probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub vector_store: bool,
    pub embedding: bool,
    pub model: bool,
    /// Models the generation backend reported
    #[serde(default)]
    pub models: Vec<String>,
}

impl ServiceStatus {
    pub fn all_ok(&self) -> bool {
        self.vector_store && self.embedding && self.model
    }
}

impl QueryPipeline {
    /// Probe all three backends concurrently
    ///
    /// The embedding service must embed a short probe text; the model backend
    /// must list at least one model.
    pub async fn check_services(&self) -> ServiceStatus {
        let probe = CancellationToken::new();
        let (vector_store, embedding, models) = tokio::join!(
            self.search_client().health_check(),
            self.embedder().embed("test", &probe),
            self.model().list_models(),
        );

        let embedding = matches!(embedding, Ok(ref v) if !v.is_empty());
        let models = models.unwrap_or_else(|e| {
            tracing::warn!("Model listing failed: {}", e);
            Vec::new()
        });

        let status = ServiceStatus {
            vector_store,
            embedding,
            model: !models.is_empty(),
            models,
        };
        tracing::info!(
            "Service status - vector store: {}, embedding: {}, model: {}",
            status.vector_store,
            status.embedding,
            status.model
        );
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ok_requires_every_backend() {
        let mut status = ServiceStatus {
            vector_store: true,
            embedding: true,
            model: true,
            models: vec!["llama3:latest".to_string()],
        };
        assert!(status.all_ok());
        status.embedding = false;
        assert!(!status.all_ok());
    }
}
