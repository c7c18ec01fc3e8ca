//! HTTP embedder for the sentence-transformers embedding service

use super::{Embedder, EmbeddingVector};
use crate::cancel::{cancellable, CancellationToken};
use crate::config::EmbeddingServiceConfig;
use crate::error::{LexRagError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory jobs embed a whole corpus; they get their own ceiling
const DIRECTORY_JOB_TIMEOUT: Duration = Duration::from_secs(3600);

/// Embedder backed by the `/embed` endpoint of the embedding service
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    config: EmbeddingServiceConfig,
}

/// Completion signal of a directory batch job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEmbedding {
    /// Points written by the service
    pub count: usize,
    /// File holding `[{id, vector, payload}]`
    pub embeddings_file: PathBuf,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn new(config: EmbeddingServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    async fn request_embedding(&self, text: &str) -> Result<EmbeddingVector> {
        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            embedding: Option<Vec<f32>>,
        }

        let response = self
            .http_client
            .post(self.endpoint("/embed"))
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LexRagError::EmbeddingUnavailable(format!(
                        "request timed out after {}s",
                        self.config.timeout_secs
                    ))
                } else {
                    LexRagError::EmbeddingUnavailable(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LexRagError::EmbeddingUnavailable(format!(
                "Embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            LexRagError::EmbeddingUnavailable(format!("invalid response body: {}", e))
        })?;

        match parsed.embedding {
            Some(vector) if !vector.is_empty() => {
                if vector.len() != self.config.dimensions {
                    tracing::warn!(
                        "Embedding has {} dimensions, expected {}",
                        vector.len(),
                        self.config.dimensions
                    );
                }
                Ok(vector)
            }
            _ => Err(LexRagError::EmbeddingUnavailable(
                "No embedding returned".to_string(),
            )),
        }
    }

    /// Ask the service to embed every chunk file in `input_dir`
    ///
    /// Used by the offline ingestion path only.
    pub async fn embed_directory(
        &self,
        input_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<DirectoryEmbedding> {
        #[derive(Serialize)]
        struct BatchRequest<'a> {
            input_dir: &'a str,
        }

        let input_dir = input_dir.to_str().ok_or_else(|| {
            LexRagError::InvalidInput(format!("non UTF-8 path: {}", input_dir.display()))
        })?;

        tracing::info!("Requesting directory embedding for {}", input_dir);

        cancellable(cancel, async {
            let response = self
                .http_client
                .post(self.endpoint("/embed-batch"))
                .timeout(DIRECTORY_JOB_TIMEOUT)
                .json(&BatchRequest { input_dir })
                .send()
                .await
                .map_err(|e| LexRagError::EmbeddingUnavailable(format!("request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(LexRagError::EmbeddingUnavailable(format!(
                    "Embedding batch error (HTTP {}): {}",
                    status, body
                )));
            }

            response
                .json::<DirectoryEmbedding>()
                .await
                .map_err(|e| LexRagError::EmbeddingUnavailable(format!("invalid response body: {}", e)))
        })
        .await
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str, cancel: &CancellationToken) -> Result<EmbeddingVector> {
        if text.trim().is_empty() {
            return Err(LexRagError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }
        cancellable(cancel, self.request_embedding(text)).await
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> bool {
        match self.http_client.get(self.endpoint("/")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Embedding service health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn embedder_for(url: String) -> HttpEmbedder {
        HttpEmbedder::new(EmbeddingServiceConfig {
            url,
            model: "test-model".to_string(),
            dimensions: 3,
            timeout_secs: 5,
            batch_concurrency: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_embed_posts_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/embed")
            .match_body(Matcher::Json(json!({"text": "law 123"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"embedding": [0.1, 0.2, 0.3]}).to_string())
            .create_async()
            .await;

        let embedder = embedder_for(server.url());
        let vector = embedder
            .embed("law 123", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/embed")
            .expect(0)
            .create_async()
            .await;

        let embedder = embedder_for(server.url());
        let result = embedder.embed("   \n", &CancellationToken::new()).await;

        assert!(matches!(result, Err(LexRagError::InvalidInput(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_unavailable() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embed")
            .with_status(500)
            .with_body("model not loaded")
            .create_async()
            .await;

        let embedder = embedder_for(server.url());
        let result = embedder.embed("text", &CancellationToken::new()).await;

        match result {
            Err(LexRagError::EmbeddingUnavailable(msg)) => assert!(msg.contains("500")),
            other => panic!("expected EmbeddingUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_embedding_field_is_unavailable() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let embedder = embedder_for(server.url());
        let result = embedder.embed("text", &CancellationToken::new()).await;
        assert!(matches!(result, Err(LexRagError::EmbeddingUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let embedder = embedder_for("http://127.0.0.1:1".to_string());
        let result = embedder.embed("text", &CancellationToken::new()).await;
        assert!(matches!(result, Err(LexRagError::EmbeddingUnavailable(_))));
        assert!(!embedder.health_check().await);
    }

    #[tokio::test]
    async fn test_batch_marks_failed_index() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embed")
            .match_body(Matcher::Json(json!({"text": "good"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"embedding": [1.0, 0.0, 0.0]}).to_string())
            .expect(2)
            .create_async()
            .await;
        server
            .mock("POST", "/embed")
            .match_body(Matcher::Json(json!({"text": "bad"})))
            .with_status(503)
            .create_async()
            .await;

        let embedder = embedder_for(server.url());
        let texts = vec!["good".to_string(), "bad".to_string(), "good".to_string()];
        let batch = embedder
            .embed_batch(&texts, 2, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(batch.failed_indices(), vec![1]);
        assert!(batch.vectors[0].is_some());
        assert!(batch.vectors[1].is_none());
        assert!(batch.vectors[2].is_some());
    }

    #[tokio::test]
    async fn test_embed_directory_returns_summary() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/embed-batch")
            .match_body(Matcher::Json(json!({"input_dir": "/data/chunks"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"count": 42, "embeddings_file": "/data/embeddings.json"}).to_string())
            .create_async()
            .await;

        let embedder = embedder_for(server.url());
        let summary = embedder
            .embed_directory(Path::new("/data/chunks"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.count, 42);
        assert_eq!(summary.embeddings_file, PathBuf::from("/data/embeddings.json"));
    }
}
