//! LLM trait definitions

use super::client::MetricsSnapshot;
use crate::cancel::{cancellable, CancellationToken};
use crate::error::{LexRagError, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};

/// Fixed-dimension embedding produced once per text
pub type EmbeddingVector = Vec<f32>;

/// Placeholder text when a backend answers without usable output
pub const NO_OUTPUT_PLACEHOLDER: &str = "[model returned no output]";

/// Prefix of responses built from a failed backend call
pub const ADAPTER_ERROR_PREFIX: &str = "[model adapter error]";

/// Prefixes that mark a response text as a diagnostic rather than an answer
pub const ERROR_SENTINELS: &[&str] = &[ADAPTER_ERROR_PREFIX, "Error:"];

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    ///
    /// Empty or whitespace-only text is rejected with `InvalidInput`
    /// before any request is made.
    async fn embed(&self, text: &str, cancel: &CancellationToken) -> Result<EmbeddingVector>;

    /// Generate embeddings for a batch of texts, at most `concurrency` in flight
    ///
    /// Output slot `i` belongs to input `i`. A failing item leaves its slot
    /// empty and is listed in [`BatchEmbedding::failures`]; siblings keep
    /// going. Cancellation aborts the whole batch.
    async fn embed_batch(
        &self,
        texts: &[String],
        concurrency: usize,
        cancel: &CancellationToken,
    ) -> Result<BatchEmbedding> {
        let limit = concurrency.max(1);

        let items = stream::iter(0..texts.len())
            .map(|index| {
                async move {
                    let result = cancellable(cancel, self.embed(&texts[index], cancel)).await;
                    (index, result)
                }
                .boxed()
            })
            .buffer_unordered(limit)
            .collect::<Vec<(usize, Result<EmbeddingVector>)>>();

        // Backends that never poll the token must not hold the batch open
        let results = cancellable(cancel, items.map(Ok)).await?;

        let mut batch = BatchEmbedding::with_len(texts.len());
        for (index, result) in results {
            match result {
                Ok(vector) if !vector.is_empty() => batch.vectors[index] = Some(vector),
                Ok(_) => batch.failures.push(BatchFailure {
                    index,
                    reason: "service returned an empty vector".to_string(),
                }),
                Err(LexRagError::Cancelled) => return Err(LexRagError::Cancelled),
                Err(e) => {
                    tracing::warn!("Embedding failed for batch item {}: {}", index, e);
                    batch.failures.push(BatchFailure {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }
        batch.failures.sort_by_key(|f| f.index);

        Ok(batch)
    }

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Whether the service answers at all
    async fn health_check(&self) -> bool {
        true
    }
}

/// Result of a batch embedding call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchEmbedding {
    /// One slot per input; `None` where the item failed
    pub vectors: Vec<Option<EmbeddingVector>>,
    /// Failed items in index order
    pub failures: Vec<BatchFailure>,
}

/// One failed item of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub index: usize,
    pub reason: String,
}

impl BatchEmbedding {
    pub fn with_len(len: usize) -> Self {
        Self {
            vectors: vec![None; len],
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }

    /// Dimension of the first successful vector, 0 if none succeeded
    pub fn dimensions(&self) -> usize {
        self.vectors
            .iter()
            .flatten()
            .next()
            .map(|v| v.len())
            .unwrap_or(0)
    }

    /// All vectors, or the first failure if any item failed
    pub fn into_complete(self) -> Result<Vec<EmbeddingVector>> {
        if let Some(failure) = self.failures.first() {
            return Err(LexRagError::EmbeddingUnavailable(format!(
                "batch item {} failed: {}",
                failure.index, failure.reason
            )));
        }
        Ok(self.vectors.into_iter().flatten().collect())
    }
}

/// Generation options, passed by value per call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Model identifier; blank falls back to the adapter's default
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ModelOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// The requested model, or `default` when none was given
    pub fn resolved_model<'a>(&'a self, default: &'a str) -> &'a str {
        if self.model.trim().is_empty() {
            default
        } else {
            self.model.trim()
        }
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 512,
            temperature: 0.0,
        }
    }
}

/// Normalized model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text: String,
    /// Model that actually served the call
    pub model: String,
    /// Prompt tokens, when the backend reports them
    pub tokens_in: Option<u32>,
    /// Generated tokens, when the backend reports them
    pub tokens_out: Option<u32>,
    /// Provider payload kept for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl ModelResponse {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            tokens_in: None,
            tokens_out: None,
            raw: None,
        }
    }

    /// Response for a backend that produced nothing usable
    pub fn no_output(model: impl Into<String>) -> Self {
        Self::new(NO_OUTPUT_PLACEHOLDER, model)
    }

    /// Response carrying a backend failure as a diagnostic
    pub fn adapter_error(model: impl Into<String>, diagnostic: impl std::fmt::Display) -> Self {
        Self::new(format!("{} {}", ADAPTER_ERROR_PREFIX, diagnostic), model)
    }

    /// False for empty text, the no-output placeholder and error diagnostics
    pub fn is_usable(&self) -> bool {
        let text = self.text.trim();
        !text.is_empty()
            && text != NO_OUTPUT_PLACEHOLDER
            && !ERROR_SENTINELS.iter().any(|s| text.starts_with(s))
    }
}

/// Normalized interface over language-model backends
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Generate a completion
    ///
    /// Backend failures come back as `Ok` responses whose text starts with
    /// [`ADAPTER_ERROR_PREFIX`]; only cancellation is returned as `Err`.
    async fn generate(
        &self,
        prompt: &str,
        options: &ModelOptions,
        cancel: &CancellationToken,
    ) -> Result<ModelResponse>;

    /// Generate as a finite stream of responses
    ///
    /// Backends without incremental output yield exactly one element, the
    /// result of [`ModelAdapter::generate`].
    fn stream_generate<'a>(
        &'a self,
        prompt: &'a str,
        options: &'a ModelOptions,
        cancel: &'a CancellationToken,
    ) -> BoxStream<'a, Result<ModelResponse>> {
        stream::once(self.generate(prompt, options, cancel)).boxed()
    }

    /// Model identifiers the backend can serve
    async fn list_models(&self) -> Result<Vec<String>>;

    async fn is_model_available(&self, name: &str) -> Result<bool> {
        Ok(self.list_models().await?.iter().any(|m| m == name))
    }

    /// Model used when options leave it blank
    fn default_model(&self) -> &str;

    /// Request counters, for backends that keep them
    fn metrics(&self) -> Option<MetricsSnapshot> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for EchoEmbedder {
        async fn embed(&self, text: &str, _cancel: &CancellationToken) -> Result<EmbeddingVector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.trim().is_empty() {
                return Err(LexRagError::InvalidInput("empty".into()));
            }
            if text == "down" {
                return Err(LexRagError::EmbeddingUnavailable("503".into()));
            }
            Ok(vec![text.len() as f32; 3])
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_lists_failures() {
        let embedder = EchoEmbedder {
            calls: AtomicUsize::new(0),
        };
        let texts: Vec<String> = ["a", "down", "ccc", " "]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let batch = embedder
            .embed_batch(&texts, 2, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(batch.vectors.len(), 4);
        assert_eq!(batch.vectors[0], Some(vec![1.0; 3]));
        assert_eq!(batch.vectors[1], None);
        assert_eq!(batch.vectors[2], Some(vec![3.0; 3]));
        assert_eq!(batch.vectors[3], None);
        assert_eq!(batch.failed_indices(), vec![1, 3]);
        assert_eq!(batch.dimensions(), 3);
        assert!(batch.into_complete().is_err());
    }

    struct StubbornEmbedder;

    #[async_trait]
    impl Embedder for StubbornEmbedder {
        async fn embed(&self, _text: &str, _cancel: &CancellationToken) -> Result<EmbeddingVector> {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            Ok(vec![1.0; 3])
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "stubborn"
        }
    }

    #[tokio::test]
    async fn test_batch_cancel_ignores_backend_cooperation() {
        let texts: Vec<String> = (0..4).map(|i| format!("text {}", i)).collect();
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = StubbornEmbedder.embed_batch(&texts, 1, &token).await;

        assert!(matches!(result, Err(LexRagError::Cancelled)));
        assert!(started.elapsed() < std::time::Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_batch_zero_concurrency_still_runs() {
        let embedder = EchoEmbedder {
            calls: AtomicUsize::new(0),
        };
        let texts = vec!["x".to_string(), "yy".to_string()];
        let batch = embedder
            .embed_batch(&texts, 0, &CancellationToken::new())
            .await
            .unwrap();
        assert!(batch.is_complete());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resolved_model_falls_back_on_blank() {
        let options = ModelOptions::new("  ");
        assert_eq!(options.resolved_model("llama3:latest"), "llama3:latest");
        let options = ModelOptions::new("mistral");
        assert_eq!(options.resolved_model("llama3:latest"), "mistral");
    }

    #[test]
    fn test_usable_response_detection() {
        assert!(ModelResponse::new("Law 123 regulates X.", "m").is_usable());
        assert!(!ModelResponse::new("   ", "m").is_usable());
        assert!(!ModelResponse::no_output("m").is_usable());
        assert!(!ModelResponse::adapter_error("m", "connection refused").is_usable());
        assert!(!ModelResponse::new("Error: Unable to generate response", "m").is_usable());
    }

    #[test]
    fn test_token_counts_absent_by_default() {
        let response = ModelResponse::new("text", "m");
        assert_eq!(response.tokens_in, None);
        assert_eq!(response.tokens_out, None);
    }
}
