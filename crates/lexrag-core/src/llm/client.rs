//! HTTP client for the Ollama generation API

use crate::config::ModelServiceConfig;
use crate::error::{LexRagError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request body of `POST /api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

/// Sampling options forwarded to the runtime
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    pub num_predict: u32,
    pub temperature: f32,
}

/// Response body of a non-streaming `POST /api/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct APIMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
}

/// Thin client over an Ollama-compatible runtime
pub struct OllamaClient {
    http_client: reqwest::Client,
    config: ModelServiceConfig,
    metrics: Arc<APIMetrics>,
}

impl OllamaClient {
    /// Create new client from configuration
    pub fn new(config: ModelServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
            metrics: Arc::new(APIMetrics::default()),
        })
    }

    pub fn config(&self) -> &ModelServiceConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Run one non-streaming generation
    ///
    /// Returns the decoded body together with the raw JSON payload. Every
    /// attempt counts towards the metrics, failed ones included.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<(GenerateResponse, serde_json::Value)> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let result = self.send_generate(request).await;

        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);
        if result.is_err() {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    async fn send_generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<(GenerateResponse, serde_json::Value)> {
        let response = self
            .http_client
            .post(self.endpoint("/api/generate"))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LexRagError::ModelUnavailable(format!(
                        "generation timed out after {}s",
                        self.config.timeout_secs
                    ))
                } else {
                    LexRagError::ModelUnavailable(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LexRagError::ModelUnavailable(format!(
                "Ollama API error (HTTP {}): {}",
                status, body
            )));
        }

        let raw: serde_json::Value = response.json().await.map_err(|e| {
            LexRagError::ModelUnavailable(format!("invalid response body: {}", e))
        })?;
        let decoded: GenerateResponse = serde_json::from_value(raw.clone())?;

        Ok((decoded, raw))
    }

    /// List model identifiers installed in the runtime
    pub async fn list_models(&self) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct TagsResponse {
            #[serde(default)]
            models: Vec<TagModel>,
        }

        #[derive(Deserialize)]
        struct TagModel {
            name: String,
        }

        let response = self
            .http_client
            .get(self.endpoint("/api/tags"))
            .send()
            .await
            .map_err(|e| LexRagError::ModelUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LexRagError::ModelUnavailable(format!(
                "failed to fetch models: HTTP {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LexRagError::ModelUnavailable(format!("invalid response body: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: String) -> OllamaClient {
        OllamaClient::new(ModelServiceConfig {
            url,
            timeout_secs: 5,
            ..ModelServiceConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_non_streaming_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3:latest",
                "prompt": "hello",
                "stream": false,
                "options": {"num_predict": 64}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "model": "llama3:latest",
                    "response": "hi",
                    "done": true,
                    "prompt_eval_count": 12,
                    "eval_count": 3
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(server.url());
        let request = GenerateRequest {
            model: "llama3:latest".to_string(),
            prompt: "hello".to_string(),
            stream: false,
            options: Some(GenerateOptions {
                num_predict: 64,
                temperature: 0.0,
            }),
        };
        let (decoded, raw) = client.generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(decoded.response.as_deref(), Some("hi"));
        assert!(decoded.done);
        assert_eq!(decoded.prompt_eval_count, Some(12));
        assert_eq!(decoded.eval_count, Some(3));
        assert_eq!(raw["model"], "llama3:latest");
        assert_eq!(client.metrics().total_requests, 1);
        assert_eq!(client.metrics().total_errors, 0);
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body("model 'nope' not found")
            .create_async()
            .await;

        let client = client_for(server.url());
        let request = GenerateRequest {
            model: "nope".to_string(),
            prompt: "hello".to_string(),
            stream: false,
            options: None,
        };

        match client.generate(&request).await {
            Err(LexRagError::ModelUnavailable(msg)) => assert!(msg.contains("not found")),
            other => panic!("expected ModelUnavailable, got {:?}", other),
        }
        assert_eq!(client.metrics().total_errors, 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_counts_as_request_and_error() {
        let client = client_for("http://127.0.0.1:9".to_string());
        let request = GenerateRequest {
            model: "llama3:latest".to_string(),
            prompt: "hello".to_string(),
            stream: false,
            options: None,
        };

        assert!(client.generate(&request).await.is_err());
        assert!(client.generate(&request).await.is_err());

        let metrics = client.metrics();
        assert_eq!(metrics.total_requests, 2);
        assert_eq!(metrics.total_errors, 2);
    }

    #[tokio::test]
    async fn test_list_models() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"models": [
                    {"name": "llama3:latest", "size": 1, "digest": "abc"},
                    {"name": "mistral:7b", "size": 2, "digest": "def"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(server.url());
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["llama3:latest", "mistral:7b"]);
    }
}
