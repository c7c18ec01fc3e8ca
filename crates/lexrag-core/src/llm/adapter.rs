//! Model adapter over a local Ollama runtime

use super::client::{GenerateOptions, GenerateRequest, MetricsSnapshot, OllamaClient};
use super::gate::AdmissionGate;
use super::{ModelAdapter, ModelOptions, ModelResponse};
use crate::cancel::{cancellable, CancellationToken};
use crate::config::ModelServiceConfig;
use crate::error::{LexRagError, Result};
use async_trait::async_trait;

/// [`ModelAdapter`] for Ollama, admitting calls through an [`AdmissionGate`]
pub struct OllamaAdapter {
    client: OllamaClient,
    gate: AdmissionGate,
}

impl OllamaAdapter {
    pub fn new(client: OllamaClient, gate: AdmissionGate) -> Self {
        Self { client, gate }
    }

    /// Create from configuration with a gate sized by `max_concurrency`
    pub fn from_config(config: ModelServiceConfig) -> Result<Self> {
        let gate = AdmissionGate::new(config.max_concurrency);
        Ok(Self::new(OllamaClient::new(config)?, gate))
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Options seeded from configuration, model left blank
    pub fn default_options(&self) -> ModelOptions {
        let config = self.client.config();
        ModelOptions {
            model: String::new(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl ModelAdapter for OllamaAdapter {
    async fn generate(
        &self,
        prompt: &str,
        options: &ModelOptions,
        cancel: &CancellationToken,
    ) -> Result<ModelResponse> {
        let _permit = self.gate.acquire(cancel).await?;

        let model = options
            .resolved_model(&self.client.config().default_model)
            .to_string();
        let request = GenerateRequest {
            model: model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: Some(GenerateOptions {
                num_predict: options.max_tokens,
                temperature: options.temperature,
            }),
        };

        tracing::debug!("Generating with {} ({} prompt chars)", model, prompt.len());

        match cancellable(cancel, self.client.generate(&request)).await {
            Ok((decoded, raw)) => match decoded.response {
                Some(text) if !text.trim().is_empty() => Ok(ModelResponse {
                    text,
                    model: decoded.model.unwrap_or(model),
                    tokens_in: decoded.prompt_eval_count,
                    tokens_out: decoded.eval_count,
                    raw: Some(raw),
                }),
                _ => {
                    tracing::warn!("Model {} returned no output", model);
                    Ok(ModelResponse {
                        raw: Some(raw),
                        ..ModelResponse::no_output(model)
                    })
                }
            },
            Err(LexRagError::Cancelled) => Err(LexRagError::Cancelled),
            Err(e) => {
                tracing::error!("Generation with {} failed: {}", model, e);
                Ok(ModelResponse::adapter_error(model, e))
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        self.client.list_models().await
    }

    fn default_model(&self) -> &str {
        &self.client.config().default_model
    }

    fn metrics(&self) -> Option<MetricsSnapshot> {
        Some(self.client.metrics())
    }
}
