//! End-to-end question answering over retrieved legal passages

use super::types::{
    ChatResponse, Query, Stage, MSG_COULD_NOT_PROCESS, MSG_GENERATION_FAILED, MSG_UNEXPECTED,
};
use crate::cancel::{cancellable, CancellationToken};
use crate::config::Config;
use crate::error::{LexRagError, Result};
use crate::llm::{Embedder, HttpEmbedder, ModelAdapter, ModelOptions, OllamaAdapter};
use crate::prompt::PromptTemplate;
use crate::search::{assemble_context, QdrantClient, SearchClient, SearchResult};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Per-pipeline generation and retrieval defaults
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Results retrieved when the query does not override it
    pub default_limit: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_tokens: 512,
            temperature: 0.0,
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_limit: config.vector_store.default_limit,
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
        }
    }
}

/// Composes embedding, search, context assembly, prompting and generation
///
/// Each call is independent; the only state shared between concurrent calls
/// is whatever the injected backends hold (the model adapter's admission
/// gate in practice).
#[derive(Clone)]
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    search: Arc<dyn SearchClient>,
    model: Arc<dyn ModelAdapter>,
    template: PromptTemplate,
    options: PipelineOptions,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        search: Arc<dyn SearchClient>,
        model: Arc<dyn ModelAdapter>,
    ) -> Self {
        Self {
            embedder,
            search,
            model,
            template: PromptTemplate::default(),
            options: PipelineOptions::default(),
        }
    }

    /// Wire the HTTP backends described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = HttpEmbedder::new(config.embedding.clone())?;
        let search = QdrantClient::new(config.vector_store.clone())?;
        let model = OllamaAdapter::from_config(config.model.clone())?;

        Ok(Self::new(Arc::new(embedder), Arc::new(search), Arc::new(model))
            .with_template(config.prompt_template()?)
            .with_options(PipelineOptions::from(config)))
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn search_client(&self) -> &Arc<dyn SearchClient> {
        &self.search
    }

    pub fn model(&self) -> &Arc<dyn ModelAdapter> {
        &self.model
    }

    /// Answer one question
    ///
    /// Every failure except cancellation comes back as an `Ok` response with
    /// `is_error` set and a generic message; details are only logged.
    pub async fn ask(&self, query: Query, cancel: &CancellationToken) -> Result<ChatResponse> {
        let started = Utc::now();
        let text = query.text.clone();

        match AssertUnwindSafe(self.run(query, started, cancel))
            .catch_unwind()
            .await
        {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(LexRagError::Cancelled)) => {
                tracing::info!("Query cancelled");
                Err(LexRagError::Cancelled)
            }
            Ok(Err(e)) => {
                tracing::error!("Query pipeline failed: {}", e);
                Ok(ChatResponse::failed(text, MSG_UNEXPECTED, Vec::new(), started))
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("Query pipeline panicked: {}", detail);
                Ok(ChatResponse::failed(text, MSG_UNEXPECTED, Vec::new(), started))
            }
        }
    }

    async fn run(
        &self,
        query: Query,
        started: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse> {
        let mut stage = Stage::Start;

        if query.text.trim().is_empty() {
            advance(&mut stage, Stage::Failed);
            return Ok(ChatResponse::failed(
                query.text,
                MSG_COULD_NOT_PROCESS,
                Vec::new(),
                started,
            ));
        }

        advance(&mut stage, Stage::Embedding);
        let vector = match cancellable(cancel, self.embedder.embed(&query.text, cancel)).await {
            Ok(vector) if !vector.is_empty() => vector,
            Ok(_) => {
                tracing::warn!("Embedding service returned an empty vector");
                advance(&mut stage, Stage::Failed);
                return Ok(ChatResponse::failed(
                    query.text,
                    MSG_COULD_NOT_PROCESS,
                    Vec::new(),
                    started,
                ));
            }
            Err(LexRagError::Cancelled) => return Err(LexRagError::Cancelled),
            Err(e) => {
                tracing::warn!("Embedding failed: {}", e);
                advance(&mut stage, Stage::Failed);
                return Ok(ChatResponse::failed(
                    query.text,
                    MSG_COULD_NOT_PROCESS,
                    Vec::new(),
                    started,
                ));
            }
        };

        advance(&mut stage, Stage::Searching);
        let limit = query.limit.unwrap_or(self.options.default_limit);
        let results = self.search_vector(&vector, limit, cancel).await?;
        if results.is_empty() {
            advance(&mut stage, Stage::Done);
            return Ok(ChatResponse::no_evidence(query.text, started));
        }

        advance(&mut stage, Stage::Assembling);
        let context = assemble_context(&results);

        advance(&mut stage, Stage::Prompting);
        let prompt = self.template.build(&query.text, &context);
        tracing::debug!("Prompt built ({} chars, {} sources)", prompt.len(), results.len());

        advance(&mut stage, Stage::Generating);
        let options = ModelOptions {
            model: query.model.clone().unwrap_or_default(),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };
        let response =
            match cancellable(cancel, self.model.generate(&prompt, &options, cancel)).await {
                Ok(response) => response,
                Err(LexRagError::Cancelled) => return Err(LexRagError::Cancelled),
                Err(e) => {
                    tracing::error!("Generation failed: {}", e);
                    advance(&mut stage, Stage::Failed);
                    return Ok(ChatResponse::failed(
                        query.text,
                        MSG_GENERATION_FAILED,
                        results,
                        started,
                    ));
                }
            };

        if !response.is_usable() {
            tracing::error!("Model {} gave no usable answer: {}", response.model, response.text);
            advance(&mut stage, Stage::Failed);
            return Ok(ChatResponse::failed(
                query.text,
                MSG_GENERATION_FAILED,
                results,
                started,
            ));
        }

        advance(&mut stage, Stage::Done);
        Ok(ChatResponse::answered(
            query.text,
            response.text,
            results,
            response.model,
            started,
        ))
    }

    /// Embed a question and return its nearest passages
    ///
    /// Unlike [`QueryPipeline::ask`], embedding failures are returned as errors.
    pub async fn retrieve(
        &self,
        text: &str,
        limit: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        if text.trim().is_empty() {
            return Err(LexRagError::InvalidInput(
                "query text must not be empty".to_string(),
            ));
        }
        let vector = cancellable(cancel, self.embedder.embed(text, cancel)).await?;
        if vector.is_empty() {
            return Err(LexRagError::EmbeddingUnavailable(
                "No embedding returned".to_string(),
            ));
        }
        self.search_vector(&vector, limit.unwrap_or(self.options.default_limit), cancel)
            .await
    }

    /// Search with a precomputed vector
    ///
    /// A search backend that errors is treated as having found nothing.
    pub async fn search_vector(
        &self,
        vector: &[f32],
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        match cancellable(cancel, self.search.search(vector, limit, cancel)).await {
            Ok(results) => Ok(results),
            Err(LexRagError::Cancelled) => Err(LexRagError::Cancelled),
            Err(e) => {
                tracing::warn!("Search failed, continuing without results: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    tracing::debug!("Pipeline stage: {} -> {}", stage, next);
    *stage = next;
}
