//! Configuration management

use crate::error::{LexRagError, Result};
use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingServiceConfig,

    /// Vector store (Qdrant) configuration
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Language model backend configuration
    #[serde(default)]
    pub model: ModelServiceConfig,

    /// Prompt template override
    #[serde(default)]
    pub prompt: PromptConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    /// Base URL of the embedding service
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Model name reported to callers
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected embedding dimensions
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Parallel requests per batch call
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            timeout_secs: default_embedding_timeout(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

fn default_embedding_url() -> String {
    std::env::var("LEXRAG_EMBEDDING_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("LEXRAG_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "paraphrase-multilingual-MiniLM-L12-v2".to_string())
}

fn default_embedding_dimensions() -> usize {
    std::env::var("LEXRAG_EMBEDDING_DIMS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(384)
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_batch_concurrency() -> usize {
    4
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Base URL of the Qdrant REST API
    #[serde(default = "default_vector_store_url")]
    pub url: String,

    /// Collection holding the document chunks
    #[serde(default = "default_collection")]
    pub collection: String,

    /// API key (optional, for authenticated deployments)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_vector_store_timeout")]
    pub timeout_secs: u64,

    /// Number of results when the caller does not ask for a count
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: default_vector_store_url(),
            collection: default_collection(),
            api_key: std::env::var("LEXRAG_QDRANT_API_KEY").ok(),
            timeout_secs: default_vector_store_timeout(),
            default_limit: default_limit(),
        }
    }
}

fn default_vector_store_url() -> String {
    std::env::var("LEXRAG_QDRANT_URL").unwrap_or_else(|_| "http://localhost:6333".to_string())
}

fn default_collection() -> String {
    std::env::var("LEXRAG_QDRANT_COLLECTION").unwrap_or_else(|_| "proiect-senat".to_string())
}

fn default_vector_store_timeout() -> u64 {
    10
}

fn default_limit() -> usize {
    5
}

/// Language model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelServiceConfig {
    /// Base URL of the Ollama-compatible backend
    #[serde(default = "default_model_url")]
    pub url: String,

    /// Model used when the request leaves the model blank
    #[serde(default = "default_model_name")]
    pub default_model: String,

    /// Maximum generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds (generation is slow on local hardware)
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,

    /// Concurrent generate calls admitted per adapter
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ModelServiceConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            default_model: default_model_name(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_model_timeout(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_model_url() -> String {
    std::env::var("LEXRAG_OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_model_name() -> String {
    std::env::var("LEXRAG_MODEL").unwrap_or_else(|_| "llama3:latest".to_string())
}

fn default_max_tokens() -> u32 {
    512
}

fn default_model_timeout() -> u64 {
    600
}

fn default_max_concurrency() -> usize {
    std::env::var("LEXRAG_MODEL_CONCURRENCY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
}

/// Prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PromptConfig {
    /// Replacement template; must contain `{context}` and `{query}`
    #[serde(default)]
    pub template: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allow cross-origin requests
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Per-request timeout in seconds; must exceed the model timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Sources returned by /generate
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            enable_cors: true,
            request_timeout_secs: default_request_timeout(),
            max_sources: default_max_sources(),
        }
    }
}

fn default_bind() -> String {
    std::env::var("LEXRAG_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    660
}

fn default_max_sources() -> usize {
    5
}

impl Config {
    /// Load config from `LEXRAG_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::resolve_path())
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path honouring the `LEXRAG_CONFIG` override
    pub fn resolve_path() -> PathBuf {
        std::env::var("LEXRAG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Prompt template from config, or the built-in legal assistant template
    pub fn prompt_template(&self) -> Result<PromptTemplate> {
        match self.prompt.template {
            Some(ref template) => PromptTemplate::new(template.clone()),
            None => Ok(PromptTemplate::default()),
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("embedding.url", &self.embedding.url),
            ("vector_store.url", &self.vector_store.url),
            ("model.url", &self.model.url),
        ] {
            if url.trim().is_empty() {
                return Err(LexRagError::Config(format!("{} must not be empty", name)));
            }
        }
        if self.vector_store.collection.trim().is_empty() {
            return Err(LexRagError::Config(
                "vector_store.collection must not be empty".to_string(),
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err(LexRagError::Config(
                "embedding.dimensions must be positive".to_string(),
            ));
        }
        if self.model.max_concurrency == 0 {
            return Err(LexRagError::Config(
                "model.max_concurrency must be at least 1".to_string(),
            ));
        }
        self.prompt_template()?;
        Ok(())
    }
}
