//! Lexrag Core Library
//!
//! Retrieval-augmented question answering over legal documents.
//!
//! # Features
//! - Query embedding through an external embedding service
//! - Nearest-neighbour search in a Qdrant collection
//! - Deterministic context assembly and templated prompts
//! - Ollama generation behind an injectable admission gate
//! - A cancellable query pipeline that never leaks backend failures
//! - Offline ingestion of embedded chunks

pub mod cancel;
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod search;

pub use cancel::{cancellable, CancellationToken};
pub use config::{
    Config, EmbeddingServiceConfig, ModelServiceConfig, PromptConfig, ServerConfig,
    VectorStoreConfig,
};
pub use error::{Error, ErrorKind, LexRagError, Result};
pub use ingest::{run_ingestion, IngestOptions, IngestReport};
pub use llm::{
    AdmissionGate, BatchEmbedding, BatchFailure, Embedder, EmbeddingVector, HttpEmbedder,
    ModelAdapter, ModelOptions, ModelResponse, OllamaAdapter, OllamaClient,
};
pub use pipeline::{ChatResponse, Outcome, PipelineOptions, Query, QueryPipeline, ServiceStatus};
pub use prompt::PromptTemplate;
pub use search::{assemble_context, QdrantClient, SearchClient, SearchResult};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "lexrag";
