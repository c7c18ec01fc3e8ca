//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via the external embedding service
//! - Text generation via a local Ollama runtime, behind [`ModelAdapter`]
//! - Admission control for model calls

mod adapter;
mod client;
mod gate;
mod http_embedder;
mod traits;

pub use adapter::OllamaAdapter;
pub use client::{
    GenerateOptions, GenerateRequest, GenerateResponse, MetricsSnapshot, OllamaClient,
};
pub use gate::{AdmissionGate, AdmissionPermit};
pub use http_embedder::{DirectoryEmbedding, HttpEmbedder};
pub use traits::*;
