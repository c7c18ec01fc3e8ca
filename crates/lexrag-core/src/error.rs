//! Error types for lexrag

use thiserror::Error;

/// Result type alias using LexRagError
pub type Result<T> = std::result::Result<T, LexRagError>;

/// Error type alias for convenience
pub type Error = LexRagError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const UPSTREAM_UNAVAILABLE: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const CANCELLED: i32 = 130;
}

/// Main error type for lexrag
#[derive(Debug, Error)]
pub enum LexRagError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Vector store unavailable: {0}")]
    SearchUnavailable(String),

    #[error("Model backend unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Coarse error classes used by the pipeline and the transport layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or empty request, rejected before any network call
    InvalidInput,
    /// Embedding, search or model backend unreachable or erroring
    UpstreamUnavailable,
    /// Caller-initiated cancellation
    Cancelled,
    /// Anything else (configuration, local IO, bugs)
    Internal,
}

impl LexRagError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::EmbeddingUnavailable(_)
            | Self::SearchUnavailable(_)
            | Self::ModelUnavailable(_)
            | Self::Http(_) => ErrorKind::UpstreamUnavailable,
            Self::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Internal,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidInput => exit_codes::INVALID_INPUT,
            ErrorKind::UpstreamUnavailable => exit_codes::UPSTREAM_UNAVAILABLE,
            ErrorKind::Cancelled => exit_codes::CANCELLED,
            ErrorKind::Internal => match self {
                Self::Config(_) => exit_codes::INVALID_INPUT,
                _ => exit_codes::GENERAL_ERROR,
            },
        }
    }
}
