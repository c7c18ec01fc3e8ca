//! Lexrag Server - HTTP API for legal question answering
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (checks every backend)
//! - `GET /models` - Models available on the generation backend
//! - `GET /tools` - Tool manifest
//! - `POST /generate` - Answer a question with cited sources
//! - `POST /search` - Search by `query_text` or `query_vector`
//! - `POST /embeddings` - Embed a list of texts
//!
//! Errors use the body `{"error": {"code": ..., "message": ...}}`.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod tools;

pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
