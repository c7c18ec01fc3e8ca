use lexrag_core::{CancellationToken, Config, QueryPipeline};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Loaded configuration
    pub config: Arc<Config>,

    /// Query pipeline over the configured backends
    pub pipeline: QueryPipeline,

    /// Cancelled on shutdown; every request works under a child token
    pub shutdown: CancellationToken,

    pub started_at: Instant,
}

impl ServerState {
    /// Create state wired to the HTTP backends in `config`
    pub fn new(config: Config) -> lexrag_core::Result<Self> {
        let pipeline = QueryPipeline::from_config(&config)?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create state around an already built pipeline
    pub fn with_pipeline(config: Config, pipeline: QueryPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
            shutdown: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    /// Token for one request, cancelled together with the server
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
