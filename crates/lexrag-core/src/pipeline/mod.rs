//! Query pipeline
//!
//! Embeds a question, retrieves the nearest legal passages, assembles them
//! into a context block, renders the prompt and asks the model. The outcome
//! is always a [`ChatResponse`]; only cancellation surfaces as an error.

mod orchestrator;
mod status;
mod types;

pub use orchestrator::{PipelineOptions, QueryPipeline};
pub use status::ServiceStatus;
pub use types::{
    ChatResponse, Outcome, Query, Stage, MSG_COULD_NOT_PROCESS, MSG_GENERATION_FAILED,
    MSG_NO_RESULTS, MSG_UNEXPECTED,
};
