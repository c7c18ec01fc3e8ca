//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use lexrag_core::{ChatResponse, SearchResult};

/// Format options
pub struct FormatOptions {
    pub full: bool,
}

/// Format search results
pub fn format_search_results(
    results: &[SearchResult],
    format: OutputFormat,
    options: &FormatOptions,
) -> String {
    match format {
        OutputFormat::Json => json::format_results(results),
        OutputFormat::Cli => terminal::format_results(results, options),
    }
}

/// Format a pipeline answer
pub fn format_answer(response: &ChatResponse, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)? + "\n"),
        OutputFormat::Cli => Ok(terminal::format_answer(response)),
    }
}
