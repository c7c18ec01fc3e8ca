//! JSON output formatter

use lexrag_core::SearchResult;

pub fn format_results(results: &[SearchResult]) -> String {
    serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string()) + "\n"
}
