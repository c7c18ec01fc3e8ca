//! Context window assembly

use super::SearchResult;

/// First line of every non-empty context
pub const CONTEXT_HEADER: &str = "Passages found in the documents:";

/// Render ranked results into the block inserted into the prompt
///
/// Results keep their input order; each gets a blank line, a citation and
/// its trimmed text. An empty slice renders as an empty string.
pub fn assemble_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut context = String::with_capacity(
        CONTEXT_HEADER.len() + results.iter().map(|r| r.text.len() + 48).sum::<usize>(),
    );
    context.push_str(CONTEXT_HEADER);
    context.push('\n');

    for (i, result) in results.iter().enumerate() {
        context.push('\n');
        context.push_str(&citation_line(i + 1, result));
        context.push('\n');
        context.push_str(result.text.trim());
        context.push('\n');
    }

    context
}

/// `"{ordinal}. Law {lawNumber} Doc. {lawCode} (Year {year}):"`
pub fn citation_line(ordinal: usize, result: &SearchResult) -> String {
    format!(
        "{}. Law {} Doc. {} (Year {}):",
        ordinal, result.law_number, result.law_code, result.year
    )
}
