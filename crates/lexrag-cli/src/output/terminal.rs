//! Terminal output formatter

use super::FormatOptions;
use lexrag_core::search::citation_line;
use lexrag_core::{ChatResponse, SearchResult};

/// Lines of passage text shown without `--full`
const PREVIEW_LINES: usize = 3;

pub fn format_results(results: &[SearchResult], options: &FormatOptions) -> String {
    let mut output = String::new();

    for (i, result) in results.iter().enumerate() {
        let score_pct = (result.score * 100.0).round() as i32;
        output.push_str(&format!(
            "{:>3}% {} [{} #{}]\n",
            score_pct,
            citation_line(i + 1, result),
            result.filename,
            result.chunk
        ));

        let text = result.text.trim();
        let total = text.lines().count();
        let shown = if options.full { total } else { PREVIEW_LINES };
        for line in text.lines().take(shown) {
            output.push_str(&format!("     {}\n", line));
        }
        if total > shown {
            output.push_str("     ...\n");
        }
    }

    output
}

pub fn format_answer(response: &ChatResponse) -> String {
    let mut output = String::new();
    output.push_str(response.answer.trim_end());
    output.push('\n');

    if !response.sources.is_empty() {
        output.push_str("\nSources:\n");
        for (i, source) in response.sources.iter().enumerate() {
            output.push_str(&format!(
                "  {} score {:.3}\n",
                citation_line(i + 1, source),
                source.score
            ));
        }
    }

    output
}
