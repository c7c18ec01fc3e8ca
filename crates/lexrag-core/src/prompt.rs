//! Prompt construction for the legal assistant

use crate::error::{LexRagError, Result};

/// Replaced by the assembled context
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Replaced by the user's question, verbatim
pub const QUERY_PLACEHOLDER: &str = "{query}";

const DEFAULT_TEMPLATE: &str = "\
You are a legal assistant specialised in the legislative documents of the Senate.
Use only the context taken from the legal documents below to answer the user's question as precisely and clearly as possible.

Context:
{context}

User question: {query}

Instructions:
- Answer in the language of the question
- Base the answer strictly on the context, without mentioning that a context was provided
- If the context does not contain enough information to answer, say so clearly
- Cite law numbers and years when referring to specific provisions
- Be concise and to the point
- Answer naturally, without mentioning that you are answering a user's question
";

/// Template with `{context}` and `{query}` placeholders
///
/// Rendering is a single left-to-right pass: text substituted for a
/// placeholder is never scanned again, so a query containing `{context}`
/// comes out literally. The query itself is not escaped or filtered, which
/// leaves the model exposed to instructions embedded in the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Validate and wrap a template; both placeholders must be present
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUERY_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(LexRagError::Config(format!(
                    "prompt template is missing the {} placeholder",
                    placeholder
                )));
            }
        }
        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Render the prompt for one question
    pub fn build(&self, query: &str, context: &str) -> String {
        let mut prompt =
            String::with_capacity(self.template.len() + query.len() + context.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            prompt.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
                prompt.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(QUERY_PLACEHOLDER) {
                prompt.push_str(query);
                rest = after;
            } else {
                prompt.push('{');
                rest = &tail[1..];
            }
        }
        prompt.push_str(rest);

        prompt
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
