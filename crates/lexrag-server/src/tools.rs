//! Tool manifest describing the callable endpoints

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub endpoint: ToolEndpoint,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolEndpoint {
    pub method: String,
    pub path: String,
}

fn post(path: &str) -> ToolEndpoint {
    ToolEndpoint {
        method: "POST".to_string(),
        path: path.to_string(),
    }
}

pub fn generate_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "llm_generate".to_string(),
        description: "Answer a question from the indexed legal documents".to_string(),
        endpoint: post("/generate"),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Question in natural language"
                },
                "topK": {
                    "type": "integer",
                    "description": "Passages retrieved as evidence (default: 5)",
                    "default": 5
                },
                "model": {
                    "type": "string",
                    "description": "Generation model (default: configured model)"
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn search_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "qdrant_search".to_string(),
        description: "Nearest-neighbour search over legal document chunks".to_string(),
        endpoint: post("/search"),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query_text": {
                    "type": "string",
                    "description": "Text to embed and search with"
                },
                "query_vector": {
                    "type": "array",
                    "items": {"type": "number"},
                    "description": "Precomputed query embedding"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Maximum results (default: 5)",
                    "default": 5
                }
            },
            "oneOf": [
                {"required": ["query_text"]},
                {"required": ["query_vector"]}
            ]
        }),
    }
}

pub fn embeddings_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "embedding_create".to_string(),
        description: "Embed a list of texts; failed items come back as null".to_string(),
        endpoint: post("/embeddings"),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "texts": {
                    "type": "array",
                    "items": {"type": "string"}
                },
                "model": {
                    "type": "string",
                    "description": "Informational; the embedding service decides the model"
                }
            },
            "required": ["texts"]
        }),
    }
}

pub fn all_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        search_tool_definition(),
        embeddings_tool_definition(),
        generate_tool_definition(),
    ]
}
