use crate::tool::{required_str, Tool, ToolArgs};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use toolrag_core::{AppError, AppResult};
use toolrag_knowledge::RetrievalService;

const DEFAULT_TOP_K: usize = 3;

/// Lets the model search the knowledge index.
pub struct SearchKnowledgeTool {
    service: Arc<RetrievalService>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Hit<'a> {
    chunk_id: &'a str,
    document_title: &'a str,
    score: f32,
    text: &'a str,
}

impl SearchKnowledgeTool {
    pub fn new(service: Arc<RetrievalService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl Tool for SearchKnowledgeTool {
    fn name(&self) -> &str {
        "searchKnowledge"
    }

    fn description(&self) -> &str {
        "Searches the knowledge base and returns the most relevant text chunks"
    }

    fn argument_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "What to search for"},
                "topK": {"type": "integer", "description": "Maximum number of chunks to return"}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: &ToolArgs) -> AppResult<String> {
        let query = required_str(args, self.name(), "query")?;
        let top_k = match args.get("topK").and_then(Value::as_u64) {
            Some(k) if k > 0 => k as usize,
            _ => DEFAULT_TOP_K,
        };

        tracing::info!("searchKnowledge called (top_k: {})", top_k);

        let results = self.service.retrieve(query, top_k).await?;
        let hits: Vec<Hit<'_>> = results
            .iter()
            .map(|hit| Hit {
                chunk_id: &hit.record.id,
                document_title: &hit.record.payload.document_title,
                score: hit.score,
                text: &hit.record.payload.text,
            })
            .collect();

        serde_json::to_string(&hits)
            .map_err(|e| AppError::Tool(format!("Failed to serialize search results: {}", e)))
    }
}
