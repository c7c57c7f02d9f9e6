//! Generation-provider abstraction.

use crate::types::{ChatRequest, ChatResponse};
use toolrag_core::AppResult;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header listing chunk ids retrieved before the agent ran.
pub const CHUNK_IDS_HEADER: &str = "x-rag-chunk-ids";

/// Transport-level headers threaded through every provider call of one
/// request so gateway logs can be joined with ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationHeaders {
    pub request_id: String,
    pub chunk_ids: Vec<String>,
}

impl CorrelationHeaders {
    /// Use `request_id` when present and non-blank, otherwise a fresh UUID.
    pub fn new(request_id: Option<&str>) -> Self {
        let request_id = match request_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        Self {
            request_id,
            chunk_ids: Vec::new(),
        }
    }

    /// Attach the ids of externally retrieved chunks.
    pub fn with_chunk_ids(mut self, chunk_ids: &[String]) -> Self {
        self.chunk_ids = chunk_ids.to_vec();
        self
    }

    /// Header name/value pairs; the chunk-id header is omitted when empty.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(REQUEST_ID_HEADER.to_string(), self.request_id.clone())];
        if !self.chunk_ids.is_empty() {
            pairs.push((CHUNK_IDS_HEADER.to_string(), self.chunk_ids.join(",")));
        }
        pairs
    }
}

/// Trait for chat-completion providers.
///
/// Implementations send one request and return the parsed response. They do
/// not retry; any transport or status failure is an `AppError::Provider`.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Provider name (e.g., "litellm", "ollama").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming chat completion.
    async fn chat_completion(
        &self,
        request: &ChatRequest,
        headers: &CorrelationHeaders,
    ) -> AppResult<ChatResponse>;
}
