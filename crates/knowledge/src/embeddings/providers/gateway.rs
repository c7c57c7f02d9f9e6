//! OpenAI-compatible embeddings over the model gateway.

use crate::embeddings::provider::EmbeddingProvider;
use crate::vector_index::check_dimensions;
use serde::{Deserialize, Serialize};
use toolrag_core::{AppError, AppResult};
use toolrag_llm::GatewayTransport;
use tracing::instrument;

/// Default embeddings path.
pub const DEFAULT_EMBEDDINGS_PATH: &str = "/v1/embeddings";

/// Embedding provider that POSTs `{model, input}` to the gateway and reads
/// `data[0].embedding` from the reply.
#[derive(Debug, Clone)]
pub struct GatewayEmbeddingProvider {
    provider: String,
    model: String,
    transport: GatewayTransport,
    path: String,
    dimensions: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Option<Vec<EmbeddingData>>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

impl GatewayEmbeddingProvider {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        transport: GatewayTransport,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            transport,
            path: DEFAULT_EMBEDDINGS_PATH.to_string(),
            dimensions: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Declare the expected vector length; replies of any other length are
    /// rejected with `DimensionMismatch`.
    pub fn with_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn endpoint(&self) -> String {
        self.transport.url(&self.path)
    }
}

/// Pull the first embedding out of a decoded response.
fn first_embedding(response: EmbeddingResponse, expected: Option<usize>) -> AppResult<Vec<f32>> {
    let data = response
        .data
        .ok_or_else(|| AppError::Provider("Missing 'data' in embed response".to_string()))?;

    let embedding = data
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Provider("Empty 'data' in embed response".to_string()))?
        .embedding
        .ok_or_else(|| AppError::Provider("Missing 'embedding' in embed response".to_string()))?;

    check_dimensions(expected, embedding.len())?;
    Ok(embedding)
}

#[async_trait::async_trait]
impl EmbeddingProvider for GatewayEmbeddingProvider {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(provider = %self.provider, model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response: EmbeddingResponse =
            self.transport.post_json(&self.path, &request, &[]).await?;
        let embedding = first_embedding(response, self.dimensions)?;

        tracing::debug!("Received embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}
