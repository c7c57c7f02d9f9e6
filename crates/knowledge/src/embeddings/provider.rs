//! Embedding provider trait and factory.

use super::providers::{GatewayEmbeddingProvider, MockProvider};
use std::sync::Arc;
use toolrag_core::config::{EmbeddingConfig, GatewayConfig};
use toolrag_core::{AppError, AppResult};

/// Vector length of the mock provider when none is configured.
pub const DEFAULT_MOCK_DIMENSIONS: usize = 384;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "litellm", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Vector length, when known ahead of the first call.
    ///
    /// A known length fixes the dimensionality of a fresh index.
    fn dimensions(&self) -> Option<usize> {
        None
    }

    /// Generate the embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider based on configuration.
///
/// `gateway` and `api_key` are only consulted by the gateway provider.
pub fn create_provider(
    config: &EmbeddingConfig,
    gateway: &GatewayConfig,
    api_key: Option<String>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "mock" => {
            let dimensions = config.dimensions.unwrap_or(DEFAULT_MOCK_DIMENSIONS);
            Ok(Arc::new(MockProvider::new(dimensions)))
        }

        "gateway" => {
            let transport = toolrag_llm::create_transport(gateway, api_key)?;
            let provider = GatewayEmbeddingProvider::new(
                gateway.provider.to_lowercase(),
                config.model.clone(),
                transport,
            )
            .with_path(gateway.embeddings_path.clone())
            .with_dimensions(config.dimensions);
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::InvalidConfiguration(format!(
            "Unknown embedding provider: '{}'. Supported providers: gateway, mock",
            config.provider
        ))),
    }
}
