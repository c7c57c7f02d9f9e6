//! OpenAI-compatible chat provider.
//!
//! Works against LiteLLM, OpenAI and Ollama's `/v1` compatibility layer.

use crate::client::{ChatClient, CorrelationHeaders};
use crate::transport::GatewayTransport;
use crate::types::{ChatRequest, ChatResponse};
use toolrag_core::{AppError, AppResult};
use tracing::instrument;

/// Default chat completions path.
pub const DEFAULT_CHAT_PATH: &str = "/v1/chat/completions";

/// Chat client for an OpenAI-compatible gateway.
#[derive(Debug, Clone)]
pub struct GatewayChatClient {
    provider: String,
    transport: GatewayTransport,
    chat_path: String,
}

impl GatewayChatClient {
    pub fn new(provider: impl Into<String>, transport: GatewayTransport) -> Self {
        Self {
            provider: provider.into(),
            transport,
            chat_path: DEFAULT_CHAT_PATH.to_string(),
        }
    }

    /// Override the chat completions path.
    pub fn with_chat_path(mut self, chat_path: impl Into<String>) -> Self {
        self.chat_path = chat_path.into();
        self
    }

    pub fn chat_url(&self) -> String {
        self.transport.url(&self.chat_path)
    }
}

#[async_trait::async_trait]
impl ChatClient for GatewayChatClient {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    #[instrument(
        skip(self, request, headers),
        fields(provider = %self.provider, model = %request.model, request_id = %headers.request_id)
    )]
    async fn chat_completion(
        &self,
        request: &ChatRequest,
        headers: &CorrelationHeaders,
    ) -> AppResult<ChatResponse> {
        tracing::debug!(
            "Sending chat completion ({} messages, {} tools)",
            request.messages.len(),
            request.tools.len()
        );

        let response: ChatResponse = self
            .transport
            .post_json(&self.chat_path, request, &headers.to_pairs())
            .await?;

        if response.choices.is_empty() {
            return Err(AppError::Provider(
                "Missing 'choices' in chat completion response".to_string(),
            ));
        }

        tracing::debug!(
            "Received chat completion (model: {:?}, usage: {:?})",
            response.model,
            response.usage
        );

        Ok(response)
    }
}
