//! Tool-augmented agent.
//!
//! Runs at most two chat completions per request. The first advertises every
//! registered tool; if the model asks for tools they are executed in the
//! order given and their results are sent back in a second completion whose
//! reply is final.

use crate::registry::ToolRegistry;
use crate::tool::{parse_tool_arguments, ToolArgs};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use toolrag_core::config::GenerationConfig;
use toolrag_core::{AppError, AppResult};
use toolrag_llm::{ChatClient, ChatMessage, ChatRequest, ChatResponse, CorrelationHeaders, ToolSpec};
use tracing::instrument;

/// System prompt for every agent run.
pub const AGENT_SYSTEM_PROMPT: &str =
    "You are an assistant. If a tool can answer, call the tool. If not, respond normally.";

/// Token counters reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Outcome of one agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub request_id: String,

    /// Model reported by the provider, or the configured model
    pub model: String,

    /// Milliseconds from the start of the run
    pub latency_ms: u64,

    pub usage: AgentUsage,

    pub answer: String,
}

/// Drives the ask / execute tools / ask again protocol.
pub struct ToolAugmentedAgent {
    client: Arc<dyn ChatClient>,
    registry: Arc<ToolRegistry>,
    settings: GenerationConfig,
}

impl ToolAugmentedAgent {
    pub fn new(
        client: Arc<dyn ChatClient>,
        registry: Arc<ToolRegistry>,
        settings: GenerationConfig,
    ) -> Self {
        Self {
            client,
            registry,
            settings,
        }
    }

    /// Answer `message`, calling tools when the model asks for them.
    ///
    /// `correlation_id` becomes the `x-request-id` header (a fresh UUID when
    /// absent or blank). `retrieved_chunk_ids`, when non-empty, is sent as
    /// `x-rag-chunk-ids`.
    ///
    /// # Errors
    /// Provider failures and `AppError::UnknownTool` abort the run.
    pub async fn run(
        &self,
        message: &str,
        correlation_id: Option<&str>,
        retrieved_chunk_ids: &[String],
    ) -> AppResult<AgentResponse> {
        let start = Instant::now();
        let headers = CorrelationHeaders::new(correlation_id).with_chunk_ids(retrieved_chunk_ids);
        self.run_with_headers(message, &headers, start).await
    }

    #[instrument(skip(self, message, headers, start), fields(request_id = %headers.request_id))]
    async fn run_with_headers(
        &self,
        message: &str,
        headers: &CorrelationHeaders,
        start: Instant,
    ) -> AppResult<AgentResponse> {
        let tools: Vec<ToolSpec> = self
            .registry
            .definitions()
            .iter()
            .map(|definition| definition.to_spec())
            .collect();

        let mut messages = vec![
            ChatMessage::system(AGENT_SYSTEM_PROMPT),
            ChatMessage::user(message),
        ];

        let first = self
            .client
            .chat_completion(&self.request(&messages, &tools), headers)
            .await?;

        let assistant = match first.message() {
            Some(message) if !message.tool_calls.is_empty() => message.clone(),
            _ => return Ok(self.finish(&first, headers, start)),
        };

        let calls = assistant.tool_calls.clone();
        messages.push(assistant);

        for call in &calls {
            let name = call.function.name.as_str();
            let args = match parse_tool_arguments(name, &call.function.arguments) {
                Ok(args) => args,
                Err(e) => {
                    tracing::warn!("{}; continuing with empty arguments", e);
                    ToolArgs::new()
                }
            };

            let tool = self
                .registry
                .get(name)
                .ok_or_else(|| AppError::UnknownTool(name.to_string()))?;

            tracing::info!(
                tool = name,
                args = %serde_json::Value::Object(args.clone()),
                "tool_call"
            );

            let result = match tool.execute(&args).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(tool = name, "Tool failed: {}", e);
                    format!("Error: {}", e)
                }
            };

            messages.push(ChatMessage::tool_result(call.id.clone(), result));
        }

        let second = self
            .client
            .chat_completion(&self.request(&messages, &tools), headers)
            .await?;

        if let Some(reply) = second.message() {
            if !reply.tool_calls.is_empty() {
                tracing::warn!(
                    "Ignoring {} tool calls requested after tool results",
                    reply.tool_calls.len()
                );
            }
        }

        Ok(self.finish(&second, headers, start))
    }

    fn request(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> ChatRequest {
        ChatRequest::new(self.settings.model.clone(), messages.to_vec())
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_tools(tools.to_vec())
    }

    fn finish(
        &self,
        response: &ChatResponse,
        headers: &CorrelationHeaders,
        start: Instant,
    ) -> AgentResponse {
        let model = response
            .model
            .clone()
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| self.settings.model.clone());
        let answer = response
            .message()
            .map(|message| message.content_text().to_string())
            .unwrap_or_default();
        let usage = response
            .usage
            .map(|usage| AgentUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            })
            .unwrap_or_default();
        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            request_id = %headers.request_id,
            model = %model,
            latency_ms,
            prompt_tokens = ?usage.prompt_tokens,
            completion_tokens = ?usage.completion_tokens,
            total_tokens = ?usage.total_tokens,
            "agent_done"
        );

        AgentResponse {
            request_id: headers.request_id.clone(),
            model,
            latency_ms,
            usage,
            answer,
        }
    }
}
