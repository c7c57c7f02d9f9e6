use crate::agent::{ToolAugmentedAgent, AGENT_SYSTEM_PROMPT};
use crate::default_registry;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use toolrag_core::config::GenerationConfig;
use toolrag_core::{AppError, AppResult};
use toolrag_llm::{
    ChatClient, ChatMessage, ChatRequest, ChatResponse, Choice, CorrelationHeaders, Role,
    ToolChoice, Usage,
};

/// Replays canned responses and records what it was sent.
#[derive(Default)]
struct ScriptedChat {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<(ChatRequest, CorrelationHeaders)>>,
}

impl ScriptedChat {
    fn new(responses: Vec<ChatResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<(ChatRequest, CorrelationHeaders)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatClient for ScriptedChat {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn chat_completion(
        &self,
        request: &ChatRequest,
        headers: &CorrelationHeaders,
    ) -> AppResult<ChatResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), headers.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Provider("script exhausted".to_string()))
    }
}

fn reply(model: Option<&str>, message: ChatMessage, usage: Option<Usage>) -> ChatResponse {
    ChatResponse {
        model: model.map(str::to_string),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: None,
        }],
        usage,
    }
}

fn tool_call_reply(calls: Vec<toolrag_llm::ToolCall>) -> ChatResponse {
    let mut message = ChatMessage::assistant("");
    message.content = None;
    message.tool_calls = calls;
    reply(Some("gpt-4o-mini"), message, None)
}

fn settings() -> GenerationConfig {
    GenerationConfig {
        model: "configured-model".to_string(),
        temperature: 0.2,
        max_tokens: 256,
    }
}

fn agent(chat: Arc<ScriptedChat>) -> ToolAugmentedAgent {
    ToolAugmentedAgent::new(chat, Arc::new(default_registry(None).unwrap()), settings())
}

#[tokio::test]
async fn test_direct_answer_uses_one_call() {
    let chat = ScriptedChat::new(vec![reply(
        Some("gpt-4o-mini-2024"),
        ChatMessage::assistant("Hello!"),
        Some(Usage {
            prompt_tokens: Some(12),
            completion_tokens: Some(3),
            total_tokens: Some(15),
        }),
    )]);

    let response = agent(chat.clone()).run("hi", Some("req-1"), &[]).await.unwrap();

    assert_eq!(response.answer, "Hello!");
    assert_eq!(response.request_id, "req-1");
    assert_eq!(response.model, "gpt-4o-mini-2024");
    assert_eq!(response.usage.total_tokens, Some(15));

    let requests = chat.requests();
    assert_eq!(requests.len(), 1);
    let (request, headers) = &requests[0];
    assert_eq!(request.model, "configured-model");
    assert_eq!(request.temperature, Some(0.2));
    assert_eq!(request.max_tokens, Some(256));
    assert_eq!(request.tool_choice, Some(ToolChoice::Auto));
    assert_eq!(request.tools.len(), 2);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].content_text(), AGENT_SYSTEM_PROMPT);
    assert_eq!(request.messages[1].role, Role::User);
    assert_eq!(headers.to_pairs().len(), 1);
}

#[tokio::test]
async fn test_tool_call_round_trip() {
    let chat = ScriptedChat::new(vec![
        tool_call_reply(vec![toolrag_llm::ToolCall::new(
            "call_1",
            "getServiceHealth",
            r#"{"serviceName":"billing"}"#,
        )]),
        reply(
            Some("gpt-4o-mini"),
            ChatMessage::assistant("Billing is UP with 120ms latency."),
            None,
        ),
    ]);

    let chunk_ids = vec!["faq_chunk_0".to_string(), "faq_chunk_2".to_string()];
    let response = agent(chat.clone())
        .run("Is billing healthy?", Some("req-2"), &chunk_ids)
        .await
        .unwrap();

    assert_eq!(response.answer, "Billing is UP with 120ms latency.");
    assert_eq!(response.usage.prompt_tokens, None);

    let requests = chat.requests();
    assert_eq!(requests.len(), 2);

    let (second, headers) = &requests[1];
    let roles: Vec<Role> = second.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::Tool]);
    assert_eq!(second.messages[2].tool_calls[0].id, "call_1");
    assert_eq!(second.messages[3].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(
        second.messages[3].content_text(),
        "Service billing is UP. Latency 120ms."
    );
    assert_eq!(second.tools.len(), 2);

    assert_eq!(headers.request_id, "req-2");
    assert_eq!(headers.to_pairs()[1].1, "faq_chunk_0,faq_chunk_2");
    assert_eq!(requests[0].1, requests[1].1);
}

#[tokio::test]
async fn test_unknown_tool_aborts_before_second_call() {
    let chat = ScriptedChat::new(vec![
        tool_call_reply(vec![toolrag_llm::ToolCall::new("call_1", "launchRocket", "{}")]),
        reply(None, ChatMessage::assistant("unreachable"), None),
    ]);

    let err = agent(chat.clone()).run("go", None, &[]).await.unwrap_err();
    match err {
        AppError::UnknownTool(name) => assert_eq!(name, "launchRocket"),
        other => panic!("Expected unknown tool, got {:?}", other),
    }
    assert_eq!(chat.requests().len(), 1);
}

#[tokio::test]
async fn test_malformed_arguments_degrade_to_empty() {
    let chat = ScriptedChat::new(vec![
        tool_call_reply(vec![
            toolrag_llm::ToolCall::new("call_1", "getTime", "{oops"),
            toolrag_llm::ToolCall::new("call_2", "getServiceHealth", "not json"),
        ]),
        reply(None, ChatMessage::assistant("done"), None),
    ]);

    let response = agent(chat.clone()).run("time?", None, &[]).await.unwrap();
    assert_eq!(response.answer, "done");
    assert_eq!(response.model, "configured-model");

    let requests = chat.requests();
    let messages = &requests[1].0.messages;
    assert_eq!(messages.len(), 5);
    assert!(messages[3].content_text().contains("\"now\""));
    // getServiceHealth without serviceName fails and the failure is fed back
    assert!(messages[4].content_text().starts_with("Error:"));
    assert_eq!(messages[4].tool_call_id.as_deref(), Some("call_2"));
}

#[tokio::test]
async fn test_second_round_tool_calls_not_executed() {
    let chat = ScriptedChat::new(vec![
        tool_call_reply(vec![toolrag_llm::ToolCall::new("call_1", "getTime", "")]),
        tool_call_reply(vec![toolrag_llm::ToolCall::new("call_2", "getTime", "")]),
    ]);

    let response = agent(chat.clone()).run("time?", None, &[]).await.unwrap();
    assert_eq!(response.answer, "");
    assert_eq!(chat.requests().len(), 2);
}

#[tokio::test]
async fn test_blank_correlation_id_generates_uuid() {
    let chat = ScriptedChat::new(vec![reply(None, ChatMessage::assistant("ok"), None)]);
    let response = agent(chat).run("hi", Some("  "), &[]).await.unwrap();
    assert_eq!(response.request_id.len(), 36);
    assert_ne!(response.request_id.trim(), "");
}

#[tokio::test]
async fn test_provider_failure_is_fatal() {
    let chat = ScriptedChat::new(Vec::new());
    assert!(matches!(
        agent(chat).run("hi", None, &[]).await,
        Err(AppError::Provider(_))
    ));
}
