//! Generation-provider crate for toolrag.
//!
//! Provides the `ChatClient` abstraction used by the retrieval service and
//! the tool-augmented agent, the OpenAI-compatible wire types it speaks, and
//! the shared HTTP transport that embedding providers reuse.
//!
//! # Example
//! ```no_run
//! use toolrag_core::config::GatewayConfig;
//! use toolrag_llm::{create_client, ChatMessage, ChatRequest, CorrelationHeaders};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client(&GatewayConfig::default(), None)?;
//! let request = ChatRequest::new("gpt-4o-mini", vec![ChatMessage::user("Hello")]);
//! let response = client
//!     .chat_completion(&request, &CorrelationHeaders::new(None))
//!     .await?;
//! println!("{:?}", response.message().map(|m| m.content_text()));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod transport;
pub mod types;

pub use client::{ChatClient, CorrelationHeaders, CHUNK_IDS_HEADER, REQUEST_ID_HEADER};
pub use factory::{create_client, create_transport};
pub use providers::GatewayChatClient;
pub use transport::GatewayTransport;
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, Choice, FunctionCall, FunctionSpec, Role, ToolCall,
    ToolChoice, ToolSpec, Usage,
};
