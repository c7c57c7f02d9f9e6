//! Tool-augmented agent for toolrag.
//!
//! A [`ToolRegistry`] holds the callable tools; the [`ToolAugmentedAgent`]
//! offers them to the model and feeds their results back.

pub mod agent;
pub mod registry;
pub mod tool;
pub mod tools;

#[cfg(test)]
mod tests;

pub use agent::{AgentResponse, AgentUsage, ToolAugmentedAgent, AGENT_SYSTEM_PROMPT};
pub use registry::ToolRegistry;
pub use tool::{parse_tool_arguments, Tool, ToolArgs, ToolDefinition};
pub use tools::{GetServiceHealthTool, GetTimeTool, SearchKnowledgeTool};

use std::sync::Arc;
use toolrag_core::AppResult;
use toolrag_knowledge::RetrievalService;

/// Registry with the built-in tools; `searchKnowledge` is included when a
/// retrieval service is supplied.
pub fn default_registry(retrieval: Option<Arc<RetrievalService>>) -> AppResult<ToolRegistry> {
    let mut tools: Vec<Arc<dyn Tool>> = vec![Arc::new(GetTimeTool), Arc::new(GetServiceHealthTool)];
    if let Some(service) = retrieval {
        tools.push(Arc::new(SearchKnowledgeTool::new(service)));
    }
    ToolRegistry::new(tools)
}
