//! Tool abstraction.
//!
//! A tool is a named capability the model may invoke. Its arguments arrive
//! as the JSON text the model produced; [`parse_tool_arguments`] turns that
//! text into a [`ToolArgs`] map before dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolrag_core::{AppError, AppResult};
use toolrag_llm::ToolSpec;

/// Decoded tool arguments.
pub type ToolArgs = serde_json::Map<String, Value>;

/// Name, description and argument schema advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub argument_schema: Value,
}

impl ToolDefinition {
    /// Wire form for a chat request.
    pub fn to_spec(&self) -> ToolSpec {
        ToolSpec::function(
            self.name.clone(),
            self.description.clone(),
            self.argument_schema.clone(),
        )
    }
}

/// A callable tool.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model refers to
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments
    fn argument_schema(&self) -> Value;

    /// Run the tool. Errors are reported back to the model as text.
    async fn execute(&self, args: &ToolArgs) -> AppResult<String>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            argument_schema: self.argument_schema(),
        }
    }
}

/// Parse the raw argument text of a call to `tool`.
///
/// Blank text yields an empty map. Anything that is not a JSON object is
/// `AppError::MalformedToolArguments`.
pub fn parse_tool_arguments(tool: &str, raw: &str) -> AppResult<ToolArgs> {
    if raw.trim().is_empty() {
        return Ok(ToolArgs::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::MalformedToolArguments {
            tool: tool.to_string(),
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(e) => Err(AppError::MalformedToolArguments {
            tool: tool.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Fetch a required string argument.
pub fn required_str<'a>(args: &'a ToolArgs, tool: &str, key: &str) -> AppResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Tool(format!("{}: missing required '{}' argument", tool, key)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
