use crate::tool::{Tool, ToolArgs};
use serde_json::{json, Value};
use toolrag_core::AppResult;

/// Reports the current server time.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetTimeTool;

#[async_trait::async_trait]
impl Tool for GetTimeTool {
    fn name(&self) -> &str {
        "getTime"
    }

    fn description(&self) -> &str {
        "Returns current server time in ISO format."
    }

    fn argument_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _args: &ToolArgs) -> AppResult<String> {
        let now = chrono::Local::now().to_rfc3339();
        Ok(json!({ "now": now }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_parseable_timestamp() {
        let output = GetTimeTool.execute(&ToolArgs::new()).await.unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        let now = value["now"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(now).is_ok());
    }
}
