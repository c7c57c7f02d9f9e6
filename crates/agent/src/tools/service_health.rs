use crate::tool::{required_str, Tool, ToolArgs};
use serde_json::{json, Value};
use toolrag_core::AppResult;

/// Canned health check for a named service.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetServiceHealthTool;

#[async_trait::async_trait]
impl Tool for GetServiceHealthTool {
    fn name(&self) -> &str {
        "getServiceHealth"
    }

    fn description(&self) -> &str {
        "Returns health status of a service"
    }

    fn argument_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "serviceName": {"type": "string", "description": "Name of service"}
            },
            "required": ["serviceName"]
        })
    }

    async fn execute(&self, args: &ToolArgs) -> AppResult<String> {
        let service = required_str(args, self.name(), "serviceName")?;

        if service.eq_ignore_ascii_case("billing") {
            return Ok("Service billing is UP. Latency 120ms.".to_string());
        }
        Ok(format!("Service {} is UNKNOWN.", service))
    }
}
