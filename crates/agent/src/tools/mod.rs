//! Built-in tools.

mod knowledge;
mod service_health;
mod time;

pub use knowledge::SearchKnowledgeTool;
pub use service_health::GetServiceHealthTool;
pub use time::GetTimeTool;
