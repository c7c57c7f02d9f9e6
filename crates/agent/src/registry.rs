//! Fixed set of tools, resolved by name.

use crate::tool::{Tool, ToolDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use toolrag_core::{AppError, AppResult};

/// Immutable name-to-tool map.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

impl ToolRegistry {
    /// Build the registry.
    ///
    /// # Errors
    /// Returns `AppError::InvalidConfiguration` if two tools share a name.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> AppResult<Self> {
        let mut map = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name().to_string();
            if map.contains_key(&name) {
                return Err(AppError::InvalidConfiguration(format!(
                    "Duplicate tool name: {}",
                    name
                )));
            }
            map.insert(name, tool);
        }

        tracing::debug!("Registered {} tools", map.len());
        Ok(Self { tools: map })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions of every tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.values().map(|tool| tool.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
