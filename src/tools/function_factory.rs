use super::{tool::ToolRegistry, Tool};
use crate::{AgentError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Executes tool calls by name against an agent's registry
#[derive(Debug, Default, Clone)]
pub struct FunctionFactory {
    registry: ToolRegistry,
}

impl FunctionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        self.registry.register(Arc::new(tool));
    }

    /// Register a tool that is also bound to other agents
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        self.registry.register(tool);
    }

    /// Execute a function call by name
    pub async fn execute_function(&self, function_name: &str, parameters: Value) -> Result<Value> {
        let tool = self
            .registry
            .get(function_name)
            .ok_or_else(|| AgentError::ToolNotFound(function_name.to_string()))?;

        debug!(tool = function_name, "executing tool");
        tool.execute(parameters).await
    }

    /// Get all available tools for OpenAI function calling
    pub fn get_openai_tools(&self) -> Vec<Value> {
        self.registry.to_openai_tools()
    }

    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }
}
