//! Map toolset served by an MCP server over stdio.
//!
//! The toolset is acquired once at startup and its tools are shared by every
//! agent they are bound to. The child process lives as long as any tool
//! handle does.

use std::{collections::BTreeMap, fmt, sync::Arc};

use rmcp::{
    model::CallToolRequestParam,
    service::RunningService,
    transport::{ConfigureCommandExt, TokioChildProcess},
    RoleClient, ServiceExt,
};
use serde_json::{Map, Value};
use tokio::process::Command;
use tracing::{debug, info};

use super::tool::{Tool, ToolFuture};
use crate::error::{AgentError, Result};

type ClientHandle = RunningService<RoleClient, ()>;

/// How to launch an MCP server process
#[derive(Debug, Clone, PartialEq)]
pub struct McpServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl McpServerConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Tools discovered on one running MCP server
pub struct McpToolset {
    server: String,
    service: Arc<ClientHandle>,
    tools: Vec<Arc<dyn Tool>>,
}

impl McpToolset {
    /// Spawn the server, complete the MCP handshake and list its tools.
    pub async fn acquire(config: &McpServerConfig) -> Result<Self> {
        let args = config.args.clone();
        let env = config.env.clone();
        let transport =
            TokioChildProcess::new(Command::new(&config.command).configure(move |cmd| {
                cmd.args(&args);
                cmd.envs(&env);
            }))
            .map_err(|err| {
                AgentError::Mcp(format!(
                    "failed to spawn MCP server '{}' ({}): {}",
                    config.name, config.command, err
                ))
            })?;

        let service = ().serve(transport).await.map_err(|err| {
            AgentError::Mcp(format!(
                "failed to initialize MCP server '{}': {}",
                config.name, err
            ))
        })?;
        let service = Arc::new(service);

        let listed = service.list_all_tools().await.map_err(|err| {
            AgentError::Mcp(format!(
                "failed to list tools of MCP server '{}': {}",
                config.name, err
            ))
        })?;

        let tools: Vec<Arc<dyn Tool>> = listed
            .into_iter()
            .map(|tool| {
                Arc::new(McpTool {
                    server: config.name.clone(),
                    name: tool.name.to_string(),
                    description: tool
                        .description
                        .map(|text| text.to_string())
                        .unwrap_or_default(),
                    input_schema: Value::Object((*tool.input_schema).clone()),
                    service: Arc::clone(&service),
                }) as Arc<dyn Tool>
            })
            .collect();

        info!(
            target: "tripagent::mcp",
            server = %config.name,
            tools = tools.len(),
            "loaded tools from MCP server"
        );

        Ok(Self {
            server: config.name.clone(),
            service,
            tools,
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Shared handles, ready to bind to agents
    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Stop the server if no tool handle is still bound to an agent.
    pub async fn shutdown(self) {
        let Self {
            server,
            service,
            tools,
        } = self;
        drop(tools);

        match Arc::try_unwrap(service) {
            Ok(service) => {
                let _ = service.cancel().await;
                debug!(target: "tripagent::mcp", %server, "MCP server stopped");
            }
            Err(_) => {
                debug!(target: "tripagent::mcp", %server, "MCP server still in use, left running");
            }
        }
    }
}

impl fmt::Debug for McpToolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpToolset")
            .field("server", &self.server)
            .field("tools", &self.len())
            .finish()
    }
}

/// One tool exposed by an MCP server
pub struct McpTool {
    server: String,
    name: String,
    description: String,
    input_schema: Value,
    service: Arc<ClientHandle>,
}

impl fmt::Debug for McpTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpTool")
            .field("server", &self.server)
            .field("name", &self.name)
            .finish()
    }
}

impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.input_schema.clone()
    }

    fn execute(&self, parameters: Value) -> ToolFuture<'_> {
        Box::pin(async move {
            let arguments = call_arguments(parameters)?;
            let result = self
                .service
                .call_tool(CallToolRequestParam {
                    name: self.name.clone().into(),
                    arguments,
                })
                .await
                .map_err(|err| {
                    AgentError::ToolExecution(format!("MCP tool '{}' failed: {}", self.name, err))
                })?;

            let output = result
                .content
                .iter()
                .filter_map(|content| content.as_text().map(|text| text.text.as_str()))
                .collect::<Vec<_>>()
                .join("\n");

            if result.is_error.unwrap_or(false) {
                return Err(AgentError::ToolExecution(format!(
                    "MCP tool '{}' returned error: {}",
                    self.name, output
                )));
            }

            Ok(Value::String(output))
        })
    }
}

/// MCP expects an argument object, or nothing at all.
fn call_arguments(parameters: Value) -> Result<Option<Map<String, Value>>> {
    match parameters {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(AgentError::InvalidFunctionCall(format!(
            "MCP tool arguments must be a JSON object, got {}",
            other
        ))),
    }
}
