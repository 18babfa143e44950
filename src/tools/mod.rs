//! Tool abstractions, the per-agent registry and the MCP-backed map toolset

pub mod function_factory;
pub mod mcp;
pub mod tool;

pub use function_factory::FunctionFactory;
pub use mcp::{McpServerConfig, McpTool, McpToolset};
pub use tool::{Tool, ToolFuture, ToolRegistry};
