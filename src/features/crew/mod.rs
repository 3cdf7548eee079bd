pub mod client;
pub mod types;

pub use client::{AgentClient, CrewClient, LlmModelClient, McpToolClient, ToolBindingClient};
pub use types::{Agent, AgentStatus, LlmModel, LlmProvider, McpTool, ToolBinding, ToolStatus};
