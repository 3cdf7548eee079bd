//! Clients for the agent platform collections: LLM models, MCP tools, agents
//! and their tool bindings. CRUD goes through the shared [`Resource`]; the
//! action endpoints are typed methods on each client.

use crate::{
    errors::ClientError,
    features::{
        crew::types::{
            Agent, AgentPayload, AvailableModel, BatchValidation, BindTools, BindToolsResult,
            BindingAction, ConnectionTest, HealthCheck, LlmModel, LlmModelPayload, McpTool,
            McpToolPayload, ModelValidation, PermissionLevel, StatusChange, Summary, TaskRequest,
            TaskResult, ToolBinding, ToolBindingPayload, ToolCall, ToolCallResult,
        },
        resource::Resource,
    },
    transport::{retry_with_defaults, Transport},
};
use serde_json::Value;
use tracing::debug;

pub const LLM_MODELS_PATH: &str = "/llm-models/";
pub const MCP_TOOLS_PATH: &str = "/mcp-tools/";
pub const AGENTS_PATH: &str = "/crewai-agents/";
pub const TOOL_BINDINGS_PATH: &str = "/agent-tool-relations/";

#[derive(Clone, Debug)]
pub struct LlmModelClient {
    pub records: Resource<LlmModel, LlmModelPayload>,
}

impl LlmModelClient {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self {
            records: Resource::new(transport, LLM_MODELS_PATH),
        }
    }

    /// Checks an unsaved configuration against its provider.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn test_connection(
        &self,
        config: &LlmModelPayload,
    ) -> Result<ConnectionTest, ClientError> {
        self.records
            .collection_action_with("test_connection", config)
            .await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn validate(&self, id: i64) -> Result<ModelValidation, ClientError> {
        self.records.item_action(id, "validate_connection").await
    }

    /// Revalidates every active model.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn validate_all(&self) -> Result<BatchValidation, ClientError> {
        self.records.collection_action("batch_validate").await
    }

    /// Models currently usable by agents. Transient failures are retried.
    ///
    /// # Errors
    /// Returns the last failure once retries are exhausted.
    pub async fn available(&self) -> Result<Vec<AvailableModel>, ClientError> {
        retry_with_defaults(|| self.records.view("available")).await
    }
}

#[derive(Clone, Debug)]
pub struct McpToolClient {
    pub records: Resource<McpTool, McpToolPayload>,
}

impl McpToolClient {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self {
            records: Resource::new(transport, MCP_TOOLS_PATH),
        }
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn health_check(&self, id: i64) -> Result<HealthCheck, ClientError> {
        self.records.item_action(id, "health-check").await
    }

    /// Invokes `tool_name` on the MCP server behind tool `id`.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn call(
        &self,
        id: i64,
        tool_name: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, ClientError> {
        debug!("Calling {tool_name} on MCP tool {id}");
        let call = ToolCall {
            tool_name: tool_name.to_string(),
            arguments,
        };
        self.records.item_action_with(id, "call_tool", &call).await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn healthy(&self) -> Result<Vec<Summary>, ClientError> {
        self.records.view("healthy").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn public(&self) -> Result<Vec<Summary>, ClientError> {
        self.records.view("public").await
    }
}

#[derive(Clone, Debug)]
pub struct AgentClient {
    pub records: Resource<Agent, AgentPayload>,
}

impl AgentClient {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self {
            records: Resource::new(transport, AGENTS_PATH),
        }
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn start(&self, id: i64) -> Result<StatusChange, ClientError> {
        self.records.item_action(id, "start").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn stop(&self, id: i64) -> Result<StatusChange, ClientError> {
        self.records.item_action(id, "stop").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn pause(&self, id: i64) -> Result<StatusChange, ClientError> {
        self.records.item_action(id, "pause").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn resume(&self, id: i64) -> Result<StatusChange, ClientError> {
        self.records.item_action(id, "resume").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn execute_task(
        &self,
        id: i64,
        task: &TaskRequest,
    ) -> Result<TaskResult, ClientError> {
        self.records.item_action_with(id, "execute_task", task).await
    }

    /// Tool bindings of agent `id`.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn tools(&self, id: i64) -> Result<Vec<ToolBinding>, ClientError> {
        self.records.item_view(id, "tools").await
    }

    /// Binds every tool in `tool_ids` to agent `id` with one permission level.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn bind_tools(
        &self,
        id: i64,
        tool_ids: Vec<i64>,
        permission_level: PermissionLevel,
    ) -> Result<BindToolsResult, ClientError> {
        let body = BindTools {
            agent_id: id,
            tool_ids,
            permission_level,
            config_override: None,
        };
        self.records.item_action_with(id, "bind_tools", &body).await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn active(&self) -> Result<Vec<Summary>, ClientError> {
        self.records.view("active").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn public(&self) -> Result<Vec<Summary>, ClientError> {
        self.records.view("public").await
    }
}

#[derive(Clone, Debug)]
pub struct ToolBindingClient {
    pub records: Resource<ToolBinding, ToolBindingPayload>,
}

impl ToolBindingClient {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self {
            records: Resource::new(transport, TOOL_BINDINGS_PATH),
        }
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn test_connection(&self, id: i64) -> Result<BindingAction, ClientError> {
        self.records.item_action(id, "test_connection").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn activate(&self, id: i64) -> Result<BindingAction, ClientError> {
        self.records.item_action(id, "activate").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn deactivate(&self, id: i64) -> Result<BindingAction, ClientError> {
        self.records.item_action(id, "deactivate").await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn high_usage(&self) -> Result<Vec<ToolBinding>, ClientError> {
        self.records.view("high_usage").await
    }

    /// Bindings whose recent calls mostly failed.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn problematic(&self) -> Result<Vec<ToolBinding>, ClientError> {
        self.records.view("problematic").await
    }
}

/// Every agent platform collection behind one handle.
#[derive(Clone, Debug)]
pub struct CrewClient {
    pub models: LlmModelClient,
    pub tools: McpToolClient,
    pub agents: AgentClient,
    pub bindings: ToolBindingClient,
}

impl CrewClient {
    #[must_use]
    pub fn new(transport: &Transport) -> Self {
        Self {
            models: LlmModelClient::new(transport.clone()),
            tools: McpToolClient::new(transport.clone()),
            agents: AgentClient::new(transport.clone()),
            bindings: ToolBindingClient::new(transport.clone()),
        }
    }
}
