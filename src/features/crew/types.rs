//! Records for LLM models, MCP tools, agents and the agent-tool bindings.
//!
//! Read-only counters and timestamps default when absent so list pages with
//! trimmed serializers still decode.

use crate::features::rbac::types::null_as_empty;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Openai,
    Anthropic,
    AzureOpenai,
    Ollama,
    Huggingface,
    Google,
    Cohere,
    Custom,
}

/// Model configuration. The API key is write-only and never comes back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LlmModel {
    pub id: i64,
    pub name: String,
    pub provider: LlmProvider,
    #[serde(default)]
    pub provider_display: Option<String>,
    pub model_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub langchain_class: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub extra_kwargs: Option<Value>,
    #[serde(default)]
    pub model_kwargs: Option<Value>,
    #[serde(default)]
    pub model_info: Option<Value>,
    #[serde(default)]
    pub last_validated: Option<String>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub validation_error: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn expose_optional<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Body for creating, replacing or testing a model. Unset fields are left
/// out, so the same type works as a `PATCH` body.
#[derive(Default, Serialize)]
pub struct LlmModelPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<LlmProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub langchain_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_optional"
    )]
    pub api_key: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_kwargs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl std::fmt::Debug for LlmModelPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmModelPayload")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("model_name", &self.model_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

/// Answer of `POST /llm-models/test_connection/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTest {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub available_models: Vec<Value>,
}

/// Answer of `POST /llm-models/{id}/validate_connection/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelValidation {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub last_validated: Option<String>,
    #[serde(default)]
    pub validation_error: Option<String>,
}

/// Answer of `POST /llm-models/batch_validate/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchValidation {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub available: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub details: Vec<Value>,
}

/// Entry of `GET /llm-models/available/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableModel {
    pub id: i64,
    pub name: String,
    pub provider: LlmProvider,
    pub model_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_available: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    Stdio,
    Sse,
    Http,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub server_type: ServerType,
    #[serde(default)]
    pub connection_config: Option<Value>,
    #[serde(default)]
    pub tool_schema: Option<Value>,
    #[serde(default)]
    pub status: ToolStatus,
    #[serde(default)]
    pub last_health_check: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub response_time_ms: Option<f64>,
    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub success_calls: u64,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub available_tools: Option<Value>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct McpToolPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_type: Option<ServerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Answer of `POST /mcp-tools/{id}/health-check/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub status: Option<ToolStatus>,
    #[serde(default)]
    pub last_health_check: Option<String>,
    #[serde(default)]
    pub response_time_ms: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ToolCall {
    pub tool_name: String,
    pub arguments: Value,
}

/// Answer of `POST /mcp-tools/{id}/call_tool/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Short record of the `healthy/`, `public/` and `active/` listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub display_info: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Inactive,
    Active,
    Running,
    Paused,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
    #[serde(default)]
    pub llm_model: Option<i64>,
    #[serde(default)]
    pub llm_model_info: Option<AvailableModel>,
    #[serde(default)]
    pub function_calling_llm: Option<i64>,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub completed_tasks: u64,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub last_execution: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub bound_tools_count: Option<u64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_public: bool,
    /// Owner's username.
    #[serde(default)]
    pub owner_info: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AgentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calling_llm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Answer of the start, stop, pause and resume actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<AgentStatus>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TaskRequest {
    pub task_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Answer of `POST /crewai-agents/{id}/execute_task/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub status: Option<AgentStatus>,
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub completed_tasks: u64,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    #[default]
    Read,
    Write,
    Execute,
    Admin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingStatus {
    #[default]
    Active,
    Inactive,
    Error,
    Deprecated,
}

/// One agent-tool link from `/agent-tool-relations/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolBinding {
    pub id: i64,
    pub agent: i64,
    pub tool: i64,
    #[serde(default)]
    pub agent_info: Option<Summary>,
    #[serde(default)]
    pub tool_info: Option<Summary>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(default)]
    pub config_override: Option<Value>,
    #[serde(default)]
    pub permission_level: PermissionLevel,
    #[serde(default)]
    pub status: BindingStatus,
    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub successful_calls: u64,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub last_used: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ToolBindingPayload {
    pub agent: i64,
    pub tool: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_level: Option<PermissionLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_override: Option<Value>,
}

/// Body of `POST /crewai-agents/{id}/bind_tools/`.
#[derive(Clone, Debug, Serialize)]
pub struct BindTools {
    pub agent_id: i64,
    pub tool_ids: Vec<i64>,
    pub permission_level: PermissionLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_override: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BindToolsResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relations: Vec<ToolBinding>,
}

/// Answer of the binding `test_connection/`, `activate/` and `deactivate/`
/// actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BindingAction {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<BindingStatus>,
}
