//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what the model can reach for mid-turn: web search, academic
//! search, retrieval over ingested documents. Each is invoked by name with
//! model-chosen arguments and returns text plus optional structured data.

use crate::error::ToolError;
use crate::message::ToolCall;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a tool invocation produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The text sent back to the model.
    pub text: String,

    /// Structured output for downstream consumers. A `results` array in
    /// here ends up item-by-item in `TurnResult::retrieved_chunks`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ToolOutput {
    /// Plain-text output with no structured payload.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: None,
        }
    }
}

/// The core Tool trait.
///
/// Each tool (wikipedia_search, arxiv_search, web_search, vector_retriever)
/// implements this trait. Tools are registered in the ToolRegistry and made
/// available to the turn runner. A tool that fails returns a `ToolError`;
/// the dispatcher does not catch it — tool correctness is the tool's
/// responsibility, and the error aborts the turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "web_search").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invoke the tool with the given arguments.
    async fn invoke(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<ToolOutput, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools, fixed at agent construction.
///
/// The turn runner uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Look up and invoke tools when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Invoke a tool call, resolving the tool by name.
    pub async fn invoke(&self, call: &ToolCall) -> std::result::Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(&call.tool_name)
            .ok_or_else(|| ToolError::NotFound(call.tool_name.clone()))?;
        tool.invoke(call.arguments.clone()).await
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
