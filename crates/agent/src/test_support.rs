//! Shared mock provider and tools for agent tests.

use async_trait::async_trait;
use ragweed_core::error::{ProviderError, ToolError};
use ragweed_core::message::{AssistantMessage, ToolCall};
use ragweed_core::provider::{ChatRequest, ChatResponse, Provider, Usage};
use ragweed_core::tool::{Tool, ToolOutput};
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Replays a scripted sequence of assistant messages; errors once the
/// script runs out.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<AssistantMessage>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<AssistantMessage>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    pub fn text(content: &str) -> AssistantMessage {
        AssistantMessage {
            content: content.into(),
            tool_calls: vec![],
        }
    }

    pub fn tool_request(calls: Vec<ToolCall>) -> AssistantMessage {
        AssistantMessage {
            content: String::new(),
            tool_calls: calls,
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let message = self
            .responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| ProviderError::NotConfigured("script exhausted".into()))?;
        Ok(ChatResponse {
            message,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "scripted-model".into(),
        })
    }
}

/// Echoes the query argument back as "result-<query>".
pub struct EchoSearchTool;

#[async_trait]
impl Tool for EchoSearchTool {
    fn name(&self) -> &str {
        "search"
    }
    fn description(&self) -> &str {
        "Echo search"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {"query": {"type": "string"}}})
    }
    async fn invoke(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolOutput, ToolError> {
        let query = arguments.get("query").and_then(|v| v.as_str()).unwrap_or("");
        Ok(ToolOutput::text(format!("result-{query}")))
    }
}

/// Always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "broken"
    }
    fn description(&self) -> &str {
        "Always fails"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }
    async fn invoke(
        &self,
        _arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolOutput, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "broken".into(),
            reason: "upstream unavailable".into(),
        })
    }
}

/// A tool call against the echo search tool.
pub fn search_call(query: &str) -> ToolCall {
    let mut args = serde_json::Map::new();
    args.insert("query".into(), serde_json::json!(query));
    ToolCall {
        id: Some(format!("call_{query}")),
        tool_name: "search".into(),
        arguments: args,
    }
}
