//! Message domain types.
//!
//! A `Message` is the unit that flows through a turn: the user submits one,
//! the model appends assistant messages (text or tool requests), and the
//! dispatcher appends one tool result per executed call.
//!
//! `Message` is a closed sum type rather than a struct with a role field:
//! the filter and the decomposer match on it exhaustively, so adding a new
//! message kind forces every consumer to handle it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single message in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// Text submitted by the end user.
    User(UserMessage),

    /// Produced by the model: either final text or a batch of tool requests.
    Assistant(AssistantMessage),

    /// The output of one executed tool call.
    ToolResult(ToolResultMessage),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMessage {
    pub content: String,
}

/// A model response. Per the completion contract exactly one of `content`
/// or `tool_calls` is meaningful; a message with neither is degenerate and
/// gets dropped by the filter before the next model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultMessage {
    /// Which tool call this result answers, when the model supplied an id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,

    /// Name of the tool that produced this result.
    pub tool_name: String,

    /// The textual output sent back to the model.
    pub content: String,

    /// Structured output, when the tool produced any. A `results` array in
    /// here is surfaced item-by-item as retrieved evidence by the
    /// decomposer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back on the result when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of the tool to invoke.
    pub tool_name: String,

    /// Arguments chosen by the model.
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(
        tool_name: impl Into<String>,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(UserMessage {
            content: content.into(),
        })
    }

    /// Create an assistant message carrying final text.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(AssistantMessage {
            content: content.into(),
            tool_calls: Vec::new(),
        })
    }

    /// Create an assistant message requesting tool calls.
    pub fn tool_request(tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant(AssistantMessage {
            content: String::new(),
            tool_calls,
        })
    }

    /// Create a tool result message.
    pub fn tool_result(
        call_id: Option<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
        payload: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Self {
        Self::ToolResult(ToolResultMessage {
            call_id,
            tool_name: tool_name.into(),
            content: content.into(),
            payload,
        })
    }

    /// The assistant view of this message, if it is one.
    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Self::Assistant(m) => Some(m),
            _ => None,
        }
    }
}

impl AssistantMessage {
    /// True when this is a terminal response: text present, no pending
    /// tool calls.
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty() && !self.content.is_empty()
    }

    /// True when the message carries neither content nor tool calls.
    /// Such messages are invalid as model input and are filtered out.
    pub fn is_degenerate(&self) -> bool {
        self.content.is_empty() && self.tool_calls.is_empty()
    }
}
