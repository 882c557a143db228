//! Transcript decomposition.
//!
//! After a turn completes, the full message sequence is walked once to
//! produce the structured result handed back to the caller: the final
//! answer, which tools ran, the evidence they retrieved, and a
//! step-by-step trace.

use ragweed_core::message::Message;
use serde::{Deserialize, Serialize};

/// The decomposed output of one full turn. Derived, never persisted —
/// recomputed fresh from the transcript on every turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnResult {
    /// The terminal assistant answer. Absent (not an error) if the turn
    /// aborted before one occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_output: Option<String>,

    /// Tool names in the order the model requested them.
    pub tools_used: Vec<String>,

    /// Evidence produced by tool results, in source order.
    pub retrieved_chunks: Vec<Evidence>,

    /// Every message of the transcript as a trace step, in order.
    pub intermediate_steps: Vec<TraceStep>,
}

/// One piece of retrieved evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// The tool that produced it.
    pub tool: String,

    /// `result` for items of a structured `results` payload, `text` for
    /// plain tool output.
    #[serde(rename = "type")]
    pub kind: EvidenceKind,

    /// The item itself, or the output text.
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Result,
    Text,
}

/// One step of the turn trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceStep {
    Human {
        content: String,
    },
    AiToolCall {
        tool: String,
        args: serde_json::Value,
    },
    AiFinalResponse {
        content: String,
    },
    ToolResponse {
        tool: String,
        content: String,
    },
}

/// Decompose a transcript into a `TurnResult` in a single forward pass.
///
/// If several content-only assistant messages occur, the last one wins —
/// the loop's terminal invariant makes that a single message per turn,
/// but the decomposer does not rely on it.
pub fn decompose(messages: &[Message]) -> TurnResult {
    let mut result = TurnResult::default();

    for message in messages {
        match message {
            Message::User(u) => {
                result.intermediate_steps.push(TraceStep::Human {
                    content: u.content.clone(),
                });
            }

            Message::Assistant(a) => {
                if a.tool_calls.is_empty() {
                    result.final_output = Some(a.content.clone());
                    result.intermediate_steps.push(TraceStep::AiFinalResponse {
                        content: a.content.clone(),
                    });
                } else {
                    for call in &a.tool_calls {
                        result.tools_used.push(call.tool_name.clone());
                        result.intermediate_steps.push(TraceStep::AiToolCall {
                            tool: call.tool_name.clone(),
                            args: serde_json::Value::Object(call.arguments.clone()),
                        });
                    }
                }
            }

            Message::ToolResult(r) => {
                result.intermediate_steps.push(TraceStep::ToolResponse {
                    tool: r.tool_name.clone(),
                    content: r.content.clone(),
                });

                let items = r
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("results"))
                    .and_then(|v| v.as_array());

                match items {
                    Some(items) => {
                        for item in items {
                            result.retrieved_chunks.push(Evidence {
                                tool: r.tool_name.clone(),
                                kind: EvidenceKind::Result,
                                data: item.clone(),
                            });
                        }
                    }
                    None => {
                        result.retrieved_chunks.push(Evidence {
                            tool: r.tool_name.clone(),
                            kind: EvidenceKind::Text,
                            data: serde_json::Value::String(r.content.clone()),
                        });
                    }
                }
            }
        }
    }

    result
}
