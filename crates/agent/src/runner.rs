//! The turn state machine.
//!
//! One turn alternates between two phases until the model stops asking
//! for tools:
//!
//! ```text
//! CallModel ──(tool calls)──► DispatchTools ──► CallModel
//!     │
//!     └──(no tool calls)──► Done
//! ```
//!
//! The runner works on a turn-local copy of the transcript and returns
//! only the messages the turn produced; committing them to the session is
//! the caller's job. Any failure therefore leaves the session exactly as
//! it was before the turn.

use crate::filter;
use chrono::Utc;
use futures::future::join_all;
use ragweed_core::error::TurnError;
use ragweed_core::event::{DomainEvent, EventBus};
use ragweed_core::message::{Message, ToolCall};
use ragweed_core::provider::{ChatRequest, Provider};
use ragweed_core::session::SessionId;
use ragweed_core::tool::ToolRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Loop phases. `DispatchTools` carries the batch the model just
/// requested.
enum Phase {
    CallModel,
    DispatchTools(Vec<ToolCall>),
    Done,
}

/// What a completed turn produced.
#[derive(Debug)]
pub struct TurnOutcome {
    /// Messages generated during the turn (assistant and tool results),
    /// in transcript order. Does not include the pre-existing history.
    pub messages: Vec<Message>,

    /// How many model calls the turn used.
    pub model_calls: u32,
}

/// Runs single turns against a fixed provider and tool registry.
///
/// Stateless across turns: all per-turn state lives on the stack, so one
/// runner is shared by every session.
pub struct TurnRunner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    max_model_calls: u32,
    event_bus: Arc<EventBus>,
}

impl TurnRunner {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_model_calls: 8,
            event_bus,
        }
    }

    /// Set the default max tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the maximum number of model calls per turn.
    pub fn with_max_model_calls(mut self, max: u32) -> Self {
        self.max_model_calls = max.max(1);
        self
    }

    /// Run one turn over `history` (which already ends with the newly
    /// submitted user message) and return the messages it produced.
    pub async fn run(
        &self,
        session_id: &SessionId,
        history: &[Message],
    ) -> Result<TurnOutcome, TurnError> {
        let mut transcript = history.to_vec();
        let new_start = transcript.len();
        let definitions = self.tools.definitions();

        let mut model_calls: u32 = 0;
        let mut phase = Phase::CallModel;

        loop {
            phase = match phase {
                Phase::CallModel => {
                    if model_calls >= self.max_model_calls {
                        warn!(
                            session_id = %session_id,
                            limit = self.max_model_calls,
                            "Turn exceeded model call limit"
                        );
                        return Err(TurnError::TurnLimitExceeded {
                            limit: self.max_model_calls,
                        });
                    }
                    model_calls += 1;

                    debug!(
                        session_id = %session_id,
                        iteration = model_calls,
                        "Calling model"
                    );

                    let messages = filter::admissible(&transcript)?;
                    let started = Instant::now();
                    let response = self
                        .provider
                        .complete(ChatRequest {
                            model: self.model.clone(),
                            messages,
                            temperature: self.temperature,
                            max_tokens: self.max_tokens,
                            tools: definitions.clone(),
                        })
                        .await?;
                    debug!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Model responded"
                    );

                    self.event_bus.publish(DomainEvent::ModelResponded {
                        session_id: session_id.to_string(),
                        model: response.model.clone(),
                        tool_calls: response.message.tool_calls.len(),
                        tokens_used: response.usage.as_ref().map_or(0, |u| u.total_tokens),
                        timestamp: Utc::now(),
                    });

                    let assistant = response.message;
                    let pending = assistant.tool_calls.clone();
                    transcript.push(Message::Assistant(assistant));

                    if pending.is_empty() {
                        Phase::Done
                    } else {
                        Phase::DispatchTools(pending)
                    }
                }

                Phase::DispatchTools(calls) => {
                    debug!(count = calls.len(), "Dispatching tool batch");
                    let results = self.dispatch(&calls).await?;
                    transcript.extend(results);
                    Phase::CallModel
                }

                Phase::Done => break,
            };
        }

        Ok(TurnOutcome {
            messages: transcript.split_off(new_start),
            model_calls,
        })
    }

    /// Execute one batch of tool calls.
    ///
    /// All names are resolved before anything runs, so an unknown tool
    /// aborts the turn without side effects. Resolved calls run
    /// concurrently; results are reassembled in call order. A failing tool
    /// aborts the whole turn — tool errors are not converted into result
    /// messages.
    async fn dispatch(&self, calls: &[ToolCall]) -> Result<Vec<Message>, TurnError> {
        for call in calls {
            if self.tools.get(&call.tool_name).is_none() {
                return Err(TurnError::UnknownTool(call.tool_name.clone()));
            }
        }

        let invocations = calls.iter().map(|call| async move {
            let started = Instant::now();
            let outcome = self.tools.invoke(call).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(output) => {
                    self.event_bus.publish(DomainEvent::ToolExecuted {
                        tool_name: call.tool_name.clone(),
                        success: true,
                        duration_ms,
                        timestamp: Utc::now(),
                    });
                    Ok(Message::tool_result(
                        call.id.clone(),
                        &call.tool_name,
                        output.text,
                        output.structured,
                    ))
                }
                Err(e) => {
                    warn!(tool = %call.tool_name, error = %e, "Tool execution failed");
                    self.event_bus.publish(DomainEvent::ToolExecuted {
                        tool_name: call.tool_name.clone(),
                        success: false,
                        duration_ms,
                        timestamp: Utc::now(),
                    });
                    Err(TurnError::Tool(e))
                }
            }
        });

        // join_all preserves input order, so results line up with calls.
        join_all(invocations).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EchoSearchTool, FailingTool, ScriptedProvider, search_call};

    fn runner_with(provider: ScriptedProvider, tools: ToolRegistry) -> TurnRunner {
        TurnRunner::new(
            Arc::new(provider),
            "scripted-model",
            0.7,
            Arc::new(tools),
            Arc::new(EventBus::default()),
        )
    }

    #[tokio::test]
    async fn immediate_final_response() {
        let runner = runner_with(
            ScriptedProvider::new(vec![ScriptedProvider::text("Paris")]),
            ToolRegistry::new(),
        );

        let history = vec![Message::user("capital of France?")];
        let outcome = runner.run(&SessionId::from("s1"), &history).await.unwrap();

        assert_eq!(outcome.model_calls, 1);
        assert_eq!(outcome.messages.len(), 1);
        let assistant = outcome.messages[0].as_assistant().unwrap();
        assert!(assistant.is_final());
        assert_eq!(assistant.content, "Paris");
    }

    #[tokio::test]
    async fn tool_roundtrip_then_final() {
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(EchoSearchTool));

        let runner = runner_with(
            ScriptedProvider::new(vec![
                ScriptedProvider::tool_request(vec![search_call("X")]),
                ScriptedProvider::text("Answer"),
            ]),
            tools,
        );

        let history = vec![Message::user("look up X")];
        let outcome = runner.run(&SessionId::from("s1"), &history).await.unwrap();

        assert_eq!(outcome.model_calls, 2);
        // assistant(tool request) + tool result + assistant(final)
        assert_eq!(outcome.messages.len(), 3);
        match &outcome.messages[1] {
            Message::ToolResult(r) => {
                assert_eq!(r.tool_name, "search");
                assert_eq!(r.content, "result-X");
                assert_eq!(r.call_id.as_deref(), Some("call_X"));
            }
            other => panic!("expected tool result, got {other:?}"),
        }
        // Terminal invariant: last message is a final assistant response.
        let last = outcome.messages.last().unwrap().as_assistant().unwrap();
        assert!(last.is_final());
    }

    #[tokio::test]
    async fn batch_results_preserve_call_order() {
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(EchoSearchTool));

        let runner = runner_with(
            ScriptedProvider::new(vec![
                ScriptedProvider::tool_request(vec![
                    search_call("alpha"),
                    search_call("beta"),
                    search_call("gamma"),
                ]),
                ScriptedProvider::text("done"),
            ]),
            tools,
        );

        let history = vec![Message::user("three searches")];
        let outcome = runner.run(&SessionId::from("s1"), &history).await.unwrap();

        let results: Vec<&str> = outcome
            .messages
            .iter()
            .filter_map(|m| match m {
                Message::ToolResult(r) => Some(r.content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(results, vec!["result-alpha", "result-beta", "result-gamma"]);
    }

    #[tokio::test]
    async fn unknown_tool_aborts_turn() {
        let runner = runner_with(
            ScriptedProvider::new(vec![ScriptedProvider::tool_request(vec![ToolCall {
                id: None,
                tool_name: "nonexistent".into(),
                arguments: serde_json::Map::new(),
            }])]),
            ToolRegistry::new(),
        );

        let history = vec![Message::user("q")];
        let err = runner
            .run(&SessionId::from("s1"), &history)
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::UnknownTool(name) if name == "nonexistent"));
    }

    #[tokio::test]
    async fn failing_tool_aborts_turn() {
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(FailingTool));

        let runner = runner_with(
            ScriptedProvider::new(vec![ScriptedProvider::tool_request(vec![ToolCall {
                id: None,
                tool_name: "broken".into(),
                arguments: serde_json::Map::new(),
            }])]),
            tools,
        );

        let history = vec![Message::user("q")];
        let err = runner
            .run(&SessionId::from("s1"), &history)
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::Tool(_)));
    }

    #[tokio::test]
    async fn looping_model_trips_turn_limit() {
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(EchoSearchTool));

        // The model requests a tool on every call, forever.
        let responses = (0..10)
            .map(|i| ScriptedProvider::tool_request(vec![search_call(&i.to_string())]))
            .collect();
        let runner = runner_with(ScriptedProvider::new(responses), tools)
            .with_max_model_calls(3);

        let history = vec![Message::user("loop")];
        let err = runner
            .run(&SessionId::from("s1"), &history)
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::TurnLimitExceeded { limit: 3 }));
    }

    #[tokio::test]
    async fn empty_history_fails_before_model_call() {
        let runner = runner_with(ScriptedProvider::new(vec![]), ToolRegistry::new());

        let err = runner.run(&SessionId::from("s1"), &[]).await.unwrap_err();
        // The scripted provider would have errored with "script exhausted"
        // if it had been reached; EmptyContext proves it never was.
        assert!(matches!(err, TurnError::EmptyContext));
    }

    #[tokio::test]
    async fn model_error_propagates() {
        // Empty script: the first completion fails.
        let runner = runner_with(ScriptedProvider::new(vec![]), ToolRegistry::new());

        let history = vec![Message::user("q")];
        let err = runner
            .run(&SessionId::from("s1"), &history)
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::Model(_)));
    }
}
