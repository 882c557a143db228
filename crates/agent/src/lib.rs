//! The turn orchestration loop — the heart of ragweed.
//!
//! One turn flows through these stages:
//!
//! 1. **Load** the session for the submitted id (created lazily) and lock
//!    it, serializing overlapping turns on the same session
//! 2. **Stage** the history plus the new user message into a turn-local
//!    transcript; the session is not touched yet
//! 3. **Filter** the transcript down to model-consumable messages
//! 4. **Call the model**; if it requests tools, dispatch the batch and
//!    loop back, up to the configured model-call limit
//! 5. **Commit** the completed turn to the session — or, on any failure,
//!    discard the staged messages so the session keeps its previous state
//! 6. **Decompose** the transcript into the structured turn result
//!
//! The loop terminates only on an assistant message with content and no
//! pending tool calls.

pub mod decompose;
pub mod filter;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_support;

pub use decompose::{Evidence, EvidenceKind, TraceStep, TurnResult, decompose};
pub use runner::{TurnOutcome, TurnRunner};

use chrono::Utc;
use ragweed_core::error::{Error, Result};
use ragweed_core::event::{DomainEvent, EventBus};
use ragweed_core::message::Message;
use ragweed_core::provider::Provider;
use ragweed_core::session::{SessionId, SessionStore};
use ragweed_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::info;

/// A conversational agent bound to one provider, one tool registry, and
/// one session store. Shared across sessions; all per-turn state is local
/// to `submit_turn`.
pub struct Agent {
    runner: TurnRunner,
    store: Arc<dyn SessionStore>,
    event_bus: Arc<EventBus>,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn SessionStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            runner: TurnRunner::new(provider, model, temperature, tools, Arc::clone(&event_bus)),
            store,
            event_bus,
        }
    }

    /// Set the default max tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.runner = self.runner.with_max_tokens(max);
        self
    }

    /// Set the maximum number of model calls per turn.
    pub fn with_max_model_calls(mut self, max: u32) -> Self {
        self.runner = self.runner.with_max_model_calls(max);
        self
    }

    /// Run one full turn: submit `user_text` to the session's
    /// conversation and drive the loop to a final answer.
    ///
    /// On success the session gains the user message plus everything the
    /// turn produced, and the returned result is decomposed from the full
    /// transcript. On failure the session is left exactly as it was.
    pub async fn submit_turn(&self, session_id: &str, user_text: &str) -> Result<TurnResult> {
        let session_id = SessionId::from(session_id);
        let handle = self.store.get_or_create(&session_id).await?;
        let mut session = handle.lock().await;

        info!(
            session_id = %session_id,
            history = session.len(),
            "Processing turn"
        );

        // Stage the turn without touching the session.
        let mut staged: Vec<Message> = session.messages.clone();
        staged.push(Message::user(user_text));

        let outcome = self
            .runner
            .run(&session_id, &staged)
            .await
            .map_err(Error::Turn)?;

        // Commit the agreed-complete transcript.
        let appended = 1 + outcome.messages.len();
        session.push(Message::user(user_text));
        session.extend(outcome.messages);

        self.event_bus.publish(DomainEvent::TurnCompleted {
            session_id: session_id.to_string(),
            model_calls: outcome.model_calls,
            appended_messages: appended,
            timestamp: Utc::now(),
        });

        info!(
            session_id = %session_id,
            model_calls = outcome.model_calls,
            appended,
            "Turn committed"
        );

        Ok(decompose(&session.messages))
    }
}
