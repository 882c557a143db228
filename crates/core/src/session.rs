//! Session types and the SessionStore trait.
//!
//! A session is the durable, append-only conversation state keyed by an
//! opaque identifier. Sessions are created lazily on first reference and
//! only ever grow within a process run: the turn runner appends the
//! agreed-complete transcript of each successful turn and nothing else.

use crate::error::SessionError;
use crate::message::Message;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One conversation: an ordered, append-only message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID
    pub id: SessionId,

    /// Ordered messages, oldest first
    pub messages: Vec<Message>,

    /// When this session was created
    pub created_at: DateTime<Utc>,

    /// When the last turn committed
    pub last_active: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session.
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            messages: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    /// Append one message.
    pub fn push(&mut self, message: Message) {
        self.last_active = Utc::now();
        self.messages.push(message);
    }

    /// Append a completed turn's messages in order.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.last_active = Utc::now();
        self.messages.extend(messages);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A shared handle to one session.
///
/// The mutex serializes overlapping turns on the same session id: a turn
/// holds the lock from history snapshot to commit, so concurrent callers
/// queue instead of racing on the message log.
pub type SessionHandle = Arc<Mutex<Session>>;

/// The session store trait.
///
/// Implementations own all sessions exclusively; `get_or_create` is
/// idempotent for repeated ids. Stores are expected to bound their growth
/// (capacity/TTL eviction) — the trait exposes eviction so callers can
/// also drop sessions explicitly.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Get the session for `id`, creating an empty one if unseen.
    async fn get_or_create(&self, id: &SessionId)
    -> std::result::Result<SessionHandle, SessionError>;

    /// Get the session for `id` if it exists.
    async fn get(
        &self,
        id: &SessionId,
    ) -> std::result::Result<Option<SessionHandle>, SessionError>;

    /// Remove a session. Returns true if it existed.
    async fn evict(&self, id: &SessionId) -> std::result::Result<bool, SessionError>;

    /// Number of live sessions.
    async fn count(&self) -> std::result::Result<usize, SessionError>;

    /// Drop all sessions.
    async fn clear(&self) -> std::result::Result<(), SessionError>;
}
