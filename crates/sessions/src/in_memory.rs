//! In-memory session store with capacity and idle-TTL eviction.
//!
//! Sessions live for the process lifetime unless evicted. Each session is
//! handed out behind its own mutex, so overlapping turns on the same
//! session id serialize instead of racing on the message log.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use ragweed_core::error::SessionError;
use ragweed_core::event::{DomainEvent, EventBus};
use ragweed_core::session::{Session, SessionHandle, SessionId, SessionStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// An in-memory session store.
///
/// `capacity` bounds the number of live sessions: when a new session would
/// exceed it, the least-recently-active one is evicted. `idle_ttl_minutes`
/// expires sessions that saw no turn for that long (0 disables the sweep).
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    capacity: usize,
    idle_ttl: Option<Duration>,
    events: Option<Arc<EventBus>>,
}

impl InMemorySessionStore {
    pub fn new(capacity: usize, idle_ttl_minutes: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            idle_ttl: if idle_ttl_minutes == 0 {
                None
            } else {
                Some(Duration::minutes(idle_ttl_minutes as i64))
            },
            events: None,
        }
    }

    /// Attach an event bus for eviction notifications.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    fn publish_evicted(&self, id: &SessionId, reason: &str) {
        debug!(session_id = %id, reason, "Session evicted");
        if let Some(events) = &self.events {
            events.publish(DomainEvent::SessionEvicted {
                session_id: id.to_string(),
                reason: reason.to_string(),
                timestamp: Utc::now(),
            });
        }
    }

    /// Read a session's last_active without blocking. A locked session has
    /// a turn in flight and is treated as active.
    fn last_active(handle: &SessionHandle) -> Option<chrono::DateTime<Utc>> {
        handle.try_lock().ok().map(|s| s.last_active)
    }

    /// Drop sessions idle past the TTL. Caller holds the write lock.
    fn sweep_expired(&self, sessions: &mut HashMap<SessionId, SessionHandle>) {
        let Some(ttl) = self.idle_ttl else {
            return;
        };
        let cutoff = Utc::now() - ttl;

        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, handle)| {
                Self::last_active(handle).is_some_and(|last| last < cutoff)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in expired {
            sessions.remove(&id);
            self.publish_evicted(&id, "idle_ttl");
        }
    }

    /// Evict the least-recently-active session. Caller holds the write
    /// lock. Sessions with a turn in flight are never evicted.
    fn evict_lru(&self, sessions: &mut HashMap<SessionId, SessionHandle>) {
        let oldest = sessions
            .iter()
            .filter_map(|(id, handle)| Self::last_active(handle).map(|last| (id.clone(), last)))
            .min_by_key(|(_, last)| *last)
            .map(|(id, _)| id);

        if let Some(id) = oldest {
            sessions.remove(&id);
            self.publish_evicted(&id, "capacity");
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_or_create(
        &self,
        id: &SessionId,
    ) -> std::result::Result<SessionHandle, SessionError> {
        // Fast path: existing session behind the read lock.
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(id) {
                return Ok(Arc::clone(handle));
            }
        }

        let mut sessions = self.sessions.write().await;
        // Re-check: another task may have created it between locks.
        if let Some(handle) = sessions.get(id) {
            return Ok(Arc::clone(handle));
        }

        self.sweep_expired(&mut sessions);
        if sessions.len() >= self.capacity {
            self.evict_lru(&mut sessions);
        }

        debug!(session_id = %id, "Creating session");
        let handle: SessionHandle = Arc::new(Mutex::new(Session::new(id.clone())));
        sessions.insert(id.clone(), Arc::clone(&handle));
        Ok(handle)
    }

    async fn get(
        &self,
        id: &SessionId,
    ) -> std::result::Result<Option<SessionHandle>, SessionError> {
        Ok(self.sessions.read().await.get(id).map(Arc::clone))
    }

    async fn evict(&self, id: &SessionId) -> std::result::Result<bool, SessionError> {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            self.publish_evicted(id, "explicit");
        }
        Ok(removed)
    }

    async fn count(&self) -> std::result::Result<usize, SessionError> {
        Ok(self.sessions.read().await.len())
    }

    async fn clear(&self) -> std::result::Result<(), SessionError> {
        self.sessions.write().await.clear();
        Ok(())
    }
}
