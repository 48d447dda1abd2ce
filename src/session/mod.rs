//! Process-wide call session store
//!
//! Maps a provider-assigned call SID to its conversation handle. The store is
//! the exclusive owner of session existence: channel handlers create entries
//! on `setup` and remove them on disconnect, and nothing else may do either.
//!
//! All operations are safe under concurrent invocation from independent
//! channel tasks. Concurrent calls map to distinct keys, so entries are only
//! ever contended by a channel's own cleanup racing a slow in-flight reply,
//! which the `DashMap` guard makes harmless.

use std::sync::Arc;

use dashmap::{DashMap, Entry};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::core::engine::{ConversationEngine, ConversationHandle};

/// One phone call's conversation state
#[derive(Debug, Clone)]
pub struct CallSession {
    /// Provider-assigned call identifier
    pub call_sid: String,
    /// Opaque multi-turn dialogue state owned by the conversation engine
    pub handle: ConversationHandle,
    /// Informational creation timestamp
    pub created_at: OffsetDateTime,
}

impl CallSession {
    fn new(call_sid: &str, handle: ConversationHandle) -> Self {
        Self {
            call_sid: call_sid.to_string(),
            handle,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Concurrent map of active call sessions, keyed by call SID.
///
/// Cloning is cheap and shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, CallSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for `call_sid`, allocating a fresh conversation
    /// handle from `engine`.
    ///
    /// A repeated setup for a live call (e.g. a channel reconnect) is treated
    /// as an idempotent refresh: the existing handle is reused so accumulated
    /// conversation history is never silently discarded.
    pub fn create(&self, call_sid: &str, engine: &dyn ConversationEngine) -> ConversationHandle {
        match self.sessions.entry(call_sid.to_string()) {
            Entry::Occupied(entry) => {
                info!(call_sid = %call_sid, "Repeated setup for live call, reusing conversation");
                entry.get().handle.clone()
            }
            Entry::Vacant(entry) => {
                let session = CallSession::new(call_sid, engine.start_conversation());
                let handle = session.handle.clone();
                entry.insert(session);
                debug!(call_sid = %call_sid, "Session registered");
                handle
            }
        }
    }

    /// Look up the conversation handle for `call_sid`. Pure lookup, no side
    /// effect.
    pub fn get(&self, call_sid: &str) -> Option<ConversationHandle> {
        self.sessions
            .get(call_sid)
            .map(|session| session.handle.clone())
    }

    /// Remove the session for `call_sid`. Idempotent: removing an absent key
    /// is a no-op. Returns whether an entry was removed.
    pub fn remove(&self, call_sid: &str) -> bool {
        self.sessions.remove(call_sid).is_some()
    }

    pub fn contains(&self, call_sid: &str) -> bool {
        self.sessions.contains_key(call_sid)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
