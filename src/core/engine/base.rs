//! Core conversation engine trait and the per-call conversation handle

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Conversation backend error.
///
/// Backend failures (quota, network, malformed response) propagate to the
/// caller, which decides whether to drop the turn. No retry logic exists
/// anywhere in the engine: a single call-and-fail policy.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("engine returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed engine response: {0}")]
    MalformedResponse(String),
}

/// Speaker of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One turn of accumulated dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Opaque per-call conversation state.
///
/// Cloning is cheap and shares the underlying history. The history lock is
/// held across the backend call inside `get_reply`, which both keeps the
/// turn order consistent and serializes generations against the same handle
/// in FIFO order.
#[derive(Debug, Clone, Default)]
pub struct ConversationHandle {
    history: Arc<Mutex<Vec<ChatTurn>>>,
}

impl ConversationHandle {
    /// Create a handle with empty turn history
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the turn history. Engine implementations append under this lock.
    pub async fn history(&self) -> MutexGuard<'_, Vec<ChatTurn>> {
        self.history.lock().await
    }

    /// Copy of the current turn history
    pub async fn snapshot(&self) -> Vec<ChatTurn> {
        self.history.lock().await.clone()
    }

    /// Number of accumulated turns
    pub async fn turn_count(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Whether two handles share the same underlying conversation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.history, &other.history)
    }
}

/// A generative-text backend that carries per-call dialogue context.
///
/// Implementations bind the system instruction at construction time; every
/// handle produced by [`start_conversation`](Self::start_conversation)
/// starts with empty history under that instruction.
#[async_trait]
pub trait ConversationEngine: Send + Sync {
    /// Create a fresh conversation handle with empty turn history
    fn start_conversation(&self) -> ConversationHandle {
        ConversationHandle::new()
    }

    /// Append `utterance` to the handle's history, invoke the backend, and
    /// return the reply text. The handle's history is extended with both the
    /// utterance and the reply as a side effect.
    ///
    /// # Errors
    /// Returns `EngineError` if the backend call fails; the handle's history
    /// is left unchanged in that case.
    async fn get_reply(&self, handle: &ConversationHandle, utterance: &str)
    -> EngineResult<String>;
}
