//! Conversation engine abstraction
//!
//! A conversation engine turns one caller utterance into one spoken reply,
//! carrying multi-turn context in an opaque per-call handle. The production
//! implementation talks to the Gemini `generateContent` REST API.
//!
//! The handle, not the engine, owns conversation memory: `get_reply` extends
//! the handle's turn history as a side effect, so concurrent calls against
//! distinct handles never interfere.

mod base;
pub mod gemini;

pub use base::{ChatRole, ChatTurn, ConversationEngine, ConversationHandle, EngineError, EngineResult};
pub use gemini::{GeminiConfig, GeminiEngine};
