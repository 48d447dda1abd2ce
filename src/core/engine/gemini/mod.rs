//! Google Gemini conversation engine
//!
//! REST-based implementation of [`ConversationEngine`] against the Gemini
//! `generateContent` API. Each call sends the handle's full turn history plus
//! the new utterance, with the system instruction attached, and appends the
//! returned reply to the handle.
//!
//! The module is organized into focused submodules:
//!
//! - [`config`]: `GeminiConfig` (API key, model, system prompt, base URL)
//! - [`messages`]: request/response types for the `generateContent` API
//! - [`client`]: the `GeminiEngine` client implementation
//!
//! [`ConversationEngine`]: crate::core::engine::ConversationEngine

mod client;
mod config;
pub mod messages;

pub use client::GeminiEngine;
pub use config::GeminiConfig;
