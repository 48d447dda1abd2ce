//! HTTP and WebSocket request handlers
//!
//! - `api` - API index, outbound call creation, and TwiML webhook
//! - `relay` - Twilio ConversationRelay WebSocket channel

pub mod api;
pub mod relay;

// Re-export commonly used handlers for convenient access
pub use relay::relay_handler;
