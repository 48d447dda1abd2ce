//! ConversationRelay WebSocket route configuration
//!
//! # Endpoint
//!
//! `GET /ws` - WebSocket upgrade for one call's ConversationRelay channel
//!
//! # Protocol
//!
//! After the upgrade, Twilio sends:
//! 1. `{"type":"setup","callSid":"CA..."}` to bind the call
//! 2. `{"type":"prompt","voicePrompt":"..."}` per caller utterance
//! 3. `{"type":"interrupt"}` when the caller talks over playback
//!
//! The server replies with `{"type":"text","token":"...","last":true}` per
//! answered prompt.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::relay::relay_handler;
use crate::state::AppState;

/// Create the ConversationRelay WebSocket router
pub fn create_relay_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(relay_handler))
        .layer(TraceLayer::new_for_http())
}
