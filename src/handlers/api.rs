//! REST API handlers: index, outbound call creation, TwiML webhook

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::core::telephony::twiml;
use crate::errors::app_error::AppResult;
use crate::state::AppState;

/// Request body for outbound call creation
#[derive(Debug, Deserialize)]
pub struct MakeCallRequest {
    /// Phone number to call, E.164 (e.g. "+15551234567")
    pub to_number: String,
    /// Optional greeting override. Accepted for forward compatibility; the
    /// configured greeting is used for now.
    #[serde(default)]
    pub custom_greeting: Option<String>,
}

/// Response body for a successfully created call
#[derive(Debug, Serialize)]
pub struct MakeCallResponse {
    pub success: bool,
    pub call_sid: String,
    pub status: String,
    pub to: String,
    pub from: String,
    pub message: String,
}

/// `GET /` - API description
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Twilio Outbound Voice Assistant API",
        "endpoints": {
            "make_call": "POST /make-call - Initiate an outbound call",
            "twiml": "POST /twiml - TwiML webhook endpoint",
            "websocket": "WS /ws - WebSocket for voice communication",
        }
    }))
}

/// `POST /make-call` - initiate an outbound call.
///
/// Creates the call via the telephony provider, pointing it at this server's
/// TwiML webhook. Provider failures surface as HTTP 400 with the cause.
pub async fn make_call(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MakeCallRequest>,
) -> AppResult<Json<MakeCallResponse>> {
    if let Some(greeting) = &request.custom_greeting {
        debug!(greeting = %greeting, "Custom greeting requested, using configured greeting");
    }

    let call = state
        .telephony
        .initiate_call(&request.to_number, &state.config.twiml_url())
        .await?;

    info!(call_sid = %call.sid, to = %request.to_number, "Outbound call initiated");

    Ok(Json(MakeCallResponse {
        success: true,
        call_sid: call.sid,
        status: call.status,
        from: state.telephony.from_number().to_string(),
        message: format!("Call initiated to {}", request.to_number),
        to: request.to_number,
    }))
}

/// `POST /twiml` - connection handoff document.
///
/// Twilio fetches this when the outbound call is answered; it names the
/// WebSocket URL, greeting, and text-to-speech voice. Static per process.
pub async fn twiml(State(state): State<Arc<AppState>>) -> Response {
    let document = twiml::conversation_relay_document(
        &state.config.ws_url(),
        &state.config.welcome_greeting,
        &state.config.tts_provider,
        &state.config.tts_voice,
    );

    ([(header::CONTENT_TYPE, "text/xml")], document).into_response()
}
