//! Application-level error type rendered at the HTTP boundary
//!
//! Per-request failures are converted into structured JSON responses here.
//! Per-channel (WebSocket) failures never reach this type; they are handled
//! and logged inside the owning channel task.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::core::engine::EngineError;
use crate::core::telephony::TelephonyError;

/// Application error rendered as a structured HTTP response
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Outbound call creation failed. Surfaced to the caller as HTTP 400
    /// with the cause embedded, never retried.
    #[error("Failed to make call: {0}")]
    Telephony(#[from] TelephonyError),

    /// Conversation backend failure reaching the HTTP surface
    #[error("Conversation engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Internal(String),
}

/// Convenience result alias for handlers
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Telephony(_) => StatusCode::BAD_REQUEST,
            AppError::Engine(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
