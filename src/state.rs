//! Shared application state

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::engine::{ConversationEngine, GeminiConfig, GeminiEngine};
use crate::core::telephony::{TwilioClient, TwilioConfig};
use crate::errors::app_error::AppResult;
use crate::session::SessionStore;

/// Process-lifetime application state shared by all handlers.
///
/// The session store is the only mutable state shared across channel tasks;
/// everything else is configuration and clients.
pub struct AppState {
    pub config: ServerConfig,
    pub engine: Arc<dyn ConversationEngine>,
    pub sessions: SessionStore,
    pub telephony: TwilioClient,
}

impl AppState {
    /// Build the production state: Gemini engine plus Twilio client.
    ///
    /// # Errors
    /// Returns an error if either HTTP client cannot be constructed.
    pub fn new(config: ServerConfig) -> AppResult<Arc<Self>> {
        let engine = GeminiEngine::new(GeminiConfig::from_server_config(&config))?;
        let telephony = TwilioClient::new(TwilioConfig::from_server_config(&config))?;

        Ok(Arc::new(Self {
            config,
            engine: Arc::new(engine),
            sessions: SessionStore::new(),
            telephony,
        }))
    }

    /// Build state with an injected engine. Test seam for stub backends.
    pub fn with_engine(
        config: ServerConfig,
        engine: Arc<dyn ConversationEngine>,
    ) -> AppResult<Arc<Self>> {
        let telephony = TwilioClient::new(TwilioConfig::from_server_config(&config))?;
        Ok(Arc::new(Self {
            config,
            engine,
            sessions: SessionStore::new(),
            telephony,
        }))
    }
}
