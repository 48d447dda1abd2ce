//! Gemini engine configuration

use crate::config::ServerConfig;

/// Default Gemini API base URL
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the Gemini conversation engine
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Google AI Studio API key
    pub api_key: String,
    /// Model name, e.g. `gemini-2.5-flash`
    pub model: String,
    /// System instruction bound to every conversation
    pub system_prompt: String,
    /// API base URL, overridable for tests
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            system_prompt: String::new(),
            base_url: GEMINI_API_BASE_URL.to_string(),
        }
    }

    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            api_key: config.google_api_key.clone(),
            model: config.gemini_model.clone(),
            system_prompt: config.system_prompt.clone(),
            base_url: GEMINI_API_BASE_URL.to_string(),
        }
    }
}
