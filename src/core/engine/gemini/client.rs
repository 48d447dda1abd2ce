//! Gemini `generateContent` client

use async_trait::async_trait;
use tracing::debug;

use super::config::GeminiConfig;
use super::messages::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::core::engine::{ChatTurn, ConversationEngine, ConversationHandle, EngineError, EngineResult};

/// Gemini conversation engine.
///
/// Stateless between calls apart from the shared HTTP connection pool; all
/// dialogue context lives in the [`ConversationHandle`] passed to
/// [`get_reply`](ConversationEngine::get_reply).
pub struct GeminiEngine {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiEngine {
    /// Create a new engine with its own HTTP client.
    ///
    /// # Errors
    /// Returns `EngineError` if the HTTP client cannot be constructed.
    pub fn new(config: GeminiConfig) -> EngineResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(config, client))
    }

    /// Create an engine reusing an existing HTTP client
    pub fn with_client(config: GeminiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl ConversationEngine for GeminiEngine {
    async fn get_reply(
        &self,
        handle: &ConversationHandle,
        utterance: &str,
    ) -> EngineResult<String> {
        // Hold the history lock across the backend call so turns against the
        // same handle are strictly ordered.
        let mut history = handle.history().await;

        let mut contents: Vec<Content> = history.iter().map(Content::from_turn).collect();
        contents.push(Content::user(utterance));

        let request = GenerateContentRequest {
            system_instruction: if self.config.system_prompt.is_empty() {
                None
            } else {
                Some(Content::system(&self.config.system_prompt))
            },
            contents,
        };

        debug!(
            model = %self.config.model,
            turns = history.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let reply = parsed.first_text().ok_or_else(|| {
            EngineError::MalformedResponse("no candidate text in response".to_string())
        })?;

        history.push(ChatTurn::user(utterance));
        history.push(ChatTurn::model(&reply));

        Ok(reply)
    }
}
