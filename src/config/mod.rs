//! Configuration module for the relay gateway
//!
//! Configuration is read from environment variables (with `.env` support via
//! `dotenvy` in `main`). Required values are validated eagerly so the process
//! fails fast at startup instead of at the first call.
//!
//! # Example
//! ```rust,no_run
//! use relay_gateway::config::ServerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::env;

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Default greeting spoken by Twilio when the callee picks up
pub const DEFAULT_WELCOME_GREETING: &str =
    "Hi! I am a voice assistant powered by Twilio and Google Gemini. Ask me anything!";

/// Default system instruction bound to every conversation.
///
/// Replies are spoken aloud over a phone call, so the model is asked to keep
/// answers short and free of markup.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and friendly voice assistant. \
This conversation is happening over a phone call, so your responses will be spoken aloud.\n\
Please adhere to the following rules:\n\
1. Provide clear, concise, and direct answers.\n\
2. Spell out all numbers (e.g., say 'one thousand two hundred' instead of 1200).\n\
3. Do not use any special characters like asterisks, bullet points, or emojis.\n\
4. Keep the conversation natural and engaging.";

/// Default Gemini model used for replies
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default text-to-speech provider named in the TwiML handoff document
pub const DEFAULT_TTS_PROVIDER: &str = "ElevenLabs";

/// Default text-to-speech voice identifier
pub const DEFAULT_TTS_VOICE: &str = "FGY2WhTYpPnrIDTdsKH5";

/// Server configuration
///
/// Contains everything needed to run the relay gateway:
/// - Server settings (host, port)
/// - The public domain used to build the TwiML and WebSocket callback URLs
/// - Twilio credentials for outbound call creation
/// - Gemini API key, model, and system prompt
/// - TwiML greeting and text-to-speech voice settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    /// Public hostname Twilio can reach, without scheme (e.g. an ngrok domain)
    pub domain: String,

    // Twilio credentials
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    /// E.164 number outbound calls originate from
    pub twilio_phone_number: String,

    // Gemini settings
    pub google_api_key: String,
    pub gemini_model: String,
    pub system_prompt: String,

    // TwiML handoff settings
    pub welcome_greeting: String,
    pub tts_provider: String,
    pub tts_voice: String,
}

impl ServerConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests supply a map-backed closure so they
    /// never have to mutate the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        // DOMAIN preferred, NGROK_URL accepted for parity with common tunnel setups
        let domain = get("DOMAIN")
            .or_else(|| get("NGROK_URL"))
            .ok_or(ConfigError::MissingVar("DOMAIN"))?;
        let domain = normalize_domain(&domain);
        if domain.is_empty() {
            return Err(ConfigError::Invalid {
                var: "DOMAIN",
                reason: "value is empty".to_string(),
            });
        }

        let twilio_account_sid =
            require(&get, "TWILIO_ACCOUNT_SID", ConfigError::MissingVar("TWILIO_ACCOUNT_SID"))?;
        let twilio_auth_token =
            require(&get, "TWILIO_AUTH_TOKEN", ConfigError::MissingVar("TWILIO_AUTH_TOKEN"))?;
        let twilio_phone_number =
            require(&get, "TWILIO_PHONE_NUMBER", ConfigError::MissingVar("TWILIO_PHONE_NUMBER"))?;
        let google_api_key =
            require(&get, "GOOGLE_API_KEY", ConfigError::MissingVar("GOOGLE_API_KEY"))?;

        Ok(Self {
            host,
            port,
            domain,
            twilio_account_sid,
            twilio_auth_token,
            twilio_phone_number,
            google_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            system_prompt: get("SYSTEM_PROMPT").unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            welcome_greeting: get("WELCOME_GREETING")
                .unwrap_or_else(|| DEFAULT_WELCOME_GREETING.to_string()),
            tts_provider: get("TTS_PROVIDER").unwrap_or_else(|| DEFAULT_TTS_PROVIDER.to_string()),
            tts_voice: get("TTS_VOICE").unwrap_or_else(|| DEFAULT_TTS_VOICE.to_string()),
        })
    }

    /// Bind address for the HTTP server
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Secure WebSocket URL Twilio connects the ConversationRelay channel to
    pub fn ws_url(&self) -> String {
        format!("wss://{}/ws", self.domain)
    }

    /// TwiML webhook URL passed to Twilio when creating an outbound call
    pub fn twiml_url(&self) -> String {
        format!("https://{}/twiml", self.domain)
    }
}

fn require(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    missing: ConfigError,
) -> Result<String, ConfigError> {
    match get(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(missing),
    }
}

/// Strip scheme and trailing slashes so DOMAIN can be pasted straight from a
/// tunnel dashboard (`https://abc.ngrok.app/` becomes `abc.ngrok.app`).
fn normalize_domain(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DOMAIN", "test.example.com"),
            ("TWILIO_ACCOUNT_SID", "ACtest"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("TWILIO_PHONE_NUMBER", "+15550001111"),
            ("GOOGLE_API_KEY", "gkey"),
        ])
    }

    fn lookup<'a>(env: &'a HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| env.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_from_lookup_defaults() {
        let env = full_env();
        let config = ServerConfig::from_lookup(lookup(&env)).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.domain, "test.example.com");
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.tts_provider, DEFAULT_TTS_PROVIDER);
        assert_eq!(config.welcome_greeting, DEFAULT_WELCOME_GREETING);
    }

    #[test]
    fn test_missing_domain() {
        let mut env = full_env();
        env.remove("DOMAIN");
        let err = ServerConfig::from_lookup(lookup(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DOMAIN")));
    }

    #[test]
    fn test_ngrok_url_fallback() {
        let mut env = full_env();
        env.remove("DOMAIN");
        env.insert("NGROK_URL", "https://abc.ngrok.app/");
        let config = ServerConfig::from_lookup(lookup(&env)).unwrap();
        assert_eq!(config.domain, "abc.ngrok.app");
        assert_eq!(config.ws_url(), "wss://abc.ngrok.app/ws");
        assert_eq!(config.twiml_url(), "https://abc.ngrok.app/twiml");
    }

    #[test]
    fn test_missing_twilio_credentials() {
        let mut env = full_env();
        env.remove("TWILIO_AUTH_TOKEN");
        let err = ServerConfig::from_lookup(lookup(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("TWILIO_AUTH_TOKEN")));
    }

    #[test]
    fn test_blank_required_value_rejected() {
        let mut env = full_env();
        env.insert("GOOGLE_API_KEY", "   ");
        let err = ServerConfig::from_lookup(lookup(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("GOOGLE_API_KEY")));
    }

    #[test]
    fn test_invalid_port() {
        let mut env = full_env();
        env.insert("PORT", "not-a-port");
        let err = ServerConfig::from_lookup(lookup(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn test_overrides() {
        let mut env = full_env();
        env.insert("HOST", "127.0.0.1");
        env.insert("PORT", "9000");
        env.insert("GEMINI_MODEL", "gemini-2.0-flash");
        env.insert("WELCOME_GREETING", "Hello there");
        let config = ServerConfig::from_lookup(lookup(&env)).unwrap();

        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.welcome_greeting, "Hello there");
    }
}
