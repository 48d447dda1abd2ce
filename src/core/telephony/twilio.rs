//! Twilio REST client for outbound call creation

use serde::Deserialize;
use tracing::debug;

use crate::config::ServerConfig;

/// Default Twilio API base URL
pub const TWILIO_API_BASE_URL: &str = "https://api.twilio.com";

/// Result type for telephony operations
pub type TelephonyResult<T> = Result<T, TelephonyError>;

/// Telephony provider error.
///
/// Call creation failures surface to the HTTP caller as 400 with the cause
/// embedded; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum TelephonyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

/// Configuration for the Twilio client
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// E.164 number outbound calls originate from
    pub from_number: String,
    /// API base URL, overridable for tests
    pub base_url: String,
}

impl TwilioConfig {
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from_number: config.twilio_phone_number.clone(),
            base_url: TWILIO_API_BASE_URL.to_string(),
        }
    }
}

/// Response from a successful call creation
#[derive(Debug, Clone, Deserialize)]
pub struct CallCreated {
    /// Provider-assigned call identifier
    pub sid: String,
    /// Initial call status, e.g. `queued`
    pub status: String,
}

/// Twilio REST API client
#[derive(Debug, Clone)]
pub struct TwilioClient {
    config: TwilioConfig,
    client: reqwest::Client,
}

impl TwilioClient {
    /// Create a new client with its own HTTP connection pool.
    ///
    /// # Errors
    /// Returns `TelephonyError` if the HTTP client cannot be constructed.
    pub fn new(config: TwilioConfig) -> TelephonyResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(config, client))
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_client(config: TwilioConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// The configured caller number
    pub fn from_number(&self) -> &str {
        &self.config.from_number
    }

    /// Create an outbound call that fetches its TwiML from `twiml_url`.
    ///
    /// # Errors
    /// Returns `TelephonyError` on transport failure or a non-2xx provider
    /// response.
    pub async fn initiate_call(&self, to: &str, twiml_url: &str) -> TelephonyResult<CallCreated> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.config.base_url, self.config.account_sid
        );

        debug!(to = %to, "Creating outbound call");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Url", twiml_url),
                ("Method", "POST"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelephonyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<CallCreated>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> TwilioClient {
        TwilioClient::new(TwilioConfig {
            account_sid: "ACtest".to_string(),
            auth_token: "secret".to_string(),
            from_number: "+15550001111".to_string(),
            base_url,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_initiate_call_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/ACtest/Calls.json"))
            .and(basic_auth("ACtest", "secret"))
            .and(body_string_contains("To=%2B15551234567"))
            .and(body_string_contains("From=%2B15550001111"))
            .and(body_string_contains("Method=POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sid": "CA123",
                "status": "queued",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let call = client
            .initiate_call("+15551234567", "https://test.example.com/twiml")
            .await
            .unwrap();

        assert_eq!(call.sid, "CA123");
        assert_eq!(call.status, "queued");
    }

    #[tokio::test]
    async fn test_initiate_call_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Authentication Error"))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let err = client
            .initiate_call("+15551234567", "https://test.example.com/twiml")
            .await
            .unwrap_err();

        match err {
            TelephonyError::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Authentication"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
