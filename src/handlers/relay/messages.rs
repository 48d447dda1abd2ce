//! ConversationRelay WebSocket message types
//!
//! Inbound frames are JSON objects discriminated by a `type` field. Unknown
//! types and well-formed frames missing required fields decode to
//! [`RelayIncomingMessage::Unknown`] so they can be logged and ignored;
//! only a frame that is not parseable as JSON at all is an error, which is
//! fatal for that channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound ConversationRelay events
#[derive(Debug, Clone, PartialEq)]
pub enum RelayIncomingMessage {
    /// Channel handshake carrying the provider-assigned call SID
    Setup { call_sid: String },

    /// A transcribed caller utterance
    Prompt { voice_prompt: String },

    /// Caller spoke over playback
    Interrupt,

    /// Unrecognized event type or malformed payload, preserved for logging
    Unknown { raw: Value },
}

impl RelayIncomingMessage {
    /// Decode one text frame.
    ///
    /// # Errors
    /// Returns the parse error if the frame is not structured JSON at all.
    /// That is a transport-level decode failure and fatal for the channel.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(value))
    }

    fn from_value(value: Value) -> Self {
        match value.get("type").and_then(Value::as_str) {
            Some("setup") => match value.get("callSid").and_then(Value::as_str) {
                Some(call_sid) => Self::Setup {
                    call_sid: call_sid.to_string(),
                },
                None => Self::Unknown { raw: value },
            },
            Some("prompt") => match value.get("voicePrompt").and_then(Value::as_str) {
                Some(voice_prompt) => Self::Prompt {
                    voice_prompt: voice_prompt.to_string(),
                },
                None => Self::Unknown { raw: value },
            },
            Some("interrupt") => Self::Interrupt,
            _ => Self::Unknown { raw: value },
        }
    }
}

/// Outbound ConversationRelay events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RelayOutgoingMessage {
    /// Spoken reply content. `last` marks the final chunk of the turn; this
    /// implementation always sends exactly one chunk with `last: true`.
    #[serde(rename = "text")]
    Text { token: String, last: bool },
}

/// Routing envelope for the per-channel sender task
#[derive(Debug)]
pub enum MessageRoute {
    Outgoing(RelayOutgoingMessage),
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_setup() {
        let msg = RelayIncomingMessage::decode(r#"{"type":"setup","callSid":"CA123"}"#).unwrap();
        assert_eq!(
            msg,
            RelayIncomingMessage::Setup {
                call_sid: "CA123".to_string()
            }
        );
    }

    #[test]
    fn test_decode_setup_ignores_extra_fields() {
        let msg = RelayIncomingMessage::decode(
            r#"{"type":"setup","callSid":"CA123","accountSid":"AC1","direction":"outbound"}"#,
        )
        .unwrap();
        assert!(matches!(msg, RelayIncomingMessage::Setup { .. }));
    }

    #[test]
    fn test_decode_prompt() {
        let msg = RelayIncomingMessage::decode(
            r#"{"type":"prompt","voicePrompt":"What is two plus two?"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            RelayIncomingMessage::Prompt {
                voice_prompt: "What is two plus two?".to_string()
            }
        );
    }

    #[test]
    fn test_decode_interrupt() {
        let msg =
            RelayIncomingMessage::decode(r#"{"type":"interrupt","utteranceUntilInterrupt":"The"}"#)
                .unwrap();
        assert_eq!(msg, RelayIncomingMessage::Interrupt);
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let msg = RelayIncomingMessage::decode(r#"{"type":"dtmf","digit":"5"}"#).unwrap();
        match msg {
            RelayIncomingMessage::Unknown { raw } => assert_eq!(raw["type"], "dtmf"),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_field_is_unknown_not_error() {
        let msg = RelayIncomingMessage::decode(r#"{"type":"setup"}"#).unwrap();
        assert!(matches!(msg, RelayIncomingMessage::Unknown { .. }));

        let msg = RelayIncomingMessage::decode(r#"{"type":"prompt","voicePrompt":5}"#).unwrap();
        assert!(matches!(msg, RelayIncomingMessage::Unknown { .. }));
    }

    #[test]
    fn test_missing_type_field_is_unknown() {
        let msg = RelayIncomingMessage::decode(r#"{"callSid":"CA123"}"#).unwrap();
        assert!(matches!(msg, RelayIncomingMessage::Unknown { .. }));
    }

    #[test]
    fn test_invalid_json_is_a_decode_error() {
        assert!(RelayIncomingMessage::decode("not json at all").is_err());
        assert!(RelayIncomingMessage::decode("{\"type\":").is_err());
    }

    #[test]
    fn test_outgoing_text_serialization() {
        let msg = RelayOutgoingMessage::Text {
            token: "Four.".to_string(),
            last: true,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "text", "token": "Four.", "last": true})
        );
    }
}
