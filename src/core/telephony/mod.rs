//! Telephony provider integration
//!
//! Thin collaborators around Twilio: outbound call creation via the REST API
//! and the static TwiML handoff document that tells Twilio where to connect
//! the ConversationRelay channel.

pub mod twiml;
mod twilio;

pub use twilio::{CallCreated, TelephonyError, TelephonyResult, TwilioClient, TwilioConfig};
