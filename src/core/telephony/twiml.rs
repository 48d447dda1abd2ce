//! TwiML connection handoff document
//!
//! When an outbound call is answered, Twilio fetches TwiML from this server.
//! The document is static per process: it names the secure WebSocket URL for
//! the ConversationRelay channel, the welcome greeting, and the text-to-speech
//! provider and voice.

/// Build the ConversationRelay TwiML document.
///
/// Attribute values are XML-escaped; the greeting in particular is
/// operator-supplied.
pub fn conversation_relay_document(
    ws_url: &str,
    welcome_greeting: &str,
    tts_provider: &str,
    voice: &str,
) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<Response>\n",
            "    <Connect>\n",
            "        <ConversationRelay url=\"{}\" welcomeGreeting=\"{}\" ",
            "ttsProvider=\"{}\" voice=\"{}\" />\n",
            "    </Connect>\n",
            "</Response>",
        ),
        escape_attr(ws_url),
        escape_attr(welcome_greeting),
        escape_attr(tts_provider),
        escape_attr(voice),
    )
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
