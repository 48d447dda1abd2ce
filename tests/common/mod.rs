//! Shared test fixtures: configuration and stub conversation engines
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use relay_gateway::ServerConfig;
use relay_gateway::core::engine::{
    ChatTurn, ConversationEngine, ConversationHandle, EngineError, EngineResult,
};
use relay_gateway::handlers::relay::state::ConnectionState;
use relay_gateway::handlers::relay::{RelayChannel, run_generation_worker};
use relay_gateway::handlers::relay::messages::{MessageRoute, RelayOutgoingMessage};
use relay_gateway::session::SessionStore;

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        domain: "test.example.com".to_string(),
        twilio_account_sid: "ACtest".to_string(),
        twilio_auth_token: "secret".to_string(),
        twilio_phone_number: "+15550001111".to_string(),
        google_api_key: "gkey".to_string(),
        gemini_model: "gemini-2.5-flash".to_string(),
        system_prompt: "be brief".to_string(),
        welcome_greeting: "Hi there!".to_string(),
        tts_provider: "ElevenLabs".to_string(),
        tts_voice: "FGY2WhTYpPnrIDTdsKH5".to_string(),
    }
}

/// Deterministic in-memory engine mirroring the real one's history behavior
pub struct StubEngine {
    reply: Box<dyn Fn(&str) -> String + Send + Sync>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubEngine {
    /// Replies with `"echo: <utterance>"`
    pub fn echo() -> Self {
        Self {
            reply: Box::new(|utterance| format!("echo: {utterance}")),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Replies with a fixed string
    pub fn fixed(reply: &str) -> Self {
        let reply = reply.to_string();
        Self {
            reply: Box::new(move |_| reply.clone()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep this long inside each `get_reply`, to give interrupts a window
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completed backend calls
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationEngine for StubEngine {
    async fn get_reply(
        &self,
        handle: &ConversationHandle,
        utterance: &str,
    ) -> EngineResult<String> {
        let mut history = handle.history().await;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = (self.reply)(utterance);
        history.push(ChatTurn::user(utterance));
        history.push(ChatTurn::model(&reply));
        Ok(reply)
    }
}

/// Engine whose backend always fails
pub struct FailingEngine;

#[async_trait]
impl ConversationEngine for FailingEngine {
    async fn get_reply(
        &self,
        _handle: &ConversationHandle,
        _utterance: &str,
    ) -> EngineResult<String> {
        Err(EngineError::Api {
            status: 429,
            body: "quota exceeded".to_string(),
        })
    }
}

/// One relay channel wired up like the WebSocket handler does it, minus the
/// socket: events go in through `channel`, routed messages come out of
/// `message_rx`.
pub struct TestChannel {
    pub channel: RelayChannel,
    pub message_rx: mpsc::Receiver<MessageRoute>,
}

pub fn spawn_channel(engine: Arc<dyn ConversationEngine>, sessions: SessionStore) -> TestChannel {
    let (message_tx, message_rx) = mpsc::channel(64);
    let (generation_tx, generation_rx) = mpsc::channel(64);
    let shutdown = CancellationToken::new();

    tokio::spawn(run_generation_worker(
        generation_rx,
        message_tx.clone(),
        Arc::clone(&engine),
        shutdown.clone(),
    ));

    let channel = RelayChannel {
        state: Arc::new(RwLock::new(ConnectionState::new())),
        message_tx,
        generation_tx,
        sessions,
        engine,
        shutdown,
    };

    TestChannel {
        channel,
        message_rx,
    }
}

/// Receive the next outgoing message, panicking on close or timeout
pub async fn recv_outgoing(rx: &mut mpsc::Receiver<MessageRoute>) -> RelayOutgoingMessage {
    let route = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for outgoing message")
        .expect("message channel closed");
    match route {
        MessageRoute::Outgoing(message) => message,
        MessageRoute::Close => panic!("expected outgoing message, got close"),
    }
}

/// Assert nothing is emitted within `window`
pub async fn assert_silent(rx: &mut mpsc::Receiver<MessageRoute>, window: Duration) {
    if let Ok(route) = timeout(window, rx.recv()).await {
        panic!("expected no outgoing message, got {route:?}");
    }
}
