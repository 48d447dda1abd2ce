//! ConversationRelay WebSocket handler
//!
//! Drives one channel's lifecycle: upgrade, receive loop, event dispatch,
//! and deterministic cleanup. Events on a single channel are dispatched
//! strictly in arrival order; prompt generations run on a dedicated worker
//! task so the receive loop stays responsive to `interrupt` while a reply
//! is in flight. Generations for the same call serialize in FIFO order on
//! the conversation handle's history lock.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::messages::{MessageRoute, RelayIncomingMessage, RelayOutgoingMessage};
use super::state::{ConnectionState, SessionPhase};
use crate::core::engine::{ConversationEngine, ConversationHandle};
use crate::session::SessionStore;
use crate::state::AppState;

/// Channel buffer size for message routing
const CHANNEL_BUFFER_SIZE: usize = 64;

/// One queued prompt generation
pub struct GenerationJob {
    pub call_sid: String,
    pub voice_prompt: String,
    pub handle: ConversationHandle,
    /// Cancelled by `interrupt` or channel teardown
    pub cancel: CancellationToken,
}

/// Everything one channel's event dispatch needs.
///
/// Owned by the receive loop; integration tests construct one directly with
/// a stub engine and inspect the routed messages.
pub struct RelayChannel {
    pub state: Arc<RwLock<ConnectionState>>,
    pub message_tx: mpsc::Sender<MessageRoute>,
    pub generation_tx: mpsc::Sender<GenerationJob>,
    pub sessions: SessionStore,
    pub engine: Arc<dyn ConversationEngine>,
    /// Cancelled on teardown so the generation worker drains immediately
    pub shutdown: CancellationToken,
}

impl RelayChannel {
    pub fn new(
        app_state: &AppState,
        message_tx: mpsc::Sender<MessageRoute>,
        generation_tx: mpsc::Sender<GenerationJob>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(ConnectionState::new())),
            message_tx,
            generation_tx,
            sessions: app_state.sessions.clone(),
            engine: Arc::clone(&app_state.engine),
            shutdown: CancellationToken::new(),
        }
    }

    /// Tear the channel down: cancel any in-flight generation, remove the
    /// session (a no-op if setup never completed), and enter `Closed`.
    /// Safe to call more than once.
    pub async fn close(&self) {
        self.shutdown.cancel();

        let mut state = self.state.write().await;
        state.cancel_generation();
        state.phase = SessionPhase::Closed;

        if let Some(call_sid) = state.call_sid.take() {
            self.sessions.remove(&call_sid);
            info!(call_sid = %call_sid, "Relay channel closed, session cleared");
        } else {
            debug!("Relay channel closed before setup completed");
        }
    }
}

/// ConversationRelay WebSocket handler.
///
/// Upgrades the HTTP connection to the bidirectional text-event channel for
/// one phone call.
pub async fn relay_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("ConversationRelay WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_relay_socket(socket, state))
}

/// Run one channel to completion: receive loop, then cleanup
async fn handle_relay_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("ConversationRelay connection established");

    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<MessageRoute>(CHANNEL_BUFFER_SIZE);
    let (generation_tx, generation_rx) = mpsc::channel::<GenerationJob>(CHANNEL_BUFFER_SIZE);

    // Sender task for outgoing messages
    let sender_task = tokio::spawn(async move {
        while let Some(route) = message_rx.recv().await {
            match route {
                MessageRoute::Outgoing(message) => match serde_json::to_string(&message) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to serialize outgoing message: {e}");
                    }
                },
                MessageRoute::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let channel = RelayChannel::new(&app_state, message_tx.clone(), generation_tx);

    // Worker that answers prompts sequentially, off the receive loop
    let generation_task = tokio::spawn(run_generation_worker(
        generation_rx,
        message_tx,
        Arc::clone(&app_state.engine),
        channel.shutdown.clone(),
    ));

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(msg) => {
                if !process_relay_message(msg, &channel).await {
                    break;
                }
            }
            Err(e) => {
                warn!("ConversationRelay WebSocket error: {e}");
                break;
            }
        }
    }

    channel.close().await;
    drop(channel);

    // A reply still in flight finds the routing channel gone and is discarded.
    sender_task.abort();
    let _ = generation_task.await;

    info!("ConversationRelay connection terminated");
}

/// Process one raw WebSocket frame.
///
/// Returns `false` to terminate the channel: on a close frame, or on a
/// transport-level decode failure (a text frame that is not JSON at all).
pub async fn process_relay_message(msg: Message, channel: &RelayChannel) -> bool {
    match msg {
        Message::Text(text) => {
            let event = match RelayIncomingMessage::decode(&text) {
                Ok(event) => event,
                Err(e) => {
                    error!("Undecodable ConversationRelay frame, closing channel: {e}");
                    let _ = channel.message_tx.send(MessageRoute::Close).await;
                    return false;
                }
            };
            handle_relay_incoming(event, channel).await
        }
        Message::Binary(data) => {
            debug!("Ignoring {} byte binary frame on text channel", data.len());
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            info!("ConversationRelay close frame received");
            false
        }
    }
}

/// Dispatch one decoded event against the channel's state machine.
///
/// Returns `true` to keep the channel open; protocol violations and unknown
/// events are logged and ignored, never fatal.
pub async fn handle_relay_incoming(event: RelayIncomingMessage, channel: &RelayChannel) -> bool {
    match event {
        RelayIncomingMessage::Setup { call_sid } => handle_setup(call_sid, channel).await,
        RelayIncomingMessage::Prompt { voice_prompt } => {
            handle_prompt(voice_prompt, channel).await
        }
        RelayIncomingMessage::Interrupt => handle_interrupt(channel).await,
        RelayIncomingMessage::Unknown { raw } => {
            warn!(event = %raw, "Unknown ConversationRelay event, ignoring");
            true
        }
    }
}

async fn handle_setup(call_sid: String, channel: &RelayChannel) -> bool {
    let mut state = channel.state.write().await;
    match state.phase {
        SessionPhase::AwaitingSetup => {
            channel.sessions.create(&call_sid, channel.engine.as_ref());
            info!(call_sid = %call_sid, "Setup received, session registered");
            state.call_sid = Some(call_sid);
            state.phase = SessionPhase::Active;
        }
        SessionPhase::Active => {
            warn!(
                bound = ?state.call_sid,
                incoming = %call_sid,
                "Setup received on an active channel, ignoring"
            );
        }
        SessionPhase::Closed => {}
    }
    true
}

async fn handle_prompt(voice_prompt: String, channel: &RelayChannel) -> bool {
    // Every outstanding generation shares the channel's current cancellation
    // token, so one interrupt covers queued turns as well as the in-flight one.
    let (call_sid, cancel) = {
        let state = channel.state.read().await;
        if state.phase != SessionPhase::Active {
            warn!("Prompt received before setup, ignoring");
            return true;
        }
        (state.call_sid.clone(), state.generation.clone())
    };
    let Some(call_sid) = call_sid else {
        warn!("Prompt received with no bound call SID, ignoring");
        return true;
    };

    // Session may have been removed out from under a reconnecting channel
    let Some(handle) = channel.sessions.get(&call_sid) else {
        warn!(call_sid = %call_sid, "Prompt for unknown session, ignoring");
        return true;
    };

    debug!(call_sid = %call_sid, "Processing prompt");

    let job = GenerationJob {
        call_sid,
        voice_prompt,
        handle,
        cancel,
    };
    if channel.generation_tx.send(job).await.is_err() {
        warn!("Generation worker gone, dropping prompt");
    }
    true
}

async fn handle_interrupt(channel: &RelayChannel) -> bool {
    let mut state = channel.state.write().await;
    match state.phase {
        SessionPhase::Active => {
            info!(
                call_sid = ?state.call_sid,
                "Interrupt received, cancelling outstanding generations"
            );
            state.cancel_generation();
        }
        SessionPhase::AwaitingSetup => {
            warn!("Interrupt received before setup, ignoring");
        }
        SessionPhase::Closed => {}
    }
    true
}

/// Answer queued prompts one at a time, in arrival order.
///
/// Each job honors its cancellation token both while the backend call is in
/// flight and again before the reply is written, so an interrupted turn
/// never reaches the caller. Backend failures drop the turn and keep the
/// channel open.
pub async fn run_generation_worker(
    mut jobs: mpsc::Receiver<GenerationJob>,
    message_tx: mpsc::Sender<MessageRoute>,
    engine: Arc<dyn ConversationEngine>,
    shutdown: CancellationToken,
) {
    while let Some(job) = jobs.recv().await {
        if shutdown.is_cancelled() {
            return;
        }
        if job.cancel.is_cancelled() {
            debug!(call_sid = %job.call_sid, "Skipping interrupted turn");
            continue;
        }

        let reply = tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = job.cancel.cancelled() => {
                info!(call_sid = %job.call_sid, "Generation interrupted before completion");
                continue;
            }
            reply = engine.get_reply(&job.handle, &job.voice_prompt) => reply,
        };

        match reply {
            Ok(token) => {
                if job.cancel.is_cancelled() {
                    info!(call_sid = %job.call_sid, "Discarding reply for interrupted turn");
                    continue;
                }
                let outgoing = RelayOutgoingMessage::Text { token, last: true };
                if message_tx.send(MessageRoute::Outgoing(outgoing)).await.is_err() {
                    // Channel torn down while the reply was in flight
                    debug!(call_sid = %job.call_sid, "Channel closed before reply could be sent");
                    return;
                }
                debug!(call_sid = %job.call_sid, "Reply sent");
            }
            Err(e) => {
                error!(
                    call_sid = %job.call_sid,
                    error = %e,
                    "Engine call failed, dropping turn"
                );
            }
        }
    }
}
