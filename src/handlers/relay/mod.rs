//! Twilio ConversationRelay WebSocket handlers
//!
//! One channel carries one phone call's text events. After the WebSocket
//! upgrade the channel walks a small state machine:
//!
//! ## Client → Server
//!
//! - **setup**: binds the channel to a call SID and registers its session
//! - **prompt**: a transcribed caller utterance to answer
//! - **interrupt**: the caller spoke over playback; cancel the current reply
//! - anything else: logged and ignored
//!
//! ## Server → Client
//!
//! - **text**: the spoken reply content, always sent as a single final chunk
//!   (`last: true`). The wire format supports multi-chunk streaming; this
//!   implementation deliberately does not use it.

mod handler;
pub mod messages;
pub mod state;

pub use handler::{
    GenerationJob, RelayChannel, handle_relay_incoming, process_relay_message, relay_handler,
    run_generation_worker,
};
