pub mod engine;
pub mod telephony;

// Re-export commonly used types for convenience
pub use engine::{
    ChatRole, ChatTurn, ConversationEngine, ConversationHandle, EngineError, EngineResult,
    GeminiConfig, GeminiEngine,
};

pub use telephony::{CallCreated, TelephonyError, TelephonyResult, TwilioClient, TwilioConfig};
