//! Per-channel connection state

use tokio_util::sync::CancellationToken;

/// Lifecycle phase of one ConversationRelay channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Initial state; only a `setup` event is meaningful
    #[default]
    AwaitingSetup,
    /// Setup received, session registered, prompts are answered
    Active,
    /// Terminal; entered on disconnect or fatal decode error
    Closed,
}

/// Mutable state shared between a channel's receive loop and its generation
/// worker. Touched only by the task owning the channel, plus teardown.
#[derive(Debug, Default)]
pub struct ConnectionState {
    pub phase: SessionPhase,
    /// Call SID bound by the `setup` event
    pub call_sid: Option<String>,
    /// Cancellation signal shared by every outstanding generation, queued or
    /// in flight. Each dispatched prompt clones the current token; an
    /// interrupt cancels it and installs a fresh one for later prompts.
    pub generation: CancellationToken,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every outstanding generation and start a fresh epoch
    pub fn cancel_generation(&mut self) {
        let token = std::mem::take(&mut self.generation);
        token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ConnectionState::new();
        assert_eq!(state.phase, SessionPhase::AwaitingSetup);
        assert!(state.call_sid.is_none());
        assert!(!state.generation.is_cancelled());
    }

    #[test]
    fn test_cancel_generation_starts_fresh_epoch() {
        let mut state = ConnectionState::new();
        let in_flight = state.generation.clone();
        let queued = state.generation.clone();

        state.cancel_generation();
        assert!(in_flight.is_cancelled());
        assert!(queued.is_cancelled());
        assert!(!state.generation.is_cancelled());

        // Later prompts clone the new token, unaffected by the old epoch
        let next = state.generation.clone();
        state.cancel_generation();
        assert!(next.is_cancelled());
    }
}
