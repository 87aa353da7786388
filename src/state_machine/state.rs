//! Chat state types

use crate::conversation::{ConversationHistory, ExchangeError};
use crate::llm::ContextMode;

/// Everything the screen shows, as one value.
///
/// Replaced wholesale on every transition; renderers hold snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub history: ConversationHistory,
    /// Draft text in the input field
    pub input: String,
    /// An exchange is awaiting its reply
    pub pending: bool,
    pub last_error: Option<ExchangeError>,
    /// Bumped on every clear; within one generation the history only grows
    pub generation: u64,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Immutable settings consulted by transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatContext {
    pub context_mode: ContextMode,
}

impl ChatContext {
    pub fn new(context_mode: ContextMode) -> Self {
        Self { context_mode }
    }
}
