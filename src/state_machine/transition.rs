//! Pure state transition function

use super::{ChatContext, ChatState, Effect, Event};
use crate::conversation::{sanitize, ConversationHistory, ExchangeError, Turn};
use crate::llm::CompletionRequest;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether renderers need the new state
    pub fn publishes(&self) -> bool {
        self.effects.contains(&Effect::PublishState)
    }

    /// The completion request to issue, if any
    #[cfg(test)]
    pub fn completion_request(&self) -> Option<&CompletionRequest> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::RequestCompletion { request } => Some(request),
            Effect::PublishState => None,
        })
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("An exchange is already pending")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs and performs
/// no I/O. The input state is never modified.
pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Input field
        // ============================================================
        Event::InputChanged { text } => Ok(publish(ChatState {
            input: text,
            ..state.clone()
        })),

        Event::InputCleared => Ok(publish(ChatState {
            input: String::new(),
            ..state.clone()
        })),

        // ============================================================
        // Submission
        // ============================================================

        // Blank text is a no-op, even while pending
        Event::Submit { text } if text.trim().is_empty() => Ok(TransitionResult::new(state.clone())),

        Event::Submit { .. } if state.pending => Err(TransitionError::Busy),

        Event::Submit { text } => {
            let history = state.history.appended(Turn::user(text.clone()));
            let request = CompletionRequest::from_history(&history, context.context_mode);
            Ok(publish(ChatState {
                history,
                input: text,
                pending: true,
                last_error: None,
                ..state.clone()
            })
            .with_effect(Effect::request_completion(request)))
        }

        // ============================================================
        // Completion outcome
        // ============================================================
        Event::CompletionReceived { .. } | Event::CompletionFailed { .. } if !state.pending => {
            Err(TransitionError::InvalidTransition(format!(
                "No exchange pending for {event:?}"
            )))
        }

        Event::CompletionReceived { text } => match text.filter(|t| !t.is_empty()) {
            Some(raw) => Ok(publish(ChatState {
                history: state.history.appended(Turn::model(sanitize(&raw))),
                input: String::new(),
                pending: false,
                last_error: None,
                ..state.clone()
            })),
            None => Ok(publish(ChatState {
                pending: false,
                last_error: Some(ExchangeError::EmptyCompletion),
                ..state.clone()
            })),
        },

        Event::CompletionFailed { kind } => Ok(publish(ChatState {
            pending: false,
            last_error: Some(ExchangeError::failed(kind)),
            ..state.clone()
        })),

        // ============================================================
        // History
        // ============================================================
        Event::HistoryCleared => Ok(publish(ChatState {
            history: ConversationHistory::new(),
            generation: state.generation.wrapping_add(1),
            ..state.clone()
        })),
    }
}

fn publish(state: ChatState) -> TransitionResult {
    TransitionResult::new(state).with_effect(Effect::PublishState)
}
