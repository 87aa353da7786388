//! Conversation controller
//!
//! Owns the chat state, feeds events through the pure transition function
//! and executes the resulting effects.

use crate::conversation::{ConversationHistory, ExchangeError};
use crate::llm::{CompletionRequest, CompletionService, LlmErrorKind};
use crate::state_machine::{transition, ChatContext, ChatState, Effect, Event, TransitionError};
use std::time::Duration;
use tokio::sync::watch;

/// Default bound on a single exchange
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives one chat session against a completion service.
///
/// State lives in a watch channel: every transition replaces the value and
/// subscribers see whole snapshots. The check for a pending exchange and the
/// switch to pending happen under the channel's lock, so concurrent
/// submissions cannot both start.
pub struct ConversationController<C>
where
    C: CompletionService,
{
    context: ChatContext,
    service: C,
    request_timeout: Duration,
    state_tx: watch::Sender<ChatState>,
}

impl<C> ConversationController<C>
where
    C: CompletionService,
{
    pub fn new(service: C, context: ChatContext) -> Self {
        let (state_tx, _) = watch::channel(ChatState::new());
        Self {
            context,
            service,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state_tx,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Receive every published state
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state_tx.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> ChatState {
        self.state_tx.borrow().clone()
    }

    pub fn history(&self) -> ConversationHistory {
        self.state_tx.borrow().history.clone()
    }

    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }

    /// Submit one user turn and wait for the model's reply.
    ///
    /// Blank text changes nothing and returns the current history. The user
    /// turn is published before the service is called; on failure it stays
    /// in the history and the draft is kept for a retry.
    pub async fn submit_turn(&self, text: &str) -> Result<ConversationHistory, ExchangeError> {
        let effects = match self.dispatch(Event::Submit {
            text: text.to_string(),
        }) {
            Ok((effects, _)) => effects,
            Err(TransitionError::Busy) => {
                tracing::debug!("Submission rejected, exchange already pending");
                return Err(ExchangeError::Busy);
            }
            Err(e) => {
                tracing::error!(error = %e, "Submission rejected by state machine");
                return Err(ExchangeError::failed(LlmErrorKind::Unknown));
            }
        };

        let Some(event) = self.execute_effects(effects).await else {
            // Blank submission
            return Ok(self.history());
        };

        match self.dispatch(event) {
            Ok((_, state)) => match state.last_error {
                Some(err) => Err(err),
                None => Ok(state.history),
            },
            Err(e) => {
                tracing::error!(error = %e, "Completion outcome rejected by state machine");
                Err(ExchangeError::failed(LlmErrorKind::Unknown))
            }
        }
    }

    /// Drop every turn. Allowed while an exchange is pending.
    pub fn clear_history(&self) -> ConversationHistory {
        self.apply(Event::HistoryCleared);
        self.history()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.apply(Event::InputChanged { text: text.into() });
    }

    pub fn clear_input(&self) {
        self.apply(Event::InputCleared);
    }

    /// Dispatch an event whose transition cannot fail
    fn apply(&self, event: Event) {
        if let Err(e) = self.dispatch(event) {
            tracing::error!(error = %e, "Unexpected transition failure");
        }
    }

    /// Run one transition under the channel lock; publish when asked to.
    fn dispatch(&self, event: Event) -> Result<(Vec<Effect>, ChatState), TransitionError> {
        let mut outcome = Err(TransitionError::InvalidTransition(
            "transition not evaluated".to_string(),
        ));

        self.state_tx.send_if_modified(|state| {
            match transition(state, &self.context, event) {
                Ok(result) => {
                    let publish = result.publishes();
                    *state = result.new_state;
                    outcome = Ok((result.effects, state.clone()));
                    publish
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });

        outcome
    }

    /// Execute effects; returns the completion outcome when a request was made.
    async fn execute_effects(&self, effects: Vec<Effect>) -> Option<Event> {
        let mut outcome = None;
        for effect in effects {
            match effect {
                // Already published by dispatch
                Effect::PublishState => {}
                Effect::RequestCompletion { request } => {
                    outcome = Some(self.request_completion(&request).await);
                }
            }
        }
        outcome
    }

    async fn request_completion(&self, request: &CompletionRequest) -> Event {
        match tokio::time::timeout(self.request_timeout, self.service.complete(request)).await {
            Ok(Ok(response)) => Event::CompletionReceived {
                text: response.text,
            },
            Ok(Err(e)) => {
                tracing::warn!(kind = ?e.kind, error = %e, "Completion exchange failed");
                Event::CompletionFailed { kind: e.kind }
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = %self.request_timeout.as_millis(),
                    "Completion exchange timed out"
                );
                Event::CompletionFailed {
                    kind: LlmErrorKind::Timeout,
                }
            }
        }
    }
}
