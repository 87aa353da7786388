//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::conversation::{ConversationHistory, ExchangeError, Role, Turn};
use crate::llm::{ContextMode, LlmErrorKind};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ChatContext {
    ChatContext::new(ContextMode::LatestOnly)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_turn() -> impl Strategy<Value = Turn> {
    (any::<bool>(), "[a-zA-Z ]{1,20}").prop_map(|(is_user, text)| {
        if is_user {
            Turn::user(text)
        } else {
            Turn::model(text)
        }
    })
}

fn arb_history() -> impl Strategy<Value = ConversationHistory> {
    proptest::collection::vec(arb_turn(), 0..6).prop_map(|turns| turns.into_iter().collect())
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::Timeout),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::MalformedResponse),
        Just(LlmErrorKind::Unknown),
    ]
}

fn arb_exchange_error() -> impl Strategy<Value = ExchangeError> {
    prop_oneof![
        Just(ExchangeError::EmptyCompletion),
        arb_error_kind().prop_map(ExchangeError::failed),
    ]
}

fn arb_state() -> impl Strategy<Value = ChatState> {
    (
        arb_history(),
        "[a-zA-Z ]{0,20}",
        any::<bool>(),
        proptest::option::of(arb_exchange_error()),
        any::<u64>(),
    )
        .prop_map(|(history, input, pending, last_error, generation)| ChatState {
            history,
            input,
            pending,
            last_error,
            generation,
        })
}

fn arb_idle_state() -> impl Strategy<Value = ChatState> {
    arb_state().prop_map(|state| ChatState {
        pending: false,
        ..state
    })
}

fn arb_pending_state() -> impl Strategy<Value = ChatState> {
    arb_state().prop_map(|state| ChatState {
        pending: true,
        ..state
    })
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,5}"
}

fn arb_message() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9*#` ]{0,20}[a-zA-Z0-9][a-zA-Z0-9*#` ]{0,20}"
}

fn arb_completion_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        proptest::option::of("[a-zA-Z*#` ]{0,30}").prop_map(|text| Event::CompletionReceived { text }),
        arb_error_kind().prop_map(|kind| Event::CompletionFailed { kind }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Non-blank text on an idle state appends exactly one user turn and
    /// asks for exactly one completion.
    #[test]
    fn prop_submit_appends_exactly_one_user_turn(state in arb_idle_state(), text in arb_message()) {
        let result = transition(&state, &test_context(), Event::Submit { text: text.clone() }).unwrap();

        prop_assert_eq!(result.new_state.history.len(), state.history.len() + 1);
        prop_assert_eq!(&result.new_state.history.turns()[..state.history.len()], state.history.turns());
        prop_assert_eq!(result.new_state.history.last(), Some(&Turn::user(text.clone())));
        prop_assert!(result.new_state.pending);
        prop_assert_eq!(result.new_state.last_error, None);

        let requests = result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::RequestCompletion { .. }))
            .count();
        prop_assert_eq!(requests, 1);
        prop_assert_eq!(result.completion_request().and_then(|r| r.latest_text()), Some(text.as_str()));
    }

    /// Blank text never changes anything, pending or not.
    #[test]
    fn prop_blank_submit_is_noop(state in arb_state(), text in arb_blank()) {
        let result = transition(&state, &test_context(), Event::Submit { text }).unwrap();
        prop_assert_eq!(result.new_state, state);
        prop_assert!(result.effects.is_empty());
    }

    /// At most one exchange in flight.
    #[test]
    fn prop_pending_rejects_submit(state in arb_pending_state(), text in arb_message()) {
        let result = transition(&state, &test_context(), Event::Submit { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    /// Any completion outcome clears pending and appends at most one model turn.
    #[test]
    fn prop_completion_clears_pending(state in arb_pending_state(), event in arb_completion_event()) {
        let result = transition(&state, &test_context(), event).unwrap();
        let new_state = result.new_state;

        prop_assert!(!new_state.pending);
        prop_assert!(result.effects.iter().all(|e| matches!(e, Effect::PublishState)));

        let added = new_state.history.len() - state.history.len();
        prop_assert!(added <= 1);
        prop_assert_eq!(&new_state.history.turns()[..state.history.len()], state.history.turns());
        if added == 1 {
            prop_assert_eq!(new_state.history.last().map(Turn::role), Some(Role::Model));
            prop_assert_eq!(new_state.last_error, None);
        } else {
            prop_assert!(new_state.last_error.is_some());
        }
    }

    /// Model turns never carry asterisks or backticks.
    #[test]
    fn prop_model_turn_is_sanitized(state in arb_pending_state(), raw in "[a-zA-Z*#` ]{1,30}") {
        let new_state = transition(&state, &test_context(), Event::CompletionReceived { text: Some(raw) })
            .unwrap()
            .new_state;
        if let Some(turn) = new_state.history.last() {
            prop_assert!(!turn.text().contains('*'));
            prop_assert!(!turn.text().contains('`'));
        }
    }

    /// Clearing always yields an empty history and keeps the rest.
    #[test]
    fn prop_clear_history_always_empty(state in arb_state()) {
        let new_state = transition(&state, &test_context(), Event::HistoryCleared).unwrap().new_state;
        prop_assert!(new_state.history.is_empty());
        prop_assert_eq!(new_state.pending, state.pending);
        prop_assert_eq!(new_state.input, state.input);
        prop_assert_ne!(new_state.generation, state.generation);
    }

    /// Only clearing starts a new history generation.
    #[test]
    fn prop_generation_only_changes_on_clear(state in arb_pending_state(), event in arb_completion_event()) {
        let new_state = transition(&state, &test_context(), event).unwrap().new_state;
        prop_assert_eq!(new_state.generation, state.generation);
    }

    /// Outcome events without a pending exchange are rejected.
    #[test]
    fn prop_completion_requires_pending(state in arb_idle_state(), event in arb_completion_event()) {
        let result = transition(&state, &test_context(), event);
        prop_assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }
}
