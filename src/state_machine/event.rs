//! Events that can occur on the chat screen

use crate::llm::LlmErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    InputChanged { text: String },
    InputCleared,
    Submit { text: String },
    HistoryCleared,

    // Completion events
    CompletionReceived {
        /// First candidate's first text segment, unsanitized
        text: Option<String>,
    },
    CompletionFailed { kind: LlmErrorKind },
}
