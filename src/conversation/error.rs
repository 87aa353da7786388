//! Exchange error taxonomy

use crate::llm::LlmErrorKind;
use thiserror::Error;

/// Outcome of a failed exchange, as shown inline to the user.
///
/// The display text is the only thing the user sees; transport details are
/// logged where the failure happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// The service answered but carried no usable text
    #[error("No response received from the model")]
    EmptyCompletion,

    /// Transport or service failure
    #[error("An error occurred. Please try again!")]
    ExchangeFailed { kind: LlmErrorKind },

    /// A previous message is still awaiting its reply
    #[error("A message is already being sent")]
    Busy,
}

impl ExchangeError {
    pub fn failed(kind: LlmErrorKind) -> Self {
        Self::ExchangeFailed { kind }
    }
}
