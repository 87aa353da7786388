//! Effects produced by state transitions

use crate::llm::CompletionRequest;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Push the new state to renderers
    PublishState,

    /// Call the completion service
    RequestCompletion { request: CompletionRequest },
}

impl Effect {
    pub fn request_completion(request: CompletionRequest) -> Self {
        Effect::RequestCompletion { request }
    }
}
