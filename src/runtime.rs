//! Runtime for executing chat exchanges

mod controller;

#[cfg(test)]
pub mod testing;

pub use controller::ConversationController;

use crate::llm::CompletionService;
use std::sync::Arc;

/// Controller over the configured, logging-wrapped completion service
pub type ProductionController = ConversationController<Arc<dyn CompletionService>>;
