//! Conversation data model
//!
//! Turns, the ordered history, the reply sanitizer and the exchange error
//! taxonomy shared by the state machine and the runtime.

mod error;
mod sanitize;
mod turn;

#[cfg(test)]
mod proptests;

pub use error::ExchangeError;
pub use sanitize::sanitize;
pub use turn::{ConversationHistory, Role, Turn};
