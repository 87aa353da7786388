//! Text-to-speech playback of model replies

mod command;
mod toggle;

pub use command::CommandSpeechPlayer;
pub use toggle::{SpeechAction, SpeechToggle};

use std::sync::Arc;
use thiserror::Error;

/// Speech playback failures
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Failed to start speech program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to stop speech playback: {0}")]
    Stop(String),
}

/// A playback device for reply text
pub trait SpeechPlayer: Send + Sync {
    /// Whether playback is currently active
    fn is_speaking(&self) -> bool;

    /// Begin playback. A no-op while already speaking.
    fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Halt playback immediately
    fn stop(&self) -> Result<(), SpeechError>;
}

impl<T: SpeechPlayer + ?Sized> SpeechPlayer for Arc<T> {
    fn is_speaking(&self) -> bool {
        (**self).is_speaking()
    }

    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        (**self).speak(text)
    }

    fn stop(&self) -> Result<(), SpeechError> {
        (**self).stop()
    }
}

impl<T: SpeechPlayer + ?Sized> SpeechPlayer for Box<T> {
    fn is_speaking(&self) -> bool {
        (**self).is_speaking()
    }

    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        (**self).speak(text)
    }

    fn stop(&self) -> Result<(), SpeechError> {
        (**self).stop()
    }
}
