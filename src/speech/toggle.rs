//! Screen-side speech control

use super::{SpeechError, SpeechPlayer};

/// What a press of the speech control did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechAction {
    Started,
    Stopped,
    /// The player was busy with playback this toggle did not start
    Ignored,
}

/// The speech button's local `is_speaking` flag.
///
/// The flag only changes on presses. When playback ends by itself the flag
/// stays set until the next press (which then stops nothing) or until
/// [`SpeechToggle::reconcile`] re-reads the player.
pub struct SpeechToggle<P: SpeechPlayer> {
    player: P,
    is_speaking: bool,
}

impl<P: SpeechPlayer> SpeechToggle<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            is_speaking: false,
        }
    }

    #[cfg(test)]
    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    /// Stop if the flag is set, otherwise start unless the player is busy.
    pub fn press(&mut self, text: &str) -> Result<SpeechAction, SpeechError> {
        if self.is_speaking {
            self.player.stop()?;
            self.is_speaking = false;
            return Ok(SpeechAction::Stopped);
        }

        if self.player.is_speaking() {
            return Ok(SpeechAction::Ignored);
        }

        self.player.speak(text)?;
        self.is_speaking = true;
        Ok(SpeechAction::Started)
    }

    /// Align the flag with the player's real state
    pub fn reconcile(&mut self) {
        let actual = self.player.is_speaking();
        if actual != self.is_speaking {
            tracing::debug!(flag = self.is_speaking, actual, "Speech flag out of sync, correcting");
            self.is_speaking = actual;
        }
    }

    /// Halt playback regardless of the flag
    pub fn stop(&mut self) -> Result<(), SpeechError> {
        self.is_speaking = false;
        self.player.stop()
    }
}
