//! Speech player backed by a system text-to-speech program

use super::{SpeechError, SpeechPlayer};
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::{Child, Command};

#[cfg(unix)]
use nix::sys::signal::{killpg, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Programs tried, in order, when none is configured
const KNOWN_PROGRAMS: [&str; 4] = ["espeak-ng", "espeak", "spd-say", "say"];

/// Runs `program args... -- <text>` per utterance.
///
/// The program gets its own process group so `stop` also reaches any audio
/// helpers it forks. Must be used inside a tokio runtime.
pub struct CommandSpeechPlayer {
    program: String,
    args: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl CommandSpeechPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: Mutex::new(None),
        }
    }

    /// Build from a whitespace-separated command line; `None` if it is blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self::new(program, words.collect()))
    }

    /// First known TTS program found on `PATH`
    pub fn detect() -> Option<Self> {
        KNOWN_PROGRAMS.iter().find_map(|name| {
            which::which(name).ok().map(|path| {
                tracing::debug!(program = %path.display(), "Found speech program");
                Self::new(path.to_string_lossy(), vec![])
            })
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Child>> {
        // A poisoned lock only means a panic elsewhere; the slot is still usable
        self.child
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[cfg(unix)]
    fn kill_process_group(child: &mut Child) -> Result<(), SpeechError> {
        if let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) {
            match killpg(Pid::from_raw(pid), Signal::SIGTERM) {
                Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
                Err(e) => return Err(SpeechError::Stop(e.to_string())),
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn kill_process_group(child: &mut Child) -> Result<(), SpeechError> {
        child
            .start_kill()
            .map_err(|e| SpeechError::Stop(e.to_string()))
    }
}

impl SpeechPlayer for CommandSpeechPlayer {
    fn is_speaking(&self) -> bool {
        let mut slot = self.lock();
        let running = match slot.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        };
        if !running {
            *slot = None;
        }
        running
    }

    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if self.is_speaking() {
            tracing::debug!("Speech already playing, ignoring request");
            return Ok(());
        }

        let mut cmd = Command::new(&self.program);
        // `--` keeps replies starting with `-` from being read as options
        cmd.args(&self.args)
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|source| SpeechError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        tracing::debug!(program = %self.program, pid = ?child.id(), chars = text.chars().count(), "Speech started");
        *self.lock() = Some(child);
        Ok(())
    }

    fn stop(&self) -> Result<(), SpeechError> {
        let Some(mut child) = self.lock().take() else {
            return Ok(());
        };
        Self::kill_process_group(&mut child)?;
        // Reap in the background; kill_on_drop covers the leader if SIGTERM was ignored
        tokio::spawn(async move {
            let _ = child.wait().await;
        });
        tracing::debug!(program = %self.program, "Speech stopped");
        Ok(())
    }
}
