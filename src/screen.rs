//! Line-oriented terminal chat screen
//!
//! Plain lines are sent to the model; lines starting with `/` are commands.
//! A render task prints whatever changed in each published state snapshot,
//! so replies show up while the next line is being typed.

use crate::conversation::{ConversationHistory, ExchangeError, Role, Turn};
use crate::llm::CompletionService;
use crate::runtime::ConversationController;
use crate::speech::{SpeechAction, SpeechPlayer, SpeechToggle};
use crate::state_machine::ChatState;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

const HELP: &str = "\
Type a message and press Enter to send it.
  /speak N      play or stop reply N aloud
  /draft TEXT   keep TEXT as the draft without sending it
  /retry        send the draft (an unanswered message or a kept one)
  /delete       discard the draft
  /clear        clear the conversation
  /help         show this help
  /quit         leave
Start a message with // to send a literal leading slash.";

const CLEARED: &str = "-- conversation cleared --";
const WAITING: &str = "... waiting for reply";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Draft(String),
    Speak(usize),
    Retry,
    Delete,
    Clear,
    Help,
    Quit,
    Invalid(&'static str),
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    if let Some(escaped) = line.strip_prefix("//") {
        return Command::Send(format!("/{escaped}"));
    }
    let Some(command) = line.trim().strip_prefix('/') else {
        return Command::Send(line.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));
    match (name, rest) {
        ("speak", number) => number
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map_or(Command::Invalid("usage: /speak <reply number>"), Command::Speak),
        ("draft", "") => Command::Invalid("usage: /draft <text>"),
        ("draft", text) => Command::Draft(text.to_string()),
        ("retry", "") => Command::Retry,
        ("delete", "") => Command::Delete,
        ("clear", "") => Command::Clear,
        ("help", "") => Command::Help,
        ("quit" | "exit", "") => Command::Quit,
        _ => Command::Unknown(line.trim().to_string()),
    }
}

pub fn render_turn(number: usize, turn: &Turn) -> String {
    match turn.role() {
        Role::User => format!("[{number}] you: {}", turn.text()),
        Role::Model => format!("[{number}] model: {}  (/speak {number})", turn.text()),
    }
}

/// Turns successive snapshots into the lines that are new since the last one
#[derive(Debug, Default)]
pub struct TranscriptRenderer {
    shown: ConversationHistory,
    generation: u64,
    was_pending: bool,
    last_error: Option<ExchangeError>,
}

impl TranscriptRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, state: &ChatState) -> Vec<String> {
        let mut lines = Vec::new();

        let start = if state.generation == self.generation {
            self.shown.len()
        } else {
            lines.push(CLEARED.to_string());
            0
        };
        let appended = state.history.len() > start;
        for (index, turn) in state.history.iter().enumerate().skip(start) {
            lines.push(render_turn(index + 1, turn));
        }

        if state.pending && !self.was_pending {
            lines.push(WAITING.to_string());
        }

        // Snapshots can coalesce, so a repeated error still counts as new
        // when an exchange finished in between
        if let Some(err) = state.last_error {
            let finished = self.was_pending && !state.pending;
            if state.last_error != self.last_error || appended || finished {
                lines.push(format!("! {err}"));
            }
        }

        self.shown = state.history.clone();
        self.generation = state.generation;
        self.was_pending = state.pending;
        self.last_error = state.last_error;
        lines
    }
}

/// Toggle speech for reply `number` (1-based); returns the status line.
pub fn speak_turn<P: SpeechPlayer>(
    history: &ConversationHistory,
    speech: Option<&mut SpeechToggle<P>>,
    number: usize,
) -> String {
    let Some(toggle) = speech else {
        return "Speech is unavailable: no text-to-speech program configured".to_string();
    };
    let Some(turn) = number.checked_sub(1).and_then(|i| history.get(i)) else {
        return format!("There is no message {number}");
    };
    if turn.role() != Role::Model {
        return "Only model replies can be spoken".to_string();
    }

    toggle.reconcile();
    match toggle.press(turn.text()) {
        Ok(SpeechAction::Started) => format!("Speaking reply {number}"),
        Ok(SpeechAction::Stopped) => "Speech stopped".to_string(),
        Ok(SpeechAction::Ignored) => "Speech is busy".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Speech playback failed");
            "Speech playback failed".to_string()
        }
    }
}

/// Run the screen until `/quit` or end of input.
pub async fn run<C>(
    controller: Arc<ConversationController<C>>,
    mut speech: Option<SpeechToggle<Box<dyn SpeechPlayer>>>,
) -> std::io::Result<()>
where
    C: CompletionService + 'static,
{
    println!("My-GPT, powered by {}. /help lists commands.", controller.model_id());
    let render_task = tokio::spawn(render_loop(controller.subscribe()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Send(text) => spawn_submit(&controller, text),
            Command::Retry => {
                let draft = controller.state().input;
                if draft.trim().is_empty() {
                    println!("Nothing to retry");
                } else {
                    spawn_submit(&controller, draft);
                }
            }
            Command::Draft(text) => {
                controller.set_input(text);
                println!("Draft kept; /retry sends it");
            }
            Command::Delete => {
                controller.clear_input();
                println!("Draft discarded");
            }
            Command::Clear => {
                controller.clear_history();
            }
            Command::Speak(number) => {
                println!("{}", speak_turn(&controller.history(), speech.as_mut(), number));
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Invalid(usage) => println!("{usage}"),
            Command::Unknown(command) => println!("Unknown command {command}; /help lists commands"),
        }
    }

    if let Some(toggle) = speech.as_mut() {
        if let Err(e) = toggle.stop() {
            tracing::warn!(error = %e, "Failed to stop speech on exit");
        }
    }
    render_task.abort();
    Ok(())
}

fn spawn_submit<C>(controller: &Arc<ConversationController<C>>, text: String)
where
    C: CompletionService + 'static,
{
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        // Other failures reach the screen through the published state
        if let Err(ExchangeError::Busy) = controller.submit_turn(&text).await {
            println!("! {}", ExchangeError::Busy);
        }
    });
}

async fn render_loop(mut rx: watch::Receiver<ChatState>) {
    let mut renderer = TranscriptRenderer::new();
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        for line in renderer.render(&state) {
            println!("{line}");
        }
    }
}
