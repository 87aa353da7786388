//! My-GPT - terminal chat with a hosted Gemini model
//!
//! Keeps an append-only conversation, sends each message to the
//! `generateContent` endpoint, and can read replies aloud.

mod config;
mod conversation;
mod llm;
mod runtime;
mod screen;
mod speech;
mod state_machine;

use config::{ChatConfig, LogFormat, TtsSetting};
use llm::{CompletionService, GeminiService, LoggingService};
use runtime::{ConversationController, ProductionController};
use speech::{CommandSpeechPlayer, SpeechPlayer, SpeechToggle};
use state_machine::ChatContext;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChatConfig::from_env()?;

    // Logs go to stderr so they never interleave with the transcript on stdout
    let fmt_layer = match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mygpt=warn".into()),
        )
        .with(fmt_layer)
        .init();

    let gemini = GeminiService::new(
        config.api_key.expose(),
        &config.model,
        &config.base_url,
        config.request_timeout,
    )?;
    let service: Arc<dyn CompletionService> = Arc::new(LoggingService::new(Arc::new(gemini)));

    let controller: ProductionController =
        ConversationController::new(service, ChatContext::new(config.context_mode))
            .with_request_timeout(config.request_timeout);

    let speech = speech_player(&config.tts).map(|player| {
        tracing::info!(program = %player.program(), "Speech enabled");
        SpeechToggle::new(Box::new(player) as Box<dyn SpeechPlayer>)
    });
    if speech.is_none() {
        tracing::info!("No speech program available, /speak disabled");
    }

    tracing::info!(
        model = %config.model,
        base_url = %config.base_url,
        context_mode = config.context_mode.as_str(),
        timeout_secs = config.request_timeout.as_secs(),
        "Starting chat"
    );

    screen::run(Arc::new(controller), speech).await?;
    Ok(())
}

fn speech_player(setting: &TtsSetting) -> Option<CommandSpeechPlayer> {
    match setting {
        TtsSetting::Detect => CommandSpeechPlayer::detect(),
        TtsSetting::Command(line) => CommandSpeechPlayer::from_command_line(line),
        TtsSetting::Disabled => None,
    }
}
