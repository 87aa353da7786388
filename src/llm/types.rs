//! Common types for completion exchanges

use crate::conversation::{ConversationHistory, Role};

/// How much of the conversation is sent with each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMode {
    /// Only the latest user text, without a role
    #[default]
    LatestOnly,
    /// Every turn of the history, with roles
    FullHistory,
}

impl ContextMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "latest" => Some(Self::LatestOnly),
            "full" => Some(Self::FullHistory),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LatestOnly => "latest",
            Self::FullHistory => "full",
        }
    }
}

/// Completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub contents: Vec<RequestContent>,
}

/// One content entry of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContent {
    pub role: Option<Role>,
    pub parts: Vec<String>,
}

impl CompletionRequest {
    /// Build the request for a history whose last turn is the one just submitted.
    pub fn from_history(history: &ConversationHistory, mode: ContextMode) -> Self {
        let contents = match mode {
            ContextMode::LatestOnly => history
                .last()
                .map(|turn| RequestContent {
                    role: None,
                    parts: vec![turn.text().to_string()],
                })
                .into_iter()
                .collect(),
            ContextMode::FullHistory => history
                .iter()
                .map(|turn| RequestContent {
                    role: Some(turn.role()),
                    parts: turn.parts().to_vec(),
                })
                .collect(),
        };
        Self { contents }
    }

    /// Text of the final content entry
    #[cfg(test)]
    pub fn latest_text(&self) -> Option<&str> {
        self.contents
            .last()
            .and_then(|c| c.parts.first())
            .map(String::as_str)
    }
}

/// Completion response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResponse {
    /// First candidate's first text segment, if the response had one
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

#[cfg(test)]
impl CompletionResponse {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
