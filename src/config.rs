//! Runtime configuration
//!
//! Everything is read from the environment once at startup. The API key is
//! never compiled in.

use crate::llm::ContextMode;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors, reported before anything starts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set; export it before starting")]
    MissingApiKey,
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Credential that never shows up in `Debug` output
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Speech program selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TtsSetting {
    /// Look for a known program on `PATH`
    #[default]
    Detect,
    Disabled,
    /// Explicit command line, text appended as the last argument
    Command(String),
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: ApiKey,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub context_mode: ContextMode,
    pub tts: TtsSetting,
    pub log_format: LogFormat,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY")
            .map(|key| ApiKey(key.trim().to_string()))
            .ok_or(ConfigError::MissingApiKey)?;

        let model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_timeout = match get("MYGPT_REQUEST_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "MYGPT_REQUEST_TIMEOUT_SECS",
                        value,
                        reason: "expected a positive number of seconds",
                    })
                }
            },
        };

        let context_mode = match get("MYGPT_CONTEXT_MODE") {
            None => ContextMode::default(),
            Some(value) => ContextMode::parse(&value).ok_or(ConfigError::Invalid {
                var: "MYGPT_CONTEXT_MODE",
                value,
                reason: "expected `latest` or `full`",
            })?,
        };

        let tts = match get("MYGPT_TTS_COMMAND") {
            None => TtsSetting::Detect,
            Some(value) if value.trim().eq_ignore_ascii_case("off") => TtsSetting::Disabled,
            Some(value) => TtsSetting::Command(value.trim().to_string()),
        };

        let log_format = match get("MYGPT_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "MYGPT_LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected `pretty` or `json`",
                })
            }
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            request_timeout,
            context_mode,
            tts,
            log_format,
        })
    }
}
