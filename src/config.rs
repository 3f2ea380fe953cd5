use crate::error::{PracticeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the process is about to do; each task needs a different subset of settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Serve,
    Translate,
    Broadcast,
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::Serve => write!(f, "serve"),
            Task::Translate => write!(f, "translate"),
            Task::Broadcast => write!(f, "broadcast"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cloud Translation API key; the Google service is registered only when set.
    pub google_api_key: Option<String>,
    pub telegram_bot_token: Option<String>,
    /// Endpoint of the morphological analyzer.
    pub morphology_url: Option<String>,
    /// Shared secret guarding the user registry.
    pub auth_key: Option<String>,
    pub port: u16,
    /// Per-request timeout for translation services, in seconds.
    pub request_timeout_secs: u64,
    /// Timeout for the Bot API, the analyzer and the word-of-the-day page, in seconds.
    pub api_timeout_secs: u64,
    /// Pause between two messages of a broadcast, in seconds.
    pub broadcast_pause_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_api_key: None,
            telegram_bot_token: None,
            morphology_url: None,
            auth_key: None,
            port: 8080,
            request_timeout_secs: 3,
            api_timeout_secs: 10,
            broadcast_pause_secs: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GOOGLE_TRANSLATE_API_KEY") {
            self.google_api_key = Some(key);
        }
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram_bot_token = Some(token);
        }
        if let Ok(url) = std::env::var("MORPHOLOGY_URL") {
            self.morphology_url = Some(url);
        }
        if let Ok(key) = std::env::var("PRACTICE_TURKISH_AUTH_KEY") {
            self.auth_key = Some(key);
        }
        if let Ok(port) = std::env::var("PRACTICE_TURKISH_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }
        if let Ok(timeout) = std::env::var("PRACTICE_TURKISH_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.request_timeout_secs = t;
            }
        }
        if let Ok(timeout) = std::env::var("PRACTICE_TURKISH_API_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.api_timeout_secs = t;
            }
        }
        if let Ok(pause) = std::env::var("PRACTICE_TURKISH_BROADCAST_PAUSE") {
            if let Ok(p) = pause.parse() {
                self.broadcast_pause_secs = p;
            }
        }
    }

    pub fn validate(&self, task: Task) -> Result<()> {
        if self.request_timeout_secs == 0 || self.api_timeout_secs == 0 {
            return Err(PracticeError::Config(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        match task {
            Task::Serve => {
                if self.auth_key.as_deref().map_or(true, str::is_empty) {
                    return Err(PracticeError::Config(
                        "PRACTICE_TURKISH_AUTH_KEY not set. The user registry needs a shared key."
                            .to_string(),
                    ));
                }
            }
            Task::Broadcast => {
                if self.telegram_bot_token.is_none() {
                    return Err(PracticeError::Config(
                        "TELEGRAM_BOT_TOKEN not set. Export it with: export TELEGRAM_BOT_TOKEN=<id>:<secret>"
                            .to_string(),
                    ));
                }
            }
            Task::Translate => {}
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn broadcast_pause(&self) -> Duration {
        Duration::from_secs(self.broadcast_pause_secs)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("practice-turkish").join("config.toml"))
    }
}
