use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::attachment::AcceptFilter;
use crate::conversation::{DEFAULT_ACKNOWLEDGMENT, DEFAULT_REPLY_DELAY};

pub const DEFAULT_ASSISTANT_NAME: &str = "PrimeAI";
pub const DEFAULT_TAGLINE: &str = "Your intelligent assistant";
pub const DEFAULT_GREETING: &str =
    "Hello! I'm PrimeAI, your intelligent assistant. How can I help you today?";
pub const DEFAULT_ACCEPT: [&str; 3] = ["image/*", "video/*", "audio/*"];
pub const SETTINGS_DIRECTORY_NAME: &str = "primeai";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SETTINGS_ENV_PREFIX: &str = "PRIMEAI_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    #[serde(default = "default_tagline")]
    pub tagline: String,
    #[serde(default = "default_greeting")]
    pub greeting: Option<String>,
    #[serde(default = "default_acknowledgment")]
    pub acknowledgment: String,
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_accept")]
    pub accept: Vec<String>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            tagline: default_tagline(),
            greeting: default_greeting(),
            acknowledgment: default_acknowledgment(),
            reply_delay_ms: default_reply_delay_ms(),
            accept: default_accept(),
        }
    }
}

impl ChatSettings {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn accept_filter(&self) -> AcceptFilter {
        AcceptFilter::new(&self.accept)
    }

    /// Trims text fields and restores defaults for blank ones.
    ///
    /// A blank greeting disables the greeting rather than restoring it.
    pub fn normalized(mut self) -> Self {
        self.assistant_name = non_blank_or(self.assistant_name, default_assistant_name);
        self.tagline = non_blank_or(self.tagline, default_tagline);
        self.acknowledgment = non_blank_or(self.acknowledgment, default_acknowledgment);
        self.greeting = self
            .greeting
            .map(|greeting| greeting.trim().to_string())
            .filter(|greeting| !greeting.is_empty());
        self.accept = self
            .accept
            .into_iter()
            .map(|pattern| pattern.trim().to_string())
            .filter(|pattern| !pattern.is_empty())
            .collect();

        self
    }
}

/// Settings resolved from defaults, the JSON settings file and `PRIMEAI_*` env vars.
pub struct SettingsStore {
    settings: Arc<ChatSettings>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".primeai"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let env = Env::prefixed(SETTINGS_ENV_PREFIX);
        Self {
            settings: Arc::new(Self::load_from_sources(&config_path, env)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<ChatSettings> {
        Arc::clone(&self.settings)
    }

    // Env wins over the file, the file wins over defaults. A bad file or bad env value
    // falls back to defaults as a whole.
    fn load_from_sources(path: &Path, env: Env) -> ChatSettings {
        let mut figment = Figment::from(Serialized::defaults(ChatSettings::default()));
        if path.is_file() {
            figment = figment.merge(Json::file(path));
        } else {
            tracing::info!(path = %path.display(), "no settings file, using defaults");
        }

        match figment.merge(env).extract::<ChatSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "settings could not be parsed, using defaults"
                );
                ChatSettings::default()
            }
        }
    }
}

fn non_blank_or(value: String, fallback: fn() -> String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback()
    } else {
        trimmed.to_string()
    }
}

fn default_assistant_name() -> String {
    DEFAULT_ASSISTANT_NAME.to_string()
}

fn default_tagline() -> String {
    DEFAULT_TAGLINE.to_string()
}

fn default_greeting() -> Option<String> {
    Some(DEFAULT_GREETING.to_string())
}

fn default_acknowledgment() -> String {
    DEFAULT_ACKNOWLEDGMENT.to_string()
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY.as_millis() as u64
}

fn default_accept() -> Vec<String> {
    DEFAULT_ACCEPT
        .iter()
        .map(|pattern| pattern.to_string())
        .collect()
}
