use crate::error::{NotesError, Result};
use crate::model::TitlePolicy;
use crate::store::is_valid_key_fragment;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1000;
const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;
const DEFAULT_STATUS_DISPLAY_MS: u64 = 2000;
const MAX_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Configuration for daynotes, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotesConfig {
    /// Quiet period before mutations are written to the store
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,

    /// Quiet period after the last edit before autosave runs
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// How long "Synced to cloud" stays up before reverting to "Saved"
    #[serde(default = "default_status_display_ms")]
    pub status_display_ms: u64,

    #[serde(default)]
    pub title_policy: TitlePolicy,

    /// Prepended to every store key
    #[serde(default)]
    pub key_prefix: String,
}

fn default_save_debounce_ms() -> u64 {
    DEFAULT_SAVE_DEBOUNCE_MS
}

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}

fn default_status_display_ms() -> u64 {
    DEFAULT_STATUS_DISPLAY_MS
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            status_display_ms: DEFAULT_STATUS_DISPLAY_MS,
            title_policy: TitlePolicy::default(),
            key_prefix: String::new(),
        }
    }
}

impl NotesConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(NotesError::Io)?;
        let mut config: NotesConfig =
            serde_json::from_str(&content).map_err(NotesError::Serialization)?;
        if !is_valid_key_fragment(&config.key_prefix) {
            tracing::warn!(prefix = %config.key_prefix, "Ignoring unusable key-prefix");
            config.key_prefix.clear();
        }
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(NotesError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(NotesError::Serialization)?;
        fs::write(config_path, content).map_err(NotesError::Io)?;
        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        millis(self.save_debounce_ms)
    }

    pub fn autosave_delay(&self) -> Duration {
        millis(self.autosave_delay_ms)
    }

    pub fn status_display(&self) -> Duration {
        millis(self.status_display_ms)
    }

    /// Keys accepted by [`NotesConfig::set`] and [`NotesConfig::get`].
    pub fn keys() -> &'static [&'static str] {
        &[
            "save-debounce-ms",
            "autosave-delay-ms",
            "status-display-ms",
            "title-policy",
            "key-prefix",
        ]
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "save-debounce-ms" => Ok(self.save_debounce_ms.to_string()),
            "autosave-delay-ms" => Ok(self.autosave_delay_ms.to_string()),
            "status-display-ms" => Ok(self.status_display_ms.to_string()),
            "title-policy" => Ok(self.title_policy.to_string()),
            "key-prefix" => Ok(self.key_prefix.clone()),
            other => Err(NotesError::Api(format!("Unknown config key: {}", other))),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parse_ms = |v: &str| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| NotesError::Api(format!("{} expects milliseconds, got '{}'", key, v)))
        };
        match key {
            "save-debounce-ms" => self.save_debounce_ms = parse_ms(value)?,
            "autosave-delay-ms" => self.autosave_delay_ms = parse_ms(value)?,
            "status-display-ms" => self.status_display_ms = parse_ms(value)?,
            "title-policy" => self.title_policy = value.parse().map_err(NotesError::Api)?,
            "key-prefix" => {
                if !is_valid_key_fragment(value) {
                    return Err(NotesError::Api(format!(
                        "key-prefix may only use letters, digits, '.', '-' and '_' (and not start with '.'), got '{}'",
                        value
                    )));
                }
                self.key_prefix = value.to_string();
            }
            other => return Err(NotesError::Api(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }
}

/// Delays are capped at one day.
fn millis(ms: u64) -> Duration {
    Duration::milliseconds(ms.min(MAX_DELAY_MS) as i64)
}
