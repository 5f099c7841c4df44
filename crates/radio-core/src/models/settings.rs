use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{
    DEFAULT_AUTO_CHECK_INTERVAL_SECS, DEFAULT_HISTORY_FILE, DEFAULT_VOICE_RATE,
};

/// User-configurable client settings (persisted to JSON file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Speech rate in words per minute
    pub voice_rate: u32,
    /// Background poll interval in seconds
    pub auto_check_interval: u64,
    /// Whether sent/received messages are appended to the history file
    pub save_messages: bool,
    pub message_history_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            voice_rate: DEFAULT_VOICE_RATE,
            auto_check_interval: DEFAULT_AUTO_CHECK_INTERVAL_SECS,
            save_messages: true,
            message_history_file: DEFAULT_HISTORY_FILE.to_string(),
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.auto_check_interval)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.voice_rate == 0 {
            return Err(SettingsError::invalid(
                SettingKey::VoiceRate,
                "0",
                "must be greater than zero",
            ));
        }
        if self.auto_check_interval == 0 {
            return Err(SettingsError::invalid(
                SettingKey::AutoCheckInterval,
                "0",
                "must be greater than zero",
            ));
        }
        if self.message_history_file.trim().is_empty() {
            return Err(SettingsError::invalid(
                SettingKey::MessageHistoryFile,
                &self.message_history_file,
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Current value of a single setting, formatted for display
    pub fn value_of(&self, key: SettingKey) -> String {
        match key {
            SettingKey::VoiceRate => self.voice_rate.to_string(),
            SettingKey::AutoCheckInterval => self.auto_check_interval.to_string(),
            SettingKey::SaveMessages => self.save_messages.to_string(),
            SettingKey::MessageHistoryFile => self.message_history_file.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    VoiceRate,
    AutoCheckInterval,
    SaveMessages,
    MessageHistoryFile,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::VoiceRate,
        SettingKey::AutoCheckInterval,
        SettingKey::SaveMessages,
        SettingKey::MessageHistoryFile,
    ];

    /// Field name as it appears in the settings file
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::VoiceRate => "voice_rate",
            SettingKey::AutoCheckInterval => "auto_check_interval",
            SettingKey::SaveMessages => "save_messages",
            SettingKey::MessageHistoryFile => "message_history_file",
        }
    }

    /// Parse `raw` and write it into `settings`. Leaves `settings` untouched on error.
    fn apply(&self, settings: &mut Settings, raw: &str) -> Result<(), SettingsError> {
        let value = raw.trim();
        match self {
            SettingKey::VoiceRate => {
                settings.voice_rate = parse_positive(*self, value)?;
            }
            SettingKey::AutoCheckInterval => {
                settings.auto_check_interval = parse_positive(*self, value)?;
            }
            SettingKey::SaveMessages => {
                settings.save_messages = parse_bool(value)
                    .ok_or_else(|| SettingsError::invalid(*self, value, "expected true or false"))?;
            }
            SettingKey::MessageHistoryFile => {
                if value.is_empty() {
                    return Err(SettingsError::invalid(*self, value, "must not be empty"));
                }
                settings.message_history_file = value.to_string();
            }
        }
        Ok(())
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SettingKey::ALL
            .into_iter()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| SettingsError::UnknownKey(s.trim().to_string()))
    }
}

fn parse_positive<T>(key: SettingKey, value: &str) -> Result<T, SettingsError>
where
    T: FromStr + PartialOrd + Default,
{
    let parsed: T = value
        .parse()
        .map_err(|_| SettingsError::invalid(key, value, "expected a whole number"))?;
    if parsed <= T::default() {
        return Err(SettingsError::invalid(key, value, "must be greater than zero"));
    }
    Ok(parsed)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: SettingKey,
        value: String,
        reason: &'static str,
    },

    #[error("Failed to write settings: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SettingsError {
    fn invalid(key: SettingKey, value: &str, reason: &'static str) -> Self {
        SettingsError::InvalidValue {
            key,
            value: value.to_string(),
            reason,
        }
    }
}

/// Settings backed by a JSON file. Every accepted update is written through.
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load settings from `path`. A missing or malformed file yields defaults.
    pub fn load<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let settings = Self::load_from_file(&path).unwrap_or_default();
        Self { path, settings }
    }

    fn load_from_file(path: &Path) -> Option<Settings> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Error loading settings from {}: {}", path.display(), e);
                return None;
            }
        };

        let settings: Settings = match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Malformed settings file {}: {}", path.display(), e);
                return None;
            }
        };

        if let Err(e) = settings.validate() {
            tracing::warn!("Ignoring settings file {}: {}", path.display(), e);
            return None;
        }
        Some(settings)
    }

    fn save_to_file(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate and apply a single change, then persist it.
    ///
    /// The in-memory settings only change once the file has been written.
    pub fn update(&mut self, key: SettingKey, raw_value: &str) -> Result<(), SettingsError> {
        let mut candidate = self.settings.clone();
        key.apply(&mut candidate, raw_value)?;
        candidate.validate()?;
        self.save_to_file(&candidate)?;
        self.settings = candidate;
        Ok(())
    }
}

/// Thread-safe wrapper for the settings store.
///
/// Readers take a snapshot; writers are serialized by the write lock.
#[derive(Clone)]
pub struct SharedSettings {
    inner: Arc<RwLock<SettingsStore>>,
}

impl SharedSettings {
    pub fn new(store: SettingsStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.inner.read().settings().clone()
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.read().settings().poll_interval()
    }

    pub fn update(&self, key: SettingKey, raw_value: &str) -> Result<(), SettingsError> {
        let mut store = self.inner.write();
        store.update(key, raw_value)?;
        tracing::info!("Setting {} updated", key);
        Ok(())
    }
}
