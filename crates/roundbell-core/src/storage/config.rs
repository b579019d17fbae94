//! TOML-based settings persistence.
//!
//! The timer durations, round count and acceleration parameters are stored
//! at `~/.config/roundbell/config.toml`. The accelerations on/off switch is
//! deliberately not persisted: it is a per-session choice and starts every
//! session at its default. Writes clamp: `set` routes the timer table
//! through the clamping setters before persisting, so an out-of-range value
//! never reaches the stored blob. A hand-edited file bypasses the store's
//! writes, so values coming off disk are pushed through the same setters
//! when converted into a workout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::settings::{SettingsPatch, WorkoutSettings};

/// Persisted timer fields. Deliberately has no `accelerations_enabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_preparation_secs")]
    pub preparation_secs: u32,
    #[serde(default = "default_work_secs")]
    pub work_secs: u32,
    #[serde(default = "default_rest_secs")]
    pub rest_secs: u32,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_min_acceleration_secs")]
    pub min_acceleration_secs: u32,
    #[serde(default = "default_max_acceleration_secs")]
    pub max_acceleration_secs: u32,
    #[serde(default = "default_accelerations_per_minute")]
    pub accelerations_per_minute: u32,
}

// Default functions
fn default_preparation_secs() -> u32 {
    10
}
fn default_work_secs() -> u32 {
    120
}
fn default_rest_secs() -> u32 {
    60
}
fn default_rounds() -> u32 {
    4
}
fn default_min_acceleration_secs() -> u32 {
    2
}
fn default_max_acceleration_secs() -> u32 {
    15
}
fn default_accelerations_per_minute() -> u32 {
    4
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            preparation_secs: default_preparation_secs(),
            work_secs: default_work_secs(),
            rest_secs: default_rest_secs(),
            rounds: default_rounds(),
            min_acceleration_secs: default_min_acceleration_secs(),
            max_acceleration_secs: default_max_acceleration_secs(),
            accelerations_per_minute: default_accelerations_per_minute(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/roundbell/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk; a missing file is replaced with the written default.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// The stored values as validated settings. Everything passes through
    /// the clamping setters; the enable flag comes up at its default.
    pub fn settings(&self) -> WorkoutSettings {
        let mut settings = WorkoutSettings::default();
        settings.apply(&SettingsPatch {
            preparation_secs: Some(self.timer.preparation_secs),
            work_secs: Some(self.timer.work_secs),
            rest_secs: Some(self.timer.rest_secs),
            rounds: Some(self.timer.rounds),
            accelerations_enabled: None,
            min_acceleration_secs: Some(self.timer.min_acceleration_secs),
            max_acceleration_secs: Some(self.timer.max_acceleration_secs),
            accelerations_per_minute: Some(self.timer.accelerations_per_minute),
        });
        settings
    }

    /// Store a settings snapshot (the enable flag is not written anywhere).
    pub fn set_settings(&mut self, settings: &WorkoutSettings) {
        self.timer = TimerConfig {
            preparation_secs: settings.preparation_secs(),
            work_secs: settings.work_secs(),
            rest_secs: settings.rest_secs(),
            rounds: settings.rounds(),
            min_acceleration_secs: settings.min_acceleration_secs(),
            max_acceleration_secs: settings.max_acceleration_secs(),
            accelerations_per_minute: settings.accelerations_per_minute(),
        };
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist. The stored value
    /// is the clamped one, not the raw input.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed as
    /// the existing value's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Apply a key update without persisting. The timer table goes back
    /// through the clamping setters, so an out-of-range write lands on the
    /// nearest bound (and `max >= min` is repaired) before anything is
    /// stored.
    fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let clamped = self.settings();
        self.set_settings(&clamped);
        Ok(())
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let mut current = root;
    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

            // Parse according to the existing value's type.
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    })?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?
                        .into(),
                ),
                _ => serde_json::Value::String(value.to_string()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    }

    Err(ConfigError::UnknownKey(key.to_string()))
}
