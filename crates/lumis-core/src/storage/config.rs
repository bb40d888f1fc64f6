//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Daily light goal
//! - Credit rates and lux thresholds
//! - Notification preferences
//! - Premium entitlement flag
//! - Sync backend URL
//!
//! Configuration is stored at `~/.config/lumis/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::tracker::CreditPolicy;

/// Goal-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Credited minutes needed to complete a day.
    #[serde(default = "default_daily_goal_minutes")]
    pub daily_goal_minutes: f64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Hour (local, 0-23) of the morning reminder.
    #[serde(default = "default_morning_hour")]
    pub morning_reminder_hour: u8,
    /// Hour (local, 0-23) of the evening streak-at-risk reminder.
    #[serde(default = "default_streak_hour")]
    pub streak_reminder_hour: u8,
}

/// Sync backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_url")]
    pub base_url: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lumis/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub goal: GoalConfig,
    #[serde(default)]
    pub credit: CreditPolicy,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    /// Premium entitlement: lifts the blocked-app cap.
    #[serde(default)]
    pub premium: bool,
}

// Default functions
fn default_daily_goal_minutes() -> f64 {
    15.0
}
fn default_morning_hour() -> u8 {
    7
}
fn default_streak_hour() -> u8 {
    20
}
fn default_true() -> bool {
    true
}
fn default_sync_url() -> String {
    "https://api.lumis.app".into()
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            daily_goal_minutes: default_daily_goal_minutes(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            morning_reminder_hour: default_morning_hour(),
            streak_reminder_hour: default_streak_hour(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: default_sync_url(),
            enabled: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            goal: GoalConfig::default(),
            credit: CreditPolicy::default(),
            notifications: NotificationsConfig::default(),
            sync: SyncConfig::default(),
            premium: false,
        }
    }
}

impl Config {
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
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err("config key is empty".into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| format!("unknown config key: {key}"))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| format!("cannot parse '{value}' as number"))?
                        } else {
                            return Err(format!("cannot parse '{value}' as number").into());
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value)?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
        }

        Err(format!("unknown config key: {key}").into())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?
            .join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| {
                    ConfigError::LoadFailed {
                        path,
                        message: e.to_string(),
                    }
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |e: &dyn std::fmt::Display| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(&e))?;
        Self::set_json_value_by_path(&mut json, key, value).map_err(|e| invalid(&e))?;
        *self = serde_json::from_value(json).map_err(|e| invalid(&e))?;
        self.save()?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
