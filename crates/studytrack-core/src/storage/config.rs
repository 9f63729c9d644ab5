//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus/break durations per session category
//! - Auto-start behaviour of breaks and focus phases
//! - Streak freeze seed and milestones
//! - Starting level and daily study goal
//! - Reminder notification times
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::SessionCategory;

/// Timer durations (minutes) and auto-start defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_pomodoro_focus")]
    pub pomodoro_focus: u32,
    #[serde(default = "default_short_break")]
    pub pomodoro_break: u32,
    #[serde(default = "default_deep_work_focus")]
    pub deep_work_focus: u32,
    #[serde(default = "default_deep_work_break")]
    pub deep_work_break: u32,
    #[serde(default = "default_short_focus")]
    pub short_focus_focus: u32,
    #[serde(default = "default_short_break")]
    pub short_focus_break: u32,
    /// Used until the user saves their own custom durations.
    #[serde(default = "default_custom_focus")]
    pub custom_focus: u32,
    #[serde(default = "default_short_break")]
    pub custom_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    /// Every Nth completed focus cycle of a repeating category takes the long break.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default = "default_true")]
    pub auto_start_break: bool,
    #[serde(default)]
    pub auto_start_focus: bool,
}

/// Streak engine seed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "default_initial_freezes")]
    pub initial_freezes: u32,
    #[serde(default = "default_milestones")]
    pub milestones: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default = "default_starting_level")]
    pub starting_level: u32,
    #[serde(default)]
    pub starting_xp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsConfig {
    #[serde(default = "default_daily_goal_hours")]
    pub daily_goal_hours: f64,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Schedule the recurring motivation/lunch/evening reminders.
    #[serde(default = "default_true")]
    pub daily_reminders: bool,
    #[serde(default = "default_morning_hour")]
    pub morning_hour: u32,
    #[serde(default = "default_lunch_hour")]
    pub lunch_hour: u32,
    #[serde(default = "default_evening_hour")]
    pub evening_hour: u32,
    #[serde(default = "default_streak_protection_hour")]
    pub streak_protection_hour: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub level: LevelConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_pomodoro_focus() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_deep_work_focus() -> u32 {
    90
}
fn default_deep_work_break() -> u32 {
    20
}
fn default_short_focus() -> u32 {
    15
}
fn default_custom_focus() -> u32 {
    30
}
fn default_long_break() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_initial_freezes() -> u32 {
    3
}
fn default_milestones() -> Vec<u32> {
    vec![3, 7, 14, 30, 50, 100, 365]
}
fn default_starting_level() -> u32 {
    1
}
fn default_daily_goal_hours() -> f64 {
    5.0
}
fn default_morning_hour() -> u32 {
    8
}
fn default_lunch_hour() -> u32 {
    12
}
fn default_evening_hour() -> u32 {
    18
}
fn default_streak_protection_hour() -> u32 {
    21
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pomodoro_focus: default_pomodoro_focus(),
            pomodoro_break: default_short_break(),
            deep_work_focus: default_deep_work_focus(),
            deep_work_break: default_deep_work_break(),
            short_focus_focus: default_short_focus(),
            short_focus_break: default_short_break(),
            custom_focus: default_custom_focus(),
            custom_break: default_short_break(),
            long_break: default_long_break(),
            long_break_interval: default_long_break_interval(),
            auto_start_break: true,
            auto_start_focus: false,
        }
    }
}

impl TimerConfig {
    /// Configured focus minutes for a category. Custom returns the
    /// configured fallback; the timer overrides it with saved values.
    pub fn focus_minutes(&self, category: SessionCategory) -> u32 {
        match category {
            SessionCategory::Pomodoro => self.pomodoro_focus,
            SessionCategory::DeepWork => self.deep_work_focus,
            SessionCategory::ShortFocus => self.short_focus_focus,
            SessionCategory::Custom => self.custom_focus,
        }
    }

    pub fn break_minutes(&self, category: SessionCategory) -> u32 {
        match category {
            SessionCategory::Pomodoro => self.pomodoro_break,
            SessionCategory::DeepWork => self.deep_work_break,
            SessionCategory::ShortFocus => self.short_focus_break,
            SessionCategory::Custom => self.custom_break,
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            initial_freezes: default_initial_freezes(),
            milestones: default_milestones(),
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            starting_level: default_starting_level(),
            starting_xp: 0,
        }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            daily_goal_hours: default_daily_goal_hours(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_reminders: true,
            morning_hour: default_morning_hour(),
            lunch_hour: default_lunch_hour(),
            evening_hour: default_evening_hour(),
            streak_protection_hour: default_streak_protection_hour(),
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
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
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

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning defaults on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
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

    /// Set a config value by dot-separated key. The caller persists.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not parse
    /// as the existing value's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
