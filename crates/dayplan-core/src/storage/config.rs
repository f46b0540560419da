//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timeline geometry (density, visible hours, snap granularity)
//! - Suggestion source endpoint and spacing policy
//! - The default user identity
//! - Keyword rules for task categorization
//!
//! Configuration is stored at `~/.config/dayplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::task::CategoryRules;
use crate::timeline::TimeScale;

/// Timeline geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_px_per_minute")]
    pub px_per_minute: f64,
    #[serde(default)]
    pub day_start_hour: u32,
    #[serde(default = "default_visible_hours")]
    pub visible_hours: u32,
    #[serde(default = "default_snap_minutes")]
    pub snap_minutes: u32,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
    /// Space left above the earliest task when the day is first shown.
    #[serde(default = "default_scroll_padding")]
    pub scroll_padding: f64,
    #[serde(default = "default_now_refresh_secs")]
    pub now_refresh_secs: u64,
}

/// Suggestion source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Endpoint that accepts the day's tasks and answers with a schedule.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Environment variable holding the bearer token, if any.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_min_gap_minutes")]
    pub min_gap_minutes: i64,
    /// Reject suggestions that overlap or crowd each other instead of only
    /// logging them.
    #[serde(default)]
    pub enforce_spacing: bool,
}

/// Identity used to scope task-store calls when none is given explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dayplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub suggestion: SuggestionConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub categories: CategoryRules,
}

fn default_px_per_minute() -> f64 {
    1.0
}
fn default_visible_hours() -> u32 {
    24
}
fn default_snap_minutes() -> u32 {
    15
}
fn default_min_height() -> f64 {
    15.0
}
fn default_scroll_padding() -> f64 {
    60.0
}
fn default_now_refresh_secs() -> u64 {
    60
}
fn default_api_key_env() -> String {
    "DAYPLAN_SUGGEST_KEY".into()
}
fn default_min_gap_minutes() -> i64 {
    15
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            px_per_minute: default_px_per_minute(),
            day_start_hour: 0,
            visible_hours: default_visible_hours(),
            snap_minutes: default_snap_minutes(),
            min_height: default_min_height(),
            scroll_padding: default_scroll_padding(),
            now_refresh_secs: default_now_refresh_secs(),
        }
    }
}

impl TimelineConfig {
    pub fn scale(&self) -> TimeScale {
        TimeScale {
            px_per_minute: self.px_per_minute,
            day_start_hour: self.day_start_hour,
            visible_hours: self.visible_hours,
            snap_minutes: self.snap_minutes,
            min_height: self.min_height,
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: default_api_key_env(),
            min_gap_minutes: default_min_gap_minutes(),
            enforce_spacing: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            suggestion: SuggestionConfig::default(),
            identity: IdentityConfig::default(),
            categories: CategoryRules::default(),
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
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

        Err(unknown())
    }

    /// Location of `config.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// # Errors
    /// Unreadable file, invalid TOML, or values out of range.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        let cfg: Config = toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    /// Serialization or write failure.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Rejects geometry the timeline cannot work with.
    ///
    /// # Errors
    /// The first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timeline;
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if !(t.px_per_minute > 0.0 && t.px_per_minute.is_finite()) {
            return Err(invalid("timeline.px_per_minute", "must be a positive number"));
        }
        if t.day_start_hour > 23 {
            return Err(invalid("timeline.day_start_hour", "must be between 0 and 23"));
        }
        if t.visible_hours == 0 || t.day_start_hour + t.visible_hours > 24 {
            return Err(invalid(
                "timeline.visible_hours",
                "must be at least 1 and end by midnight",
            ));
        }
        if t.snap_minutes == 0 || t.snap_minutes > 60 {
            return Err(invalid("timeline.snap_minutes", "must be between 1 and 60"));
        }
        if t.min_height < 0.0 {
            return Err(invalid("timeline.min_height", "must not be negative"));
        }
        if self.suggestion.min_gap_minutes < 0 {
            return Err(invalid("suggestion.min_gap_minutes", "must not be negative"));
        }
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

    /// Set a config value by key. Returns error if key is unknown or the
    /// result does not validate; `self` is unchanged on error.
    ///
    /// # Errors
    ///
    /// Unknown key, unparseable value, or a value out of range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let next: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        next.validate()?;
        *self = next;
        Ok(())
    }
}
