//! TOML-based application configuration.
//!
//! Stores the tunables of a session:
//! - Experience needed per level
//! - Work/rest interval lengths and the work reward
//! - Chatbot reply delay
//!
//! Configuration is stored at `~/.config/smallwins/config.toml`. The
//! defaults reproduce the stock behavior exactly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::reward::DEFAULT_XP_PER_LEVEL;
use crate::timer::{TimerSettings, REST_SECS, WORK_SECS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "default_xp_per_level")]
    pub xp_per_level: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_secs")]
    pub work_secs: u64,
    #[serde(default = "default_rest_secs")]
    pub rest_secs: u64,
    #[serde(default = "default_work_reward_xp")]
    pub work_reward_xp: u64,
    #[serde(default = "default_rival_participants")]
    pub rival_participants: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/smallwins/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reward: RewardConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

fn default_xp_per_level() -> u64 {
    DEFAULT_XP_PER_LEVEL
}
fn default_work_secs() -> u64 {
    WORK_SECS
}
fn default_rest_secs() -> u64 {
    REST_SECS
}
fn default_work_reward_xp() -> u64 {
    50
}
fn default_rival_participants() -> u32 {
    2
}
fn default_reply_delay_ms() -> u64 {
    500
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            xp_per_level: default_xp_per_level(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_secs: default_work_secs(),
            rest_secs: default_rest_secs(),
            work_reward_xp: default_work_reward_xp(),
            rival_participants: default_rival_participants(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
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

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?
                    .into(),
            ),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot overwrite a section".into()));
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
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

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("falling back to default config: {e}");
                Self::default()
            }
        }
    }

    /// Reject values that would break the level formula or the timer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("reward.xp_per_level", self.reward.xp_per_level),
            ("timer.work_secs", self.timer.work_secs),
            ("timer.rest_secs", self.timer.rest_secs),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be greater than zero".into(),
                });
            }
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

    /// Set a config value by key in memory. Returns error if key is unknown
    /// or the resulting config is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            work_secs: self.timer.work_secs,
            rest_secs: self.timer.rest_secs,
            work_reward_xp: self.timer.work_reward_xp,
            rival_participants: self.timer.rival_participants,
        }
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.board.reply_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.reward.xp_per_level, 100);
        assert_eq!(parsed.timer.work_secs, 1500);
        assert_eq!(parsed.board.reply_delay_ms, 500);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\nwork_secs = 60\n").unwrap();
        assert_eq!(parsed.timer.work_secs, 60);
        assert_eq!(parsed.timer.rest_secs, 300);
        assert_eq!(parsed.reward.xp_per_level, 100);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.rest_secs").as_deref(), Some("300"));
        assert_eq!(cfg.get("timer.nope"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("timer.work_reward_xp", "75").unwrap();
        assert_eq!(cfg.timer.work_reward_xp, 75);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("timer.speed", "2").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.work_secs", "soon").is_err());
        assert!(cfg.set("timer", "1").is_err());
    }

    #[test]
    fn set_rejects_zero_duration() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.rest_secs", "0").is_err());
        assert_eq!(cfg.timer.rest_secs, 300);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.work_secs, 1500);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.set("board.reply_delay_ms", "250").unwrap();
        cfg.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.reply_delay(), Duration::from_millis(250));
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reward]\nxp_per_level = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer\nwork_secs = ").unwrap();
        match Config::load_from(&path) {
            Err(ConfigError::LoadFailed { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("Expected LoadFailed, got {other:?}"),
        }
    }
}
