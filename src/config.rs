//! Configuration management for Askaday
//!
//! This module handles loading, parsing, and validating configuration
//! from files, with CLI and environment overrides applied by the caller.

use crate::error::{AskadayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Askaday
///
/// Holds everything the agent needs: where the session store lives, the
/// fixed timezone the daily schedule runs in, and console chat settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Session store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Daily schedule configuration
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Console chat configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Path to the sled database directory
    ///
    /// When unset, the platform data directory is used. The
    /// `ASKADAY_STORE` environment variable overrides both.
    #[serde(default)]
    pub path: Option<String>,
}

/// Daily schedule configuration
///
/// The agent runs in a single fixed timezone; "daily at HH:MM" is
/// interpreted against this offset with no daylight-saving adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Fixed UTC offset in whole hours for all reminder times
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,
}

fn default_utc_offset_hours() -> i8 {
    3
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

/// Console chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// User id the console session is attributed to
    #[serde(default = "default_console_user")]
    pub console_user: u64,
}

fn default_console_user() -> u64 {
    1
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            console_user: default_console_user(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// A missing file is not an error: defaults are returned so the agent
    /// can run without any configuration on disk.
    ///
    /// # Errors
    ///
    /// Returns `AskadayError::Yaml` if the file exists but cannot be parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(AskadayError::Io)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(AskadayError::Yaml)?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `AskadayError::Config` if any setting is out of range.
    pub fn validate(&self) -> Result<()> {
        let offset = self.schedule.utc_offset_hours;
        if !(-12..=14).contains(&offset) {
            return Err(AskadayError::Config(format!(
                "utc_offset_hours must be within [-12, 14], got {}",
                offset
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.schedule.utc_offset_hours, 3);
        assert_eq!(config.chat.console_user, 1);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load("/nonexistent/config.yaml").expect("load failed");
        assert_eq!(config.schedule.utc_offset_hours, 3);
    }

    #[test]
    fn test_load_parses_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "storage:\n  path: /tmp/askaday-test\nschedule:\n  utc_offset_hours: 0\n",
        )
        .expect("write config");

        let config = Config::load(&path).expect("load failed");
        assert_eq!(config.storage.path.as_deref(), Some("/tmp/askaday-test"));
        assert_eq!(config.schedule.utc_offset_hours, 0);
        // Unspecified section falls back to its default
        assert_eq!(config.chat.console_user, 1);
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "storage: [not a map").expect("write config");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_offset() {
        let mut config = Config::default();
        config.schedule.utc_offset_hours = 15;
        assert!(config.validate().is_err());

        config.schedule.utc_offset_hours = -13;
        assert!(config.validate().is_err());

        config.schedule.utc_offset_hours = -12;
        assert!(config.validate().is_ok());
    }
}
