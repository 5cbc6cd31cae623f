//! Configuration for the pulse display.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration for the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bluetooth address of the heart-rate strap, e.g. `EB:D4:07:40:52:A0`
    pub sensor_address: Option<String>,

    /// How long the transport may take to find and connect to the sensor
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,

    /// How often the connection is checked for liveness
    #[serde(with = "duration_serde")]
    pub poll_interval: Duration,

    /// Show a `connected: true` message once the sensor is connected
    pub show_connection_status: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor_address: None,
            connect_timeout: Duration::from_secs(100),
            poll_interval: Duration::from_secs(1),
            show_connection_status: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulse-display")
            .join("config.json")
    }

    /// Check values that would make a session unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if let Some(address) = &self.sensor_address {
            if !is_valid_address(address) {
                return Err(ConfigError::Invalid(format!(
                    "sensor_address {address:?} is not of the form AA:BB:CC:DD:EE:FF"
                )));
            }
        }
        Ok(())
    }
}

/// Six colon-separated hex octets.
fn is_valid_address(address: &str) -> bool {
    let octets: Vec<&str> = address.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(100));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(config.show_connection_status);
        assert!(config.sensor_address.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"sensor_address": "EB:D4:07:40:52:A0"}"#).unwrap();
        assert_eq!(config.sensor_address.as_deref(), Some("EB:D4:07:40:52:A0"));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            sensor_address: Some("eb:d4:07:40:52:a0".to_string()),
            connect_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
            show_connection_status: false,
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate() {
        let mut config = Config {
            poll_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.poll_interval = Duration::from_secs(1);
        config.sensor_address = Some("EB:D4:07:40:52".to_string());
        assert!(config.validate().is_err());

        config.sensor_address = Some("EB:D4:07:40:52:ZZ".to_string());
        assert!(config.validate().is_err());

        config.sensor_address = Some("EB:D4:07:40:52:A0".to_string());
        assert!(config.validate().is_ok());
    }
}
