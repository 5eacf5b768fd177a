//! Runtime tunables loaded from `config.toml`
//!
//! Every key is optional. A missing file means defaults; a malformed file is
//! logged and also falls back to defaults, so a bad edit never keeps the
//! plugin from starting.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use mcdeck_core::prelude::*;
use mcdeck_device::{ClientOptions, DEFAULT_API_PATH};

const CONFIG_FILENAME: &str = "config.toml";
const CONFIG_DIR: &str = "musiccast-deck";

/// Lower bound for the appliance request timeout.
const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

/// Lower bound for the poll interval.
const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Plugin settings (`<config_dir>/musiccast-deck/config.toml`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub appliance: ApplianceSettings,

    #[serde(default)]
    pub polling: PollingSettings,

    #[serde(default)]
    pub feedback: FeedbackSettings,
}

/// How the receiver is reached
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApplianceSettings {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Path prefix of the control API
    #[serde(default = "default_api_path")]
    pub api_path: String,
}

impl Default for ApplianceSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            api_path: default_api_path(),
        }
    }
}

/// Background status polling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Button feedback after a key press
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedbackSettings {
    /// Delay before the post-toggle state is pushed, so the host's own
    /// optimistic state flip lands first.
    #[serde(default = "default_key_down_delay_ms")]
    pub key_down_delay_ms: u64,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            key_down_delay_ms: default_key_down_delay_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    3_000
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_key_down_delay_ms() -> u64 {
    1_000
}

impl PluginConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(
            self.appliance
                .request_timeout_ms
                .max(MIN_REQUEST_TIMEOUT_MS),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs.max(MIN_POLL_INTERVAL_SECS))
    }

    pub fn key_down_delay(&self) -> Duration {
        Duration::from_millis(self.feedback.key_down_delay_ms)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.request_timeout(),
            api_path: self.appliance.api_path.clone(),
        }
    }
}

/// Default location of the config file, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
}

/// Load config from `path`, or from [`default_config_path`] when `None`.
pub fn load_config(path: Option<&Path>) -> PluginConfig {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                debug!("No config directory on this platform, using defaults");
                return PluginConfig::default();
            }
        },
    };

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return PluginConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                info!("Loaded config from {:?}", config_path);
                config
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                PluginConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            PluginConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.key_down_delay(), Duration::from_secs(1));
        assert_eq!(config.appliance.api_path, "YamahaExtendedControl/v1");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml")));
        assert_eq!(config.polling.interval_secs, 10);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[polling]\ninterval_secs = 30\n").unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.key_down_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[appliance]
request_timeout_ms = 1500
api_path = "custom/v2"

[polling]
interval_secs = 5

[feedback]
key_down_delay_ms = 250
"#,
        )
        .unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.request_timeout(), Duration::from_millis(1500));
        assert_eq!(config.client_options().api_path, "custom/v2");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.key_down_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[polling\ninterval_secs = ").unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_values_are_clamped() {
        let mut config = PluginConfig::default();
        config.appliance.request_timeout_ms = 0;
        config.polling.interval_secs = 0;
        assert_eq!(config.request_timeout(), Duration::from_millis(100));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }
}
