//! Configuration and settings management for printhmi
//!
//! Provides configuration file handling, defaults and validation.
//! Supports JSON and TOML file formats; the default file lives in the
//! platform config directory.
//!
//! Configuration is organized into two sections:
//! - Display settings (serial device, UI catalog, response timeout)
//! - Printer host settings (Moonraker endpoint, timeouts, reconnects)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// UI catalogs that can be selected with `hmi.ui`
pub const KNOWN_UIS: &[&str] = &["openq1"];

/// Directory name under the platform config directory
pub const APP_DIR: &str = "printhmi";

/// File name of the default configuration
pub const CONFIG_FILE: &str = "config.toml";

/// Touch display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HmiSettings {
    /// Serial device of the display
    pub device: String,
    /// Baud rate of the serial link
    pub baud: u32,
    /// UI catalog key
    pub ui: String,
    /// Default response timeout in milliseconds
    pub timeout_ms: u64,
    /// Value the boot page writes to `version.val`
    pub version_marker: i64,
}

impl Default for HmiSettings {
    fn default() -> Self {
        Self {
            device: "/dev/ttyS1".to_string(),
            baud: 115200,
            ui: "openq1".to_string(),
            timeout_ms: 1000,
            version_marker: 18,
        }
    }
}

impl HmiSettings {
    /// Response timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Printer host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonrakerSettings {
    /// Host name or address, optionally with a scheme
    pub host: String,
    /// API port
    pub port: u16,
    /// API key, empty for none
    pub api_key: String,
    /// Connection attempt timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// RPC call timeout in milliseconds
    pub call_timeout_ms: u64,
    /// Pause between reconnect attempts in milliseconds
    pub reconnect_interval_ms: u64,
    /// Thumbnail download timeout in milliseconds
    pub thumbnail_timeout_ms: u64,
}

impl Default for MoonrakerSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7125,
            api_key: String::new(),
            connect_timeout_ms: 5000,
            call_timeout_ms: 10000,
            reconnect_interval_ms: 2000,
            thumbnail_timeout_ms: 5000,
        }
    }
}

impl MoonrakerSettings {
    /// API key if one is configured
    pub fn api_key(&self) -> Option<&str> {
        Some(self.api_key.as_str()).filter(|key| !key.is_empty())
    }

    /// Connection attempt timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// RPC call timeout
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Pause between reconnect attempts
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    /// Thumbnail download timeout
    pub fn thumbnail_timeout(&self) -> Duration {
        Duration::from_millis(self.thumbnail_timeout_ms)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Touch display settings
    pub hmi: HmiSettings,
    /// Printer host settings
    pub moonraker: MoonrakerSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("none").to_string()).into()),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration file path
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content).map_err(ConfigError::from)?,
            Format::Toml => toml::from_str(&content).map_err(ConfigError::from)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load an explicit file, or the default file when it exists, or defaults
    ///
    /// An explicit path must exist; a missing default file is not an error.
    pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
            Format::Toml => toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        // Display settings
        if self.hmi.device.trim().is_empty() {
            return Err(SettingsError::invalid("hmi.device", "must not be empty"));
        }
        if self.hmi.baud == 0 {
            return Err(SettingsError::invalid("hmi.baud", "must be > 0"));
        }
        if self.hmi.timeout_ms == 0 {
            return Err(SettingsError::invalid("hmi.timeout_ms", "must be > 0"));
        }
        if !KNOWN_UIS.contains(&self.hmi.ui.as_str()) {
            return Err(SettingsError::invalid(
                "hmi.ui",
                format!("unknown UI '{}', expected one of {:?}", self.hmi.ui, KNOWN_UIS),
            ));
        }

        // Host settings
        let moonraker = &self.moonraker;
        if moonraker.host.trim().is_empty() {
            return Err(SettingsError::invalid("moonraker.host", "must not be empty"));
        }
        if moonraker.port == 0 {
            return Err(SettingsError::invalid("moonraker.port", "must be > 0"));
        }
        for (key, value) in [
            ("moonraker.connect_timeout_ms", moonraker.connect_timeout_ms),
            ("moonraker.call_timeout_ms", moonraker.call_timeout_ms),
            ("moonraker.reconnect_interval_ms", moonraker.reconnect_interval_ms),
            ("moonraker.thumbnail_timeout_ms", moonraker.thumbnail_timeout_ms),
        ] {
            if value == 0 {
                return Err(SettingsError::invalid(key, "must be > 0"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.hmi.device, "/dev/ttyS1");
        assert_eq!(config.moonraker.port, 7125);
        assert_eq!(config.moonraker.api_key(), None);
        assert_eq!(config.hmi.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::new();
        config.hmi.baud = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { ref key, .. }) if key == "hmi.baud"
        ));

        let mut config = Config::new();
        config.hmi.ui = "ender3".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.moonraker.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.moonraker.call_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.moonraker.host = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [moonraker]
            host = "192.168.1.20"
            api_key = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.moonraker.host, "192.168.1.20");
        assert_eq!(config.moonraker.api_key(), Some("secret"));
        assert_eq!(config.moonraker.port, 7125);
        assert_eq!(config.hmi, HmiSettings::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let result = Config::load_from_file(Path::new("printhmi.yaml"));
        assert!(matches!(
            result,
            Err(SettingsError::Config(ConfigError::UnsupportedFormat(_)))
        ));
    }
}
