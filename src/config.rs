//! Configuration management for camctl
//!
//! Provides loading, saving, and validation of runtime options: hotplug
//! polling cadence and the optional vendor proxy module.

use crate::errors::{ControlError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CamCtlConfig {
    pub monitor: MonitorConfig,
    pub vendor: VendorConfig,
}

/// Hotplug monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Snapshot interval for the polling fallback source, in milliseconds
    pub poll_interval_ms: u64,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Vendor property-set configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Proxy module required by some vendor property-set interfaces
    pub proxy_module: Option<PathBuf>,
}

impl VendorConfig {
    pub fn proxy_path(&self) -> Option<&Path> {
        self.proxy_module.as_deref()
    }
}

impl Default for CamCtlConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig {
                poll_interval_ms: 2000,
            },
            vendor: VendorConfig { proxy_module: None },
        }
    }
}

impl CamCtlConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ControlError::system(format!("Failed to read config file: {}", e))
        })?;

        let config: CamCtlConfig = toml::from_str(&contents).map_err(|e| {
            ControlError::invalid_argument(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ControlError::system(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            ControlError::system(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string)
            .map_err(|e| ControlError::system(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("camctl.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.monitor.poll_interval_ms < 100 || self.monitor.poll_interval_ms > 60_000 {
            return Err(ControlError::invalid_argument(
                "Poll interval must be between 100 and 60000 ms",
            ));
        }
        if let Some(module) = &self.vendor.proxy_module {
            if module.as_os_str().is_empty() {
                return Err(ControlError::invalid_argument(
                    "Vendor proxy module path must not be empty",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CamCtlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.monitor.poll_interval(), Duration::from_secs(2));
        assert!(config.vendor.proxy_path().is_none());
    }

    #[test]
    fn rejects_degenerate_poll_interval() {
        let mut config = CamCtlConfig::default();
        config.monitor.poll_interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::InvalidArgument);
    }

    #[test]
    fn toml_round_trip() {
        let mut config = CamCtlConfig::default();
        config.vendor.proxy_module = Some(PathBuf::from("ksproxy_vendor.dll"));

        let encoded = toml::to_string_pretty(&config).unwrap();
        let decoded: CamCtlConfig = toml::from_str(&encoded).unwrap();
        assert_eq!(
            decoded.vendor.proxy_module.as_deref(),
            Some(Path::new("ksproxy_vendor.dll"))
        );
        assert_eq!(decoded.monitor.poll_interval_ms, 2000);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config =
            CamCtlConfig::load_from_file("definitely-not-a-real-config-path.toml").unwrap();
        assert_eq!(config.monitor.poll_interval_ms, 2000);
    }
}
