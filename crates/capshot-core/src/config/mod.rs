//! Configuration management for Capshot.
//!
//! Configuration is loaded from a platform config directory with sensible
//! defaults. All config structs implement `Default`, so a missing file means
//! a usable (if credential-less) configuration.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Capshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosted endpoint settings
    pub endpoint: EndpointConfig,

    /// Caption output settings
    pub caption: CaptionConfig,

    /// Retry policy settings
    pub retry: RetryConfig,

    /// Per-request time ceilings
    pub limits: LimitsConfig,

    /// Directory scan settings
    pub scan: ScanConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.capshot.capshot/config.toml
    /// - Linux: ~/.config/capshot/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\capshot\config\config.toml
    ///
    /// Falls back to ~/.capshot/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "capshot", "capshot")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".capshot").join("config.toml")
            })
    }

    /// Get the resolved target directory (with ~ expansion), if configured.
    pub fn target_directory(&self) -> Option<PathBuf> {
        self.caption
            .directory
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 2000);
        assert_eq!(config.limits.request_timeout_ms, 120_000);
        assert_eq!(config.limits.poll_attempts, 60);
    }

    #[test]
    fn test_default_formats_cover_fixed_set() {
        let config = Config::default();
        for ext in ["jpg", "jpeg", "png", "webp", "bmp"] {
            assert!(
                config.scan.supported_formats.iter().any(|f| f == ext),
                "missing format {ext}"
            );
        }
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[endpoint]"));
        assert!(toml.contains("[retry]"));
        assert!(toml.contains("[limits]"));
    }

    #[test]
    fn test_load_from_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.caption.prefix = "ALX1, ".to_string();
        config.retry.max_attempts = 5;
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.caption.prefix, "ALX1, ");
        assert_eq!(loaded.retry.max_attempts, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[caption]\nprefix = \"subject, \"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.caption.prefix, "subject, ");
        assert_eq!(loaded.retry.max_attempts, 3);
        assert_eq!(loaded.endpoint.base_url, "https://api.runpod.ai/v2");
    }

    #[test]
    fn test_target_directory_expands_tilde() {
        let mut config = Config::default();
        config.caption.directory = Some("~/photos".to_string());
        let dir = config.target_directory().unwrap();
        assert!(!dir.to_string_lossy().starts_with('~'));
    }
}
