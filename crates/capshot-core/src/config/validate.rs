//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "endpoint.base_url must not be empty".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.submit_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.submit_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.poll_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.poll_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.poll_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "limits.poll_attempts must be > 0".into(),
            ));
        }
        if self.scan.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "scan.supported_formats must not be empty".into(),
            ));
        }
        Ok(())
    }
}
