//! Sub-configuration structs with defaults matching the hosted endpoint.

use serde::{Deserialize, Serialize};

/// Hosted endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// API base URL (endpoint id and route are appended)
    pub base_url: String,

    /// Serverless endpoint identifier (supports ${ENV_VAR} syntax)
    pub endpoint_id: String,

    /// Bearer token (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.runpod.ai/v2".to_string(),
            endpoint_id: "${ENDPOINT_ID}".to_string(),
            api_key: "${RUNPOD_API_KEY}".to_string(),
        }
    }
}

/// Caption output settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CaptionConfig {
    /// Literal prefix prepended to every persisted caption
    pub prefix: String,

    /// Optional prompt override sent with each request.
    /// When unset, the endpoint's built-in captioning prompt is used.
    pub prompt: Option<String>,

    /// Default target directory (with ~ expansion) when the CLI
    /// argument is omitted
    pub directory: Option<String>,
}

/// Retry policy settings for transient endpoint failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per image, including the first
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
        }
    }
}

/// Per-request time ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Synchronous captioning call timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Async job submission timeout in milliseconds
    pub submit_timeout_ms: u64,

    /// Single status poll timeout in milliseconds
    pub poll_timeout_ms: u64,

    /// Maximum status polls per async job
    pub poll_attempts: u32,

    /// Delay between status polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 120_000,
            submit_timeout_ms: 30_000,
            poll_timeout_ms: 10_000,
            poll_attempts: 60,
            poll_interval_ms: 1000,
        }
    }
}

/// Directory scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Supported input formats
    pub supported_formats: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
