//! Caption endpoint trait and request/response types.
//!
//! Defines the one capability the rest of the client needs — submit an
//! image, get a caption or an error — plus the factory that builds the
//! right transport (synchronous runsync or submit-and-poll) from config.

use crate::config::Config;
use crate::error::{ConfigError, RemoteError};
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to the hosted endpoint.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Base64-encoded image bytes
    pub data: String,
}

impl ImagePayload {
    /// Create an `ImagePayload` from raw image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// A request to caption one image.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    /// The image to caption
    pub image: ImagePayload,
    /// Optional prompt override; the endpoint falls back to its built-in
    /// captioning prompt when absent
    pub prompt: Option<String>,
}

impl CaptionRequest {
    pub fn new(image: ImagePayload, prompt: Option<String>) -> Self {
        Self { image, prompt }
    }
}

/// A successful reply from the endpoint.
#[derive(Debug, Clone)]
pub struct CaptionResponse {
    /// Generated caption text
    pub caption: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait implemented by every endpoint transport.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn CaptionEndpoint>` for dynamic dispatch).
#[async_trait]
pub trait CaptionEndpoint: Send + Sync {
    /// Transport name for logging (e.g., "runsync", "polling").
    fn name(&self) -> &str;

    /// Perform one captioning attempt. One call is one attempt — retries
    /// belong to the caller.
    async fn submit(&self, request: &CaptionRequest) -> Result<CaptionResponse, RemoteError>;

    /// Hard ceiling on a single `submit` call.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Which transport to use for captioning calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Blocking `/runsync` call
    Runsync,
    /// `/run` submission followed by status polling
    Polling,
}

/// Resolved endpoint credentials shared by both transports.
#[derive(Debug, Clone)]
pub(crate) struct EndpointAuth {
    pub base_url: String,
    pub endpoint_id: String,
    pub api_key: String,
}

impl EndpointAuth {
    /// Resolve credentials from config, failing on anything unset.
    ///
    /// Missing credentials are a fatal precondition — the batch must not
    /// start, rather than fail once per image.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let endpoint_id = resolve_env_var(&config.endpoint.endpoint_id).ok_or_else(|| {
            ConfigError::MissingCredential(
                "endpoint.endpoint_id not set. Set the ENDPOINT_ID env var.".to_string(),
            )
        })?;
        let api_key = resolve_env_var(&config.endpoint.api_key).ok_or_else(|| {
            ConfigError::MissingCredential(
                "endpoint.api_key not set. Set the RUNPOD_API_KEY env var.".to_string(),
            )
        })?;
        Ok(Self {
            base_url: config.endpoint.base_url.trim_end_matches('/').to_string(),
            endpoint_id,
            api_key,
        })
    }
}

/// Factory that creates the appropriate transport from config.
pub struct EndpointFactory;

impl EndpointFactory {
    /// Create a caption endpoint of the requested kind.
    pub fn create(
        kind: EndpointKind,
        config: &Config,
    ) -> Result<Box<dyn CaptionEndpoint>, ConfigError> {
        let auth = EndpointAuth::from_config(config)?;
        match kind {
            EndpointKind::Runsync => Ok(Box::new(super::runsync::RunsyncEndpoint::new(
                auth,
                Duration::from_millis(config.limits.request_timeout_ms),
            ))),
            EndpointKind::Polling => Ok(Box::new(super::polling::PollingEndpoint::new(
                auth,
                &config.limits,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_payload_from_bytes() {
        let payload = ImagePayload::from_bytes(&[0xFF, 0xD8, 0xFF]);
        assert_eq!(payload.data, "/9j/");
    }

    #[test]
    fn test_image_payload_empty() {
        let payload = ImagePayload::from_bytes(&[]);
        assert!(payload.data.is_empty());
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_auth_requires_credentials() {
        let mut config = Config::default();
        config.endpoint.endpoint_id = "${DEFINITELY_NOT_SET_XYZ_123}".to_string();
        config.endpoint.api_key = "key".to_string();
        let err = EndpointAuth::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
        assert!(err.to_string().contains("endpoint_id"));
    }

    #[test]
    fn test_auth_trims_trailing_slash() {
        let mut config = Config::default();
        config.endpoint.base_url = "https://api.example.com/v2/".to_string();
        config.endpoint.endpoint_id = "abc123".to_string();
        config.endpoint.api_key = "secret".to_string();
        let auth = EndpointAuth::from_config(&config).unwrap();
        assert_eq!(auth.base_url, "https://api.example.com/v2");
    }

    #[test]
    fn test_factory_fails_without_api_key() {
        let mut config = Config::default();
        config.endpoint.endpoint_id = "abc123".to_string();
        config.endpoint.api_key = "${DEFINITELY_NOT_SET_XYZ_123}".to_string();
        let err = match EndpointFactory::create(EndpointKind::Runsync, &config) {
            Err(e) => e,
            Ok(_) => panic!("expected EndpointFactory::create to fail"),
        };
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }
}
