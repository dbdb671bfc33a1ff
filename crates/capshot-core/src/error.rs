//! Error types for the Capshot batch captioning client.
//!
//! Fatal preconditions (bad config, missing credentials, missing directory)
//! surface as `CapshotError` and abort the run before any work. Everything
//! that goes wrong for a single image is a `RemoteError`, which the invoker
//! converts into a recorded task failure instead of propagating.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Capshot operations.
#[derive(Error, Debug)]
pub enum CapshotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The target directory does not exist
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A required credential is unset after `${ENV_VAR}` resolution
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Errors from a single captioning attempt against the hosted endpoint.
///
/// Classification into retryable/permanent lives in [`crate::remote::retry`]:
/// 503s, timeouts, and connection errors are transient; every other HTTP
/// status and any malformed reply is permanent.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Non-success HTTP status from the endpoint
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The endpoint accepted the request but reported a failed job
    #[error("API error: {0}")]
    Api(String),

    /// A 200 reply that carries no caption field
    #[error("no caption in response")]
    MissingCaption,

    /// The attempt exceeded its hard per-attempt ceiling
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection-level failure (DNS, refused, reset)
    #[error("request error: {0}")]
    Network(String),

    /// Response body could not be parsed
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The async job did not reach a terminal state within the poll budget
    #[error("job {job_id} did not complete within {attempts} status polls")]
    PollBudgetExhausted { job_id: String, attempts: u32 },
}

/// Convenience type alias for Capshot results.
pub type Result<T> = std::result::Result<T, CapshotError>;
