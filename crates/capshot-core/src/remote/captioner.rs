//! The per-image caption invoker.
//!
//! Drives the retry state machine around an endpoint transport. Everything
//! that can go wrong for one image — unreadable file, transport failure,
//! bad reply, exhausted retries — becomes a `CaptionResult::Failure`; the
//! invoker never propagates an error to its caller, so one image can never
//! take the batch down.

use super::endpoint::{CaptionEndpoint, CaptionRequest, ImagePayload};
use super::retry::{AttemptState, RetryPolicy};
use crate::error::RemoteError;
use crate::types::CaptionResult;
use std::path::Path;
use std::time::Duration;

/// Retry parameters for the invoker.
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Total attempts per image, including the first
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
        }
    }
}

/// Captioning invoker with bounded retry.
pub struct Captioner {
    endpoint: Box<dyn CaptionEndpoint>,
    policy: RetryPolicy,
}

impl Captioner {
    pub fn new(endpoint: Box<dyn CaptionEndpoint>, options: RetryOptions) -> Self {
        Self {
            endpoint,
            policy: RetryPolicy {
                max_attempts: options.max_attempts,
                base_delay: Duration::from_millis(options.base_delay_ms),
            },
        }
    }

    /// Caption a single image file.
    ///
    /// Reads and encodes the file, then walks the attempt state machine:
    /// transient failures sleep out their backoff and go again, permanent
    /// ones stop immediately.
    pub async fn caption_file(&self, path: &Path, prompt: Option<&str>) -> CaptionResult {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return CaptionResult::Failure {
                    reason: format!("Failed to read image: {e}"),
                };
            }
        };

        let request = CaptionRequest::new(
            ImagePayload::from_bytes(&bytes),
            prompt.map(String::from),
        );
        self.submit_with_retry(&request, path).await
    }

    async fn submit_with_retry(&self, request: &CaptionRequest, path: &Path) -> CaptionResult {
        let mut state = self.policy.begin(AttemptState::Pending);

        loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    match self.attempt(request).await {
                        Ok(response) => {
                            return CaptionResult::Success {
                                caption: response.caption,
                                latency_ms: response.latency_ms,
                            };
                        }
                        Err(error) => {
                            tracing::debug!(
                                "Attempt {attempt} failed for {:?} via {}: {error}",
                                path,
                                self.endpoint.name()
                            );
                            self.policy
                                .resolve(AttemptState::Attempting { attempt }, Err(&error))
                        }
                    }
                }
                AttemptState::RetryScheduled { attempt, delay } => {
                    tracing::debug!(
                        "Retrying {:?} after {delay:?} (attempt {attempt} failed)",
                        path
                    );
                    tokio::time::sleep(delay).await;
                    self.policy
                        .begin(AttemptState::RetryScheduled { attempt, delay })
                }
                AttemptState::FailedPermanently { reason } => {
                    return CaptionResult::Failure { reason };
                }
                // begin() runs before the loop and success returns directly,
                // so neither Pending nor Succeeded is ever driven here
                AttemptState::Pending | AttemptState::Succeeded => {
                    unreachable!("state machine driven past a terminal state")
                }
            };
        }
    }

    /// One attempt, with the endpoint's own ceiling as a hard backstop.
    async fn attempt(
        &self,
        request: &CaptionRequest,
    ) -> Result<super::endpoint::CaptionResponse, RemoteError> {
        let ceiling = self.endpoint.timeout();
        match tokio::time::timeout(ceiling, self.endpoint.submit(request)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout {
                timeout_ms: ceiling.as_millis() as u64,
            }),
        }
    }
}
